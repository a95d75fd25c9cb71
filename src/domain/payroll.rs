//! Pay calculation for one employee and one period, and the period roll-ups.

use chrono::{DateTime, Utc};

use crate::model::{
    company::{PayrollSettings, TaxSettings},
    employee::Employee,
    payroll::{EntryStatus, PayType, PayrollEntry, PayrollPeriod, PayrollSummary},
};

/// Regular hours in a bi-weekly period when none are given.
pub const DEFAULT_REGULAR_HOURS: f64 = 80.0;
/// Paid hours per year used to derive an hourly rate from a salary.
pub const ANNUAL_HOURS: f64 = 2080.0;

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayInputs {
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub other_deductions: f64,
    pub benefits: f64,
}

impl Default for PayInputs {
    fn default() -> Self {
        Self {
            regular_hours: DEFAULT_REGULAR_HOURS,
            overtime_hours: 0.0,
            other_deductions: 0.0,
            benefits: 0.0,
        }
    }
}

pub fn pay_type(employee: &Employee) -> PayType {
    if employee.hourly_rate.is_some() {
        PayType::Hourly
    } else {
        PayType::Salary
    }
}

pub fn hourly_rate(employee: &Employee) -> f64 {
    employee
        .hourly_rate
        .unwrap_or(employee.salary / ANNUAL_HOURS)
}

/// Builds an unsaved (`id` 0) pending entry for `employee`.
pub fn build_entry(
    employee: &Employee,
    period_id: u64,
    inputs: PayInputs,
    settings: &PayrollSettings,
    taxes: &TaxSettings,
    now: DateTime<Utc>,
) -> PayrollEntry {
    let rate = round_cents(hourly_rate(employee));

    let mut entry = PayrollEntry {
        id: 0,
        employee_id: employee.id,
        period_id,
        employee_name: employee.full_name(),
        department: employee.department.clone(),
        position: employee.position.clone(),
        pay_type: pay_type(employee),
        regular_hours: inputs.regular_hours,
        overtime_hours: inputs.overtime_hours,
        regular_rate: rate,
        overtime_rate: round_cents(rate * settings.overtime_multiplier),
        gross_pay: 0.0,
        federal_tax: 0.0,
        state_tax: 0.0,
        social_security: 0.0,
        medicare: 0.0,
        other_deductions: inputs.other_deductions,
        benefits: inputs.benefits,
        net_pay: 0.0,
        status: EntryStatus::Pending,
        processed_at: None,
        created_at: now,
        updated_at: now,
    };

    apply_amounts(&mut entry, taxes);
    entry
}

/// Recomputes gross, taxes and net from the entry's hours and rates.
pub fn apply_amounts(entry: &mut PayrollEntry, taxes: &TaxSettings) {
    let gross = round_cents(
        entry.regular_hours * entry.regular_rate + entry.overtime_hours * entry.overtime_rate,
    );

    entry.gross_pay = gross;
    entry.federal_tax = round_cents(gross * taxes.federal_tax_rate);
    entry.state_tax = round_cents(gross * taxes.state_tax_rate);
    entry.social_security = round_cents(gross * taxes.social_security_rate);
    entry.medicare = round_cents(gross * taxes.medicare_rate);
    entry.net_pay = round_cents(gross - entry.total_taxes() - entry.other_deductions);
}

/// Rolls non-cancelled entries up into the period totals.
pub fn apply_totals(period: &mut PayrollPeriod, entries: &[PayrollEntry]) {
    let live: Vec<&PayrollEntry> = entries
        .iter()
        .filter(|e| e.status != EntryStatus::Cancelled)
        .collect();

    let sum = |f: fn(&PayrollEntry) -> f64| round_cents(live.iter().map(|e| f(e)).sum());

    period.employee_count = live.len() as u32;
    period.gross_pay = sum(|e| e.gross_pay);
    period.net_pay = sum(|e| e.net_pay);
    period.total_taxes = sum(PayrollEntry::total_taxes);
    period.total_deductions = sum(|e| e.other_deductions);
    period.total_benefits = sum(|e| e.benefits);
    period.regular_hours = sum(|e| e.regular_hours);
    period.regular_pay = sum(|e| e.regular_hours * e.regular_rate);
    period.overtime_hours = sum(|e| e.overtime_hours);
    period.overtime_pay = sum(|e| e.overtime_hours * e.overtime_rate);
}

/// Totals plus average, median, highest and lowest net pay.
pub fn summarize(period_id: u64, entries: &[PayrollEntry]) -> PayrollSummary {
    let mut net: Vec<f64> = entries
        .iter()
        .filter(|e| e.status != EntryStatus::Cancelled)
        .map(|e| e.net_pay)
        .collect();
    net.sort_by(f64::total_cmp);

    let live = entries.iter().filter(|e| e.status != EntryStatus::Cancelled);
    let total_gross: f64 = live.clone().map(|e| e.gross_pay).sum();
    let total_taxes: f64 = live.clone().map(PayrollEntry::total_taxes).sum();
    let total_deductions: f64 = live.map(|e| e.other_deductions).sum();
    let total_net: f64 = net.iter().sum();

    let count = net.len();
    let median = match count {
        0 => 0.0,
        n if n % 2 == 1 => net[n / 2],
        n => (net[n / 2 - 1] + net[n / 2]) / 2.0,
    };

    PayrollSummary {
        period_id,
        total_employees: count as u32,
        total_gross_pay: round_cents(total_gross),
        total_net_pay: round_cents(total_net),
        total_taxes: round_cents(total_taxes),
        total_deductions: round_cents(total_deductions),
        average_pay: if count == 0 {
            0.0
        } else {
            round_cents(total_net / count as f64)
        },
        median_pay: round_cents(median),
        highest_pay: net.last().copied().unwrap_or(0.0),
        lowest_pay: net.first().copied().unwrap_or(0.0),
    }
}
