//! Read-only roll-ups behind the dashboard home and the reports screen.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::payroll::round_cents;
use crate::model::leave_request::LeaveStatus;
use crate::model::payroll::{EntryStatus, PeriodStatus};
use crate::store::AppStore;

/// Working days in a week, for weekly averages over daily entries.
const WORK_DAYS_PER_WEEK: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportRange {
    /// First day included (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
}

impl ReportRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_employees: usize,
    pub active_employees: usize,
    pub pending_payroll: usize,
    pub processing_payroll: usize,
    pub completed_payroll: usize,
    /// Gross pay of every completed period.
    pub total_payroll_amount: f64,
    /// Mean days from period end to pay date over completed periods.
    pub average_payroll_time: f64,
    pub pending_leave: usize,
    pub pending_timesheets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentHeadcount {
    pub department: String,
    pub count: usize,
    pub active: usize,
    pub total_salary: f64,
    pub average_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HeadcountReport {
    pub total: usize,
    pub active: usize,
    pub departments: Vec<DepartmentHeadcount>,
    pub by_status: BTreeMap<String, usize>,
    pub by_employment_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodLine {
    pub period_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pay_date: NaiveDate,
    pub status: PeriodStatus,
    pub employee_count: u32,
    pub gross_pay: f64,
    pub net_pay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollReport {
    pub total_gross_pay: f64,
    pub total_net_pay: f64,
    pub total_taxes: f64,
    pub total_deductions: f64,
    /// Gross pay over the number of active employees.
    pub average_cost_per_employee: f64,
    pub periods: Vec<PeriodLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimeReport {
    pub entries: usize,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub average_overtime_per_week: f64,
    pub by_status: BTreeMap<String, usize>,
    pub pending_approvals: usize,
}

fn tally<I: IntoIterator<Item = String>>(keys: I) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

impl AppStore {
    pub fn dashboard_stats(&self) -> DashboardStats {
        let periods = self.payroll_periods.all();
        let completed: Vec<_> = periods
            .iter()
            .filter(|p| p.status == PeriodStatus::Completed)
            .collect();
        let count = |status: PeriodStatus| periods.iter().filter(|p| p.status == status).count();

        let average_payroll_time = if completed.is_empty() {
            0.0
        } else {
            let days: i64 = completed
                .iter()
                .map(|p| (p.pay_date - p.end_date).num_days())
                .sum();
            round_cents(days as f64 / completed.len() as f64)
        };

        DashboardStats {
            total_employees: self.employees.len(),
            active_employees: self.active_employees().len(),
            pending_payroll: count(PeriodStatus::Pending),
            processing_payroll: count(PeriodStatus::Processing),
            completed_payroll: completed.len(),
            total_payroll_amount: round_cents(completed.iter().map(|p| p.gross_pay).sum()),
            average_payroll_time,
            pending_leave: self.leave_requests.count(|l| l.status == LeaveStatus::Pending),
            pending_timesheets: self.pending_timesheets().len(),
        }
    }

    pub fn headcount_report(&self) -> HeadcountReport {
        let employees = self.employees.all();

        let mut departments: BTreeMap<String, DepartmentHeadcount> = BTreeMap::new();
        for e in &employees {
            let line = departments
                .entry(e.department.clone())
                .or_insert_with(|| DepartmentHeadcount {
                    department: e.department.clone(),
                    count: 0,
                    active: 0,
                    total_salary: 0.0,
                    average_salary: 0.0,
                });
            line.count += 1;
            line.active += usize::from(e.is_active());
            line.total_salary += e.salary;
        }
        let departments = departments
            .into_values()
            .map(|mut d| {
                d.total_salary = round_cents(d.total_salary);
                d.average_salary = round_cents(d.total_salary / d.count as f64);
                d
            })
            .collect();

        HeadcountReport {
            total: employees.len(),
            active: employees.iter().filter(|e| e.is_active()).count(),
            departments,
            by_status: tally(employees.iter().map(|e| e.status.as_ref().to_string())),
            by_employment_type: tally(
                employees
                    .iter()
                    .map(|e| e.employment_type.as_ref().to_string()),
            ),
        }
    }

    /// Periods starting inside `range`, and the entries that belong to them.
    /// Cancelled entries are left out of the totals.
    pub fn payroll_report(&self, range: ReportRange) -> PayrollReport {
        let mut periods = self
            .payroll_periods
            .filter(|p| range.contains(p.start_date));
        periods.sort_by_key(|p| p.start_date);

        let ids: Vec<u64> = periods.iter().map(|p| p.id).collect();
        let entries = self
            .payroll_entries
            .filter(|e| ids.contains(&e.period_id) && e.status != EntryStatus::Cancelled);

        let gross: f64 = entries.iter().map(|e| e.gross_pay).sum();
        let active = self.active_employees().len().max(1);

        PayrollReport {
            total_gross_pay: round_cents(gross),
            total_net_pay: round_cents(entries.iter().map(|e| e.net_pay).sum()),
            total_taxes: round_cents(entries.iter().map(|e| e.total_taxes()).sum()),
            total_deductions: round_cents(entries.iter().map(|e| e.other_deductions).sum()),
            average_cost_per_employee: round_cents(gross / active as f64),
            periods: periods
                .into_iter()
                .map(|p| PeriodLine {
                    period_id: p.id,
                    start_date: p.start_date,
                    end_date: p.end_date,
                    pay_date: p.pay_date,
                    status: p.status,
                    employee_count: p.employee_count,
                    gross_pay: p.gross_pay,
                    net_pay: p.net_pay,
                })
                .collect(),
        }
    }

    pub fn time_report(&self, range: ReportRange) -> TimeReport {
        let entries = self.time_entries.filter(|e| range.contains(e.date));

        let overtime: f64 = entries.iter().map(|e| e.overtime_hours).sum();
        let weeks = entries.len() as f64 / WORK_DAYS_PER_WEEK;
        let weeks = if weeks > 0.0 { weeks } else { 1.0 };

        TimeReport {
            entries: entries.len(),
            total_hours: round_cents(entries.iter().map(|e| e.total_hours).sum()),
            regular_hours: round_cents(entries.iter().map(|e| e.regular_hours).sum()),
            overtime_hours: round_cents(overtime),
            average_overtime_per_week: round_cents(overtime / weeks),
            by_status: tally(entries.iter().map(|e| e.status.to_string())),
            pending_approvals: entries
                .iter()
                .filter(|e| !e.is_open() && e.status.is_undecided())
                .count(),
        }
    }
}
