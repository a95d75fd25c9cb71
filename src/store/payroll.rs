use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::domain::payroll::{self as calc, PayInputs};
use crate::error::AppError;
use crate::model::payroll::{
    EntryStatus, NewPayrollEntry, NewPayrollPeriod, PayrollEntry, PayrollPeriod, PayrollSummary,
    PeriodStatus, ProcessPeriod,
};
use crate::store::AppStore;
use crate::utils::json_patch::merge_patch;

/// Period fields that only the process/complete/cancel actions change.
const PERIOD_IMMUTABLE: [&str; 11] = [
    "status",
    "employee_count",
    "gross_pay",
    "net_pay",
    "total_taxes",
    "total_deductions",
    "total_benefits",
    "overtime_hours",
    "overtime_pay",
    "regular_hours",
    "regular_pay",
];

/// Entry fields derived from the employee or computed from hours and rates.
const ENTRY_IMMUTABLE: [&str; 14] = [
    "employee_id",
    "period_id",
    "employee_name",
    "department",
    "position",
    "pay_type",
    "gross_pay",
    "federal_tax",
    "state_tax",
    "social_security",
    "medicare",
    "net_pay",
    "status",
    "processed_at",
];

fn transition_error(action: &str, status: PeriodStatus) -> AppError {
    AppError::BadRequest(format!(
        "Payroll period cannot be {action} from status {status}"
    ))
}

fn check_period_dates(p: &PayrollPeriod) -> Result<(), AppError> {
    if p.start_date > p.end_date {
        return Err(AppError::BadRequest(
            "start_date cannot be after end_date".into(),
        ));
    }
    if p.pay_date < p.end_date {
        return Err(AppError::BadRequest(
            "pay_date cannot be before end_date".into(),
        ));
    }
    Ok(())
}

impl AppStore {
    /* ===============================
    Periods
    =============================== */

    pub fn period(&self, id: u64) -> Result<PayrollPeriod, AppError> {
        self.payroll_periods.get(id)
    }

    pub fn periods_by_status(&self, status: PeriodStatus) -> Vec<PayrollPeriod> {
        self.payroll_periods.filter(|p| p.status == status)
    }

    pub fn add_period(&self, payload: NewPayrollPeriod) -> Result<PayrollPeriod, AppError> {
        let now = Utc::now();
        let period = PayrollPeriod {
            id: 0,
            start_date: payload.start_date,
            end_date: payload.end_date,
            pay_date: payload.pay_date,
            status: PeriodStatus::Pending,
            employee_count: 0,
            gross_pay: 0.0,
            net_pay: 0.0,
            total_taxes: 0.0,
            total_deductions: 0.0,
            total_benefits: 0.0,
            overtime_hours: 0.0,
            overtime_pay: 0.0,
            regular_hours: 0.0,
            regular_pay: 0.0,
            created_at: now,
            updated_at: now,
        };
        check_period_dates(&period)?;

        let overlaps = self.payroll_periods.find_by(|p| {
            p.status != PeriodStatus::Cancelled
                && p.start_date <= period.end_date
                && period.start_date <= p.end_date
        });
        if let Some(existing) = overlaps {
            return Err(AppError::Conflict(format!(
                "Payroll period overlaps period {}",
                existing.id
            )));
        }

        let period = self.payroll_periods.insert(period);
        info!(period_id = period.id, "Payroll period created");
        Ok(period)
    }

    /// Dates only; status and totals move through the period actions.
    pub fn update_period(&self, id: u64, patch: &Value) -> Result<PayrollPeriod, AppError> {
        let current = self.period(id)?;
        if current.status != PeriodStatus::Pending {
            return Err(AppError::BadRequest(format!(
                "Payroll period cannot be edited in status {}",
                current.status
            )));
        }
        let merged: PayrollPeriod = merge_patch(&current, patch, &PERIOD_IMMUTABLE)?;
        check_period_dates(&merged)?;

        self.payroll_periods.update(id, |row| {
            *row = merged;
            Ok(())
        })
    }

    /// pending -> processing: computes an entry for every active employee.
    ///
    /// Hours come from `options.custom_hours`, else from a pending entry
    /// already on the period (kept as is), else the defaults.
    pub fn process_period(
        &self,
        id: u64,
        options: &ProcessPeriod,
    ) -> Result<PayrollPeriod, AppError> {
        let period = self.period(id)?;
        if period.status != PeriodStatus::Pending {
            return Err(transition_error("processed", period.status));
        }
        for hours in options.custom_hours.values() {
            check_inputs(&PayInputs {
                regular_hours: hours.regular_hours,
                overtime_hours: hours.overtime_hours,
                ..PayInputs::default()
            })?;
        }

        let company = self.company()?;
        let now = Utc::now();

        // overridden employees get a fresh entry in place of any pending one
        self.payroll_entries.update_where(
            |e| {
                e.period_id == id
                    && e.status == EntryStatus::Pending
                    && options.custom_hours.contains_key(&e.employee_id)
            },
            |e| e.status = EntryStatus::Cancelled,
        );
        let entered: Vec<u64> = self
            .payroll_entries
            .filter(|e| e.period_id == id && e.status == EntryStatus::Pending)
            .iter()
            .map(|e| e.employee_id)
            .collect();

        for employee in self.active_employees() {
            let inputs = match options.custom_hours.get(&employee.id) {
                Some(hours) => PayInputs {
                    regular_hours: hours.regular_hours,
                    overtime_hours: hours.overtime_hours,
                    ..PayInputs::default()
                },
                None if entered.contains(&employee.id) => continue,
                None => PayInputs::default(),
            };
            let entry = calc::build_entry(
                &employee,
                id,
                inputs,
                &company.payroll_settings,
                &company.tax_settings,
                now,
            );
            self.payroll_entries.insert(entry);
        }

        let entries = self.entries_by_period(id);
        let period = self.payroll_periods.update(id, |p| {
            calc::apply_totals(p, &entries);
            p.status = PeriodStatus::Processing;
            Ok(())
        })?;

        info!(
            period_id = id,
            employees = period.employee_count,
            gross = period.gross_pay,
            "Payroll period processed"
        );
        Ok(period)
    }

    /// processing -> completed: entries are paid and the summary stored.
    pub fn complete_period(&self, id: u64) -> Result<PayrollPeriod, AppError> {
        let period = self.period(id)?;
        if period.status != PeriodStatus::Processing {
            return Err(transition_error("completed", period.status));
        }

        let now = Utc::now();
        self.payroll_entries.update_where(
            |e| e.period_id == id && e.status != EntryStatus::Cancelled,
            |e| {
                e.status = EntryStatus::Paid;
                e.processed_at = Some(now);
            },
        );

        let entries = self.entries_by_period(id);
        self.payroll_summaries.upsert(calc::summarize(id, &entries));

        let period = self.payroll_periods.update(id, |p| {
            calc::apply_totals(p, &entries);
            p.status = PeriodStatus::Completed;
            Ok(())
        })?;

        info!(period_id = id, net = period.net_pay, "Payroll period completed");
        Ok(period)
    }

    /// pending|processing -> cancelled: every entry is cancelled too.
    pub fn cancel_period(&self, id: u64) -> Result<PayrollPeriod, AppError> {
        let period = self.period(id)?;
        if !matches!(
            period.status,
            PeriodStatus::Pending | PeriodStatus::Processing
        ) {
            return Err(transition_error("cancelled", period.status));
        }

        self.payroll_entries.update_where(
            |e| e.period_id == id,
            |e| e.status = EntryStatus::Cancelled,
        );

        let period = self.payroll_periods.update(id, |p| {
            p.status = PeriodStatus::Cancelled;
            Ok(())
        })?;

        info!(period_id = id, "Payroll period cancelled");
        Ok(period)
    }

    /* ===============================
    Entries
    =============================== */

    pub fn payroll_entry(&self, id: u64) -> Result<PayrollEntry, AppError> {
        self.payroll_entries.get(id)
    }

    pub fn entries_by_period(&self, period_id: u64) -> Vec<PayrollEntry> {
        self.payroll_entries.filter(|e| e.period_id == period_id)
    }

    pub fn entries_by_employee(&self, employee_id: u64) -> Vec<PayrollEntry> {
        self.payroll_entries.filter(|e| e.employee_id == employee_id)
    }

    /// Adds a hand-entered line to a period that has not been paid yet.
    pub fn add_entry(&self, payload: NewPayrollEntry) -> Result<PayrollEntry, AppError> {
        let period = self.period(payload.period_id)?;
        if !matches!(
            period.status,
            PeriodStatus::Pending | PeriodStatus::Processing
        ) {
            return Err(AppError::BadRequest(format!(
                "Cannot add entries to a {} payroll period",
                period.status
            )));
        }

        let inputs = PayInputs {
            regular_hours: payload.regular_hours,
            overtime_hours: payload.overtime_hours,
            other_deductions: payload.other_deductions,
            benefits: payload.benefits,
        };
        check_inputs(&inputs)?;

        let employee = self.employee(payload.employee_id)?;
        let company = self.company()?;
        let entry = calc::build_entry(
            &employee,
            period.id,
            inputs,
            &company.payroll_settings,
            &company.tax_settings,
            Utc::now(),
        );

        let entry = self.payroll_entries.insert(entry);
        self.refresh_period_totals(period.id)?;
        Ok(entry)
    }

    /// Hours, rates, deductions and benefits may change; amounts are recomputed.
    pub fn update_entry(&self, id: u64, patch: &Value) -> Result<PayrollEntry, AppError> {
        let current = self.payroll_entry(id)?;
        if current.status != EntryStatus::Pending {
            return Err(AppError::already_processed("Payroll entry"));
        }

        let mut merged: PayrollEntry = merge_patch(&current, patch, &ENTRY_IMMUTABLE)?;
        check_inputs(&PayInputs {
            regular_hours: merged.regular_hours,
            overtime_hours: merged.overtime_hours,
            other_deductions: merged.other_deductions,
            benefits: merged.benefits,
        })?;
        if merged.regular_rate < 0.0 || merged.overtime_rate < 0.0 {
            return Err(AppError::BadRequest("Rates cannot be negative".into()));
        }

        let company = self.company()?;
        calc::apply_amounts(&mut merged, &company.tax_settings);

        let entry = self.payroll_entries.update(id, |row| {
            *row = merged;
            Ok(())
        })?;
        self.refresh_period_totals(entry.period_id)?;
        Ok(entry)
    }

    fn refresh_period_totals(&self, period_id: u64) -> Result<PayrollPeriod, AppError> {
        let entries = self.entries_by_period(period_id);
        self.payroll_periods.update(period_id, |p| {
            calc::apply_totals(p, &entries);
            Ok(())
        })
    }

    /* ===============================
    Summaries
    =============================== */

    /// The stored summary, or one computed from the period's entries.
    pub fn summary_for_period(&self, period_id: u64) -> Result<PayrollSummary, AppError> {
        self.period(period_id)?;

        Ok(self
            .payroll_summaries
            .find(period_id)
            .unwrap_or_else(|| calc::summarize(period_id, &self.entries_by_period(period_id))))
    }
}

fn check_inputs(inputs: &PayInputs) -> Result<(), AppError> {
    let fields = [
        ("regular_hours", inputs.regular_hours),
        ("overtime_hours", inputs.overtime_hours),
        ("other_deductions", inputs.other_deductions),
        ("benefits", inputs.benefits),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::BadRequest(format!("{name} cannot be negative")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payroll::HoursOverride;
    use crate::store::test_support::store;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> NewPayrollPeriod {
        NewPayrollPeriod {
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 15),
            pay_date: date(2024, 3, 19),
        }
    }

    #[test]
    fn status_queries() {
        let store = store();
        assert_eq!(store.periods_by_status(PeriodStatus::Completed).len(), 1);
        assert_eq!(store.periods_by_status(PeriodStatus::Processing).len(), 1);
        assert_eq!(store.periods_by_status(PeriodStatus::Pending).len(), 1);
        assert_eq!(store.entries_by_employee(8).len(), 1);
        assert_eq!(store.entries_by_period(1).len(), 4);
    }

    #[test]
    fn new_period_starts_pending_and_rejects_overlap() {
        let store = store();

        let period = store.add_period(march()).unwrap();
        assert_eq!(period.id, 4);
        assert_eq!(period.status, PeriodStatus::Pending);
        assert_eq!(period.gross_pay, 0.0);

        let err = store.add_period(march()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let mut backwards = march();
        backwards.start_date = date(2024, 4, 1);
        assert!(matches!(store.add_period(backwards), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn full_lifecycle() {
        let store = store();
        let id = store.add_period(march()).unwrap().id;

        let processing = store.process_period(id, &ProcessPeriod::default()).unwrap();
        assert_eq!(processing.status, PeriodStatus::Processing);
        assert_eq!(processing.employee_count, 9);
        assert_eq!(processing.regular_hours, 720.0);
        assert!(processing.gross_pay > 0.0);

        let entries = store.entries_by_period(id);
        assert_eq!(entries.len(), 9);
        assert!(entries.iter().all(|e| e.status == EntryStatus::Pending));
        assert!(entries.iter().all(|e| e.employee_id != 4));

        let completed = store.complete_period(id).unwrap();
        assert_eq!(completed.status, PeriodStatus::Completed);
        assert!(
            store
                .entries_by_period(id)
                .iter()
                .all(|e| e.status == EntryStatus::Paid && e.processed_at.is_some())
        );

        let summary = store.summary_for_period(id).unwrap();
        assert_eq!(summary.total_employees, 9);
        assert_eq!(summary.total_net_pay, completed.net_pay);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let store = store();

        let err = store.complete_period(3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payroll period cannot be completed from status pending"
        );

        let err = store.process_period(1, &ProcessPeriod::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payroll period cannot be processed from status completed"
        );

        assert!(store.cancel_period(1).is_err());
        assert!(matches!(store.process_period(99, &ProcessPeriod::default()), Err(AppError::NotFound(_))));
    }

    #[test]
    fn processing_keeps_entered_and_custom_hours() {
        let store = store();
        let id = store.add_period(march()).unwrap().id;

        // entered by hand before processing
        let entered = store
            .add_entry(NewPayrollEntry {
                employee_id: 8,
                period_id: id,
                regular_hours: 10.0,
                overtime_hours: 0.0,
                other_deductions: 0.0,
                benefits: 0.0,
            })
            .unwrap();

        let mut options = ProcessPeriod::default();
        options.custom_hours.insert(
            3,
            HoursOverride {
                regular_hours: 72.0,
                overtime_hours: 6.0,
            },
        );
        let processing = store.process_period(id, &options).unwrap();
        assert_eq!(processing.employee_count, 9);
        // 7 defaults at 80 + 10 entered + 72 custom
        assert_eq!(processing.regular_hours, 642.0);
        assert_eq!(processing.overtime_hours, 6.0);

        let live: Vec<PayrollEntry> = store
            .entries_by_period(id)
            .into_iter()
            .filter(|e| e.status != EntryStatus::Cancelled)
            .collect();
        let kept = live.iter().find(|e| e.employee_id == 8).unwrap();
        assert_eq!(kept.id, entered.id);
        assert_eq!(kept.gross_pay, 288.5);
        let custom = live.iter().find(|e| e.employee_id == 3).unwrap();
        assert_eq!((custom.regular_hours, custom.overtime_hours), (72.0, 6.0));
    }

    #[test]
    fn negative_custom_hours_are_rejected() {
        let store = store();
        let id = store.add_period(march()).unwrap().id;

        let mut options = ProcessPeriod::default();
        options.custom_hours.insert(
            3,
            HoursOverride {
                regular_hours: -1.0,
                overtime_hours: 0.0,
            },
        );
        let err = store.process_period(id, &options).unwrap_err();
        assert_eq!(err.to_string(), "regular_hours cannot be negative");
        assert_eq!(store.period(id).unwrap().status, PeriodStatus::Pending);
    }

    #[test]
    fn cancel_cascades_to_entries() {
        let store = store();
        let id = store.add_period(march()).unwrap().id;
        store.process_period(id, &ProcessPeriod::default()).unwrap();

        let cancelled = store.cancel_period(id).unwrap();
        assert_eq!(cancelled.status, PeriodStatus::Cancelled);
        assert!(
            store
                .entries_by_period(id)
                .iter()
                .all(|e| e.status == EntryStatus::Cancelled)
        );
    }

    #[test]
    fn manual_entry_updates_period_totals() {
        let store = store();

        let entry = store
            .add_entry(NewPayrollEntry {
                employee_id: 8,
                period_id: 3,
                regular_hours: 10.0,
                overtime_hours: 0.0,
                other_deductions: 0.0,
                benefits: 0.0,
            })
            .unwrap();
        assert_eq!(entry.gross_pay, 288.5);

        let period = store.period(3).unwrap();
        assert_eq!(period.employee_count, 1);
        assert_eq!(period.gross_pay, 288.5);

        let updated = store
            .update_entry(entry.id, &json!({"regular_hours": 20}))
            .unwrap();
        assert_eq!(updated.gross_pay, 577.0);
        assert_eq!(store.period(3).unwrap().gross_pay, 577.0);

        let err = store
            .update_entry(entry.id, &json!({"net_pay": 1_000_000}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Field 'net_pay' cannot be updated");
    }

    #[test]
    fn paid_entries_cannot_change() {
        let store = store();
        let err = store
            .update_entry(1, &json!({"regular_hours": 1}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Payroll entry not found or already processed");

        let err = store
            .add_entry(NewPayrollEntry {
                employee_id: 1,
                period_id: 1,
                regular_hours: 1.0,
                overtime_hours: 0.0,
                other_deductions: 0.0,
                benefits: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn summary_is_stored_or_computed() {
        let store = store();
        assert_eq!(store.summary_for_period(1).unwrap().total_employees, 127);

        let id = store.add_period(march()).unwrap().id;
        let computed = store.summary_for_period(id).unwrap();
        assert_eq!(computed.total_employees, 0);

        assert!(store.summary_for_period(42).is_err());
    }

    #[test]
    fn pending_period_dates_can_be_edited() {
        let store = store();

        let updated = store
            .update_period(3, &json!({"pay_date": "2024-02-20"}))
            .unwrap();
        assert_eq!(updated.pay_date, date(2024, 2, 20));

        let err = store.update_period(3, &json!({"status": "completed"})).unwrap_err();
        assert_eq!(err.to_string(), "Field 'status' cannot be updated");

        assert!(store.update_period(1, &json!({"pay_date": "2024-01-20"})).is_err());
    }
}
