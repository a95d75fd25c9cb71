use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use serde_json::Value;
use tracing::info;

use crate::domain::time::{self, Hours};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest, leave_days};
use crate::model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryStatus};
use crate::model::timesheet::{Timesheet, TimesheetStatus, TimesheetView};
use crate::store::AppStore;
use crate::store::table::{Record, Table};
use crate::utils::json_patch::merge_patch;

const TIME_ENTRY_IMMUTABLE: [&str; 10] = [
    "employee_id",
    "employee_name",
    "department",
    "total_hours",
    "regular_hours",
    "overtime_hours",
    "status",
    "approved_by",
    "approved_at",
    "rejected_reason",
];

/// Only the week can move; totals and workflow fields are derived.
const TIMESHEET_IMMUTABLE: [&str; 12] = [
    "employee_id",
    "employee_name",
    "department",
    "week_end",
    "total_hours",
    "regular_hours",
    "overtime_hours",
    "status",
    "submitted_at",
    "approved_by",
    "approved_at",
    "rejected_reason",
];

const LEAVE_IMMUTABLE: [&str; 9] = [
    "employee_id",
    "employee_name",
    "department",
    "total_days",
    "status",
    "requested_at",
    "approved_by",
    "approved_at",
    "rejected_reason",
];

/// Moves a record out of a waiting state. A missing row and a row that is
/// no longer waiting get the same 400.
fn decide<T, P, F>(table: &Table<T>, id: u64, waiting: P, apply: F) -> Result<T, AppError>
where
    T: Record,
    P: FnOnce(&T) -> bool,
    F: FnOnce(&mut T),
{
    table
        .update(id, |row| {
            if !waiting(row) {
                return Err(AppError::already_processed(T::NAME));
            }
            apply(row);
            Ok(())
        })
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::already_processed(T::NAME),
            other => other,
        })
}

fn apply_entry_hours(entry: &mut TimeEntry) -> Result<(), AppError> {
    let shift = |t: NaiveTime| time::on_shift(entry.date, entry.clock_in, t);

    if let (Some(start), Some(end)) = (entry.break_start, entry.break_end) {
        if shift(end) < shift(start) {
            return Err(AppError::BadRequest(
                "break_end cannot be before break_start".into(),
            ));
        }
    }
    if entry.break_end.is_some() && entry.break_start.is_none() {
        return Err(AppError::BadRequest("break_end requires break_start".into()));
    }

    let hours = match entry.clock_out {
        Some(out) => time::entry_hours(entry.date, entry.clock_in, out),
        None => Hours::ZERO,
    };

    entry.total_hours = hours.total;
    entry.regular_hours = hours.regular;
    entry.overtime_hours = hours.overtime;
    Ok(())
}

/// Rejects clock actions stamped before the shift started.
fn after_clock_in(entry: &TimeEntry, at: NaiveDateTime, what: &str) -> Result<(), AppError> {
    if at < entry.date.and_time(entry.clock_in) {
        return Err(AppError::BadRequest(format!(
            "{what} cannot be before clock_in"
        )));
    }
    Ok(())
}

fn require_active(employee: &Employee) -> Result<(), AppError> {
    if employee.is_active() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Inactive employees cannot record time".into(),
        ))
    }
}

impl AppStore {
    /* ===============================
    Time entries
    =============================== */

    pub fn time_entry(&self, id: u64) -> Result<TimeEntry, AppError> {
        self.time_entries.get(id)
    }

    pub fn time_entries_by_employee(&self, employee_id: u64) -> Vec<TimeEntry> {
        self.time_entries.filter(|e| e.employee_id == employee_id)
    }

    pub fn time_entries_by_date(&self, date: NaiveDate) -> Vec<TimeEntry> {
        self.time_entries.filter(|e| e.date == date)
    }

    pub fn time_entries_by_status(&self, status: TimeEntryStatus) -> Vec<TimeEntry> {
        self.time_entries.filter(|e| e.status == status)
    }

    fn open_entry(&self, employee_id: u64) -> Option<TimeEntry> {
        self.time_entries
            .find_by(|e| e.employee_id == employee_id && e.is_open())
    }

    pub fn add_time_entry(
        &self,
        employee_id: u64,
        payload: NewTimeEntry,
    ) -> Result<TimeEntry, AppError> {
        let employee = self.employee(employee_id)?;
        require_active(&employee)?;

        if payload.clock_out.is_none() && self.open_entry(employee_id).is_some() {
            return Err(AppError::BadRequest(
                "Employee already has an open time entry".into(),
            ));
        }

        let now = Utc::now();
        let mut entry = TimeEntry {
            id: 0,
            employee_id,
            employee_name: employee.full_name(),
            department: employee.department,
            date: payload.date,
            clock_in: payload.clock_in,
            clock_out: payload.clock_out,
            break_start: payload.break_start,
            break_end: payload.break_end,
            total_hours: 0.0,
            regular_hours: 0.0,
            overtime_hours: 0.0,
            status: TimeEntryStatus::Pending,
            notes: payload.notes,
            approved_by: None,
            approved_at: None,
            rejected_reason: None,
            created_at: now,
            updated_at: now,
        };
        apply_entry_hours(&mut entry)?;

        let entry = self.time_entries.insert(entry);
        info!(entry_id = entry.id, employee_id, "Time entry recorded");
        Ok(entry)
    }

    /// Times and notes may change until the entry is decided.
    pub fn update_time_entry(&self, id: u64, patch: &Value) -> Result<TimeEntry, AppError> {
        let current = self.time_entry(id)?;
        if !current.status.is_undecided() {
            return Err(AppError::already_processed(TimeEntry::NAME));
        }

        let mut merged: TimeEntry = merge_patch(&current, patch, &TIME_ENTRY_IMMUTABLE)?;
        apply_entry_hours(&mut merged)?;

        self.time_entries.update(id, |row| {
            *row = merged;
            Ok(())
        })
    }

    pub fn approve_time_entry(&self, id: u64, approver: u64) -> Result<TimeEntry, AppError> {
        let entry = decide(
            &self.time_entries,
            id,
            |e| {
                !e.is_open()
                    && e.status.is_undecided()
            },
            |e| {
                e.status = TimeEntryStatus::Approved;
                e.approved_by = Some(approver);
                e.approved_at = Some(Utc::now());
            },
        )?;
        info!(entry_id = id, approver, "Time entry approved");
        Ok(entry)
    }

    pub fn reject_time_entry(
        &self,
        id: u64,
        approver: u64,
        reason: Option<String>,
    ) -> Result<TimeEntry, AppError> {
        decide(
            &self.time_entries,
            id,
            |e| e.status.is_undecided(),
            |e| {
                e.status = TimeEntryStatus::Rejected;
                e.approved_by = Some(approver);
                e.rejected_reason = reason;
            },
        )
    }

    /* ===============================
    Clock
    =============================== */

    /// Opens a pending entry dated `at`.
    pub fn clock_in(&self, employee_id: u64, at: NaiveDateTime) -> Result<TimeEntry, AppError> {
        if self.open_entry(employee_id).is_some() {
            return Err(AppError::BadRequest("Already clocked in".into()));
        }

        let at = at.trunc_subsecs(0);
        self.add_time_entry(
            employee_id,
            NewTimeEntry {
                employee_id: Some(employee_id),
                date: at.date(),
                clock_in: at.time(),
                clock_out: None,
                break_start: None,
                break_end: None,
                notes: None,
            },
        )
    }

    /// Closes the open entry at `at`, which may fall on a later day than
    /// the clock-in.
    pub fn clock_out(&self, employee_id: u64, at: NaiveDateTime) -> Result<TimeEntry, AppError> {
        let open = self.open_clock(employee_id)?;
        let at = at.trunc_subsecs(0);
        after_clock_in(&open, at, "clock_out")?;

        let entry = self.time_entries.update(open.id, |e| {
            e.clock_out = Some(at.time());
            // an unfinished break ends with the shift
            if e.break_start.is_some() && e.break_end.is_none() {
                e.break_end = Some(at.time());
            }
            apply_entry_hours(e)?;

            // stored times only cover one day; the timestamp covers longer shifts
            let hours = time::shift_hours(e.date.and_time(e.clock_in), at).unwrap_or(Hours::ZERO);
            e.total_hours = hours.total;
            e.regular_hours = hours.regular;
            e.overtime_hours = hours.overtime;
            Ok(())
        })?;

        info!(entry_id = entry.id, hours = entry.total_hours, "Clocked out");
        Ok(entry)
    }

    pub fn start_break(&self, employee_id: u64, at: NaiveDateTime) -> Result<TimeEntry, AppError> {
        let open = self.open_clock(employee_id)?;
        if open.break_start.is_some() {
            return Err(AppError::BadRequest("Break already taken for this entry".into()));
        }
        let at = at.trunc_subsecs(0);
        after_clock_in(&open, at, "break_start")?;

        self.time_entries.update(open.id, |e| {
            e.break_start = Some(at.time());
            Ok(())
        })
    }

    pub fn end_break(&self, employee_id: u64, at: NaiveDateTime) -> Result<TimeEntry, AppError> {
        let open = self.open_clock(employee_id)?;
        if open.break_start.is_none() || open.break_end.is_some() {
            return Err(AppError::BadRequest("No break in progress".into()));
        }
        let at = at.trunc_subsecs(0);
        after_clock_in(&open, at, "break_end")?;

        self.time_entries.update(open.id, |e| {
            e.break_end = Some(at.time());
            apply_entry_hours(e)
        })
    }

    fn open_clock(&self, employee_id: u64) -> Result<TimeEntry, AppError> {
        self.open_entry(employee_id)
            .ok_or_else(|| AppError::BadRequest("Not clocked in".into()))
    }

    /* ===============================
    Timesheets
    =============================== */

    pub fn timesheet(&self, id: u64) -> Result<Timesheet, AppError> {
        self.timesheets.get(id)
    }

    pub fn timesheets_by_employee(&self, employee_id: u64) -> Vec<Timesheet> {
        self.timesheets.filter(|t| t.employee_id == employee_id)
    }

    pub fn timesheet_for_week(&self, employee_id: u64, week_start: NaiveDate) -> Option<Timesheet> {
        self.timesheets
            .find_by(|t| t.employee_id == employee_id && t.week_start == week_start)
    }

    /// Submitted and waiting for a decision.
    pub fn pending_timesheets(&self) -> Vec<Timesheet> {
        self.timesheets
            .filter(|t| t.status == TimesheetStatus::Submitted)
    }

    /// The timesheet with its week's entries, ordered by day and clock-in.
    pub fn timesheet_view(&self, id: u64) -> Result<TimesheetView, AppError> {
        let timesheet = self.timesheet(id)?;
        let mut entries = self
            .time_entries
            .filter(|e| e.employee_id == timesheet.employee_id && timesheet.covers(e.date));
        entries.sort_by(|a, b| (a.date, a.clock_in).cmp(&(b.date, b.clock_in)));

        Ok(TimesheetView { timesheet, entries })
    }

    fn week_totals(&self, employee_id: u64, week_start: NaiveDate) -> Result<Hours, AppError> {
        let threshold = self.company()?.payroll_settings.overtime_threshold;
        let week_end = time::week_end(week_start);
        let entries = self.time_entries.filter(|e| {
            e.employee_id == employee_id
                && e.status != TimeEntryStatus::Rejected
                && e.date >= week_start
                && e.date <= week_end
        });
        Ok(time::week_hours(&entries, threshold))
    }

    pub fn add_timesheet(
        &self,
        employee_id: u64,
        week_start: NaiveDate,
    ) -> Result<Timesheet, AppError> {
        let employee = self.employee(employee_id)?;
        if self.timesheet_for_week(employee_id, week_start).is_some() {
            return Err(AppError::Conflict(format!(
                "A timesheet for the week of {week_start} already exists"
            )));
        }

        let hours = self.week_totals(employee_id, week_start)?;
        let now = Utc::now();
        let sheet = self.timesheets.insert(Timesheet {
            id: 0,
            employee_id,
            employee_name: employee.full_name(),
            department: employee.department,
            week_start,
            week_end: time::week_end(week_start),
            total_hours: hours.total,
            regular_hours: hours.regular,
            overtime_hours: hours.overtime,
            status: TimesheetStatus::Draft,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            rejected_reason: None,
            created_at: now,
            updated_at: now,
        });

        info!(timesheet_id = sheet.id, employee_id, "Timesheet created");
        Ok(sheet)
    }

    /// Moves a draft (or rejected) week; a rejected one goes back to draft.
    pub fn update_timesheet(&self, id: u64, patch: &Value) -> Result<Timesheet, AppError> {
        let current = self.timesheet(id)?;
        if !matches!(
            current.status,
            TimesheetStatus::Draft | TimesheetStatus::Rejected
        ) {
            return Err(AppError::BadRequest(format!(
                "Timesheet cannot be edited in status {}",
                current.status
            )));
        }

        let merged: Timesheet = merge_patch(&current, patch, &TIMESHEET_IMMUTABLE)?;
        if merged.week_start != current.week_start {
            if let Some(other) = self.timesheet_for_week(current.employee_id, merged.week_start) {
                return Err(AppError::Conflict(format!(
                    "Timesheet {} already covers that week",
                    other.id
                )));
            }
        }
        let hours = self.week_totals(current.employee_id, merged.week_start)?;

        self.timesheets.update(id, |t| {
            *t = merged;
            t.week_end = time::week_end(t.week_start);
            t.total_hours = hours.total;
            t.regular_hours = hours.regular;
            t.overtime_hours = hours.overtime;
            t.status = TimesheetStatus::Draft;
            t.rejected_reason = None;
            Ok(())
        })
    }

    /// draft|rejected -> submitted, with totals taken from the week's entries.
    pub fn submit_timesheet(&self, id: u64) -> Result<Timesheet, AppError> {
        let current = self.timesheet(id)?;
        let hours = self.week_totals(current.employee_id, current.week_start)?;

        let sheet = self.timesheets.update(id, |t| {
            if !matches!(t.status, TimesheetStatus::Draft | TimesheetStatus::Rejected) {
                return Err(AppError::BadRequest(format!(
                    "Timesheet cannot be submitted from status {}",
                    t.status
                )));
            }
            t.total_hours = hours.total;
            t.regular_hours = hours.regular;
            t.overtime_hours = hours.overtime;
            t.status = TimesheetStatus::Submitted;
            t.submitted_at = Some(Utc::now());
            t.rejected_reason = None;
            Ok(())
        })?;

        info!(timesheet_id = id, hours = sheet.total_hours, "Timesheet submitted");
        Ok(sheet)
    }

    pub fn approve_timesheet(&self, id: u64, approver: u64) -> Result<Timesheet, AppError> {
        decide(
            &self.timesheets,
            id,
            |t| t.status == TimesheetStatus::Submitted,
            |t| {
                t.status = TimesheetStatus::Approved;
                t.approved_by = Some(approver);
                t.approved_at = Some(Utc::now());
            },
        )
    }

    pub fn reject_timesheet(
        &self,
        id: u64,
        approver: u64,
        reason: Option<String>,
    ) -> Result<Timesheet, AppError> {
        decide(
            &self.timesheets,
            id,
            |t| t.status == TimesheetStatus::Submitted,
            |t| {
                t.status = TimesheetStatus::Rejected;
                t.approved_by = Some(approver);
                t.rejected_reason = reason;
            },
        )
    }

    /* ===============================
    Leave
    =============================== */

    pub fn leave_request(&self, id: u64) -> Result<LeaveRequest, AppError> {
        self.leave_requests.get(id)
    }

    pub fn leave_by_employee(&self, employee_id: u64) -> Vec<LeaveRequest> {
        self.leave_requests.filter(|l| l.employee_id == employee_id)
    }

    pub fn pending_leave(&self) -> Vec<LeaveRequest> {
        self.leave_by_status(LeaveStatus::Pending)
    }

    pub fn leave_by_status(&self, status: LeaveStatus) -> Vec<LeaveRequest> {
        self.leave_requests.filter(|l| l.status == status)
    }

    fn check_leave(&self, request: &LeaveRequest) -> Result<u32, AppError> {
        let days = leave_days(request.start_date, request.end_date).ok_or_else(|| {
            AppError::BadRequest("start_date cannot be after end_date".into())
        })?;
        if request.reason.trim().is_empty() {
            return Err(AppError::BadRequest("Reason is required".into()));
        }

        let clash = self.leave_requests.find_by(|l| {
            l.id != request.id
                && l.employee_id == request.employee_id
                && matches!(l.status, LeaveStatus::Pending | LeaveStatus::Approved)
                && l.start_date <= request.end_date
                && request.start_date <= l.end_date
        });
        if let Some(other) = clash {
            return Err(AppError::Conflict(format!(
                "Leave overlaps request {}",
                other.id
            )));
        }
        Ok(days)
    }

    pub fn add_leave(
        &self,
        employee_id: u64,
        payload: NewLeaveRequest,
    ) -> Result<LeaveRequest, AppError> {
        let employee = self.employee(employee_id)?;
        let now = Utc::now();

        let mut request = LeaveRequest {
            id: 0,
            employee_id,
            employee_name: employee.full_name(),
            department: employee.department,
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            total_days: 0,
            status: LeaveStatus::Pending,
            reason: payload.reason.trim().to_string(),
            requested_at: now,
            approved_by: None,
            approved_at: None,
            rejected_reason: None,
            created_at: now,
            updated_at: now,
        };
        request.total_days = self.check_leave(&request)?;

        let request = self.leave_requests.insert(request);
        info!(
            leave_id = request.id,
            employee_id,
            days = request.total_days,
            "Leave requested"
        );
        Ok(request)
    }

    /// Dates, type and reason of a request nobody has decided yet.
    pub fn update_leave(&self, id: u64, patch: &Value) -> Result<LeaveRequest, AppError> {
        let current = self.leave_request(id)?;
        if current.status != LeaveStatus::Pending {
            return Err(AppError::already_processed(LeaveRequest::NAME));
        }

        let mut merged: LeaveRequest = merge_patch(&current, patch, &LEAVE_IMMUTABLE)?;
        merged.total_days = self.check_leave(&merged)?;

        self.leave_requests.update(id, |row| {
            *row = merged;
            Ok(())
        })
    }

    pub fn approve_leave(&self, id: u64, approver: u64) -> Result<LeaveRequest, AppError> {
        let request = decide(
            &self.leave_requests,
            id,
            |l| l.status == LeaveStatus::Pending,
            |l| {
                l.status = LeaveStatus::Approved;
                l.approved_by = Some(approver);
                l.approved_at = Some(Utc::now());
            },
        )?;
        info!(leave_id = id, approver, "Leave approved");
        Ok(request)
    }

    pub fn reject_leave(
        &self,
        id: u64,
        approver: u64,
        reason: Option<String>,
    ) -> Result<LeaveRequest, AppError> {
        decide(
            &self.leave_requests,
            id,
            |l| l.status == LeaveStatus::Pending,
            |l| {
                l.status = LeaveStatus::Rejected;
                l.approved_by = Some(approver);
                l.rejected_reason = reason;
            },
        )
    }

    pub fn cancel_leave(&self, id: u64) -> Result<LeaveRequest, AppError> {
        decide(
            &self.leave_requests,
            id,
            |l| l.status == LeaveStatus::Pending,
            |l| l.status = LeaveStatus::Cancelled,
        )
    }
}
