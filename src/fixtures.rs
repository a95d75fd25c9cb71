use serde::de::DeserializeOwned;

use crate::model::{
    company::{Company, Department, Position},
    employee::Employee,
    leave_request::LeaveRequest,
    payroll::{PayrollEntry, PayrollPeriod, PayrollSummary},
    time_entry::TimeEntry,
    timesheet::Timesheet,
    user::User,
};

const EMPLOYEES: &str = include_str!("fixtures/employees.json");
const USERS: &str = include_str!("fixtures/users.json");
const PAYROLL_PERIODS: &str = include_str!("fixtures/payroll_periods.json");
const PAYROLL_ENTRIES: &str = include_str!("fixtures/payroll_entries.json");
const PAYROLL_SUMMARIES: &str = include_str!("fixtures/payroll_summaries.json");
const TIME_ENTRIES: &str = include_str!("fixtures/time_entries.json");
const TIMESHEETS: &str = include_str!("fixtures/timesheets.json");
const LEAVE_REQUESTS: &str = include_str!("fixtures/leave_requests.json");
const COMPANY: &str = include_str!("fixtures/company.json");
const DEPARTMENTS: &str = include_str!("fixtures/departments.json");
const POSITIONS: &str = include_str!("fixtures/positions.json");

/// The demo data set every table starts from (and returns to on reset).
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub employees: Vec<Employee>,
    pub users: Vec<User>,
    pub payroll_periods: Vec<PayrollPeriod>,
    pub payroll_entries: Vec<PayrollEntry>,
    pub payroll_summaries: Vec<PayrollSummary>,
    pub time_entries: Vec<TimeEntry>,
    pub timesheets: Vec<Timesheet>,
    pub leave_requests: Vec<LeaveRequest>,
    pub company: Company,
    pub departments: Vec<Department>,
    pub positions: Vec<Position>,
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("fixture {name} is invalid: {e}"))
}

impl Fixtures {
    /// Parses the embedded seed data. Every seeded user gets `password_hash`.
    pub fn load(password_hash: &str) -> anyhow::Result<Self> {
        let mut users: Vec<User> = parse("users", USERS)?;
        for user in &mut users {
            user.password_hash = password_hash.to_string();
        }

        Ok(Self {
            employees: parse("employees", EMPLOYEES)?,
            users,
            payroll_periods: parse("payroll_periods", PAYROLL_PERIODS)?,
            payroll_entries: parse("payroll_entries", PAYROLL_ENTRIES)?,
            payroll_summaries: parse("payroll_summaries", PAYROLL_SUMMARIES)?,
            time_entries: parse("time_entries", TIME_ENTRIES)?,
            timesheets: parse("timesheets", TIMESHEETS)?,
            leave_requests: parse("leave_requests", LEAVE_REQUESTS)?,
            company: parse("company", COMPANY)?,
            departments: parse("departments", DEPARTMENTS)?,
            positions: parse("positions", POSITIONS)?,
        })
    }
}
