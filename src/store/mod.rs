pub mod company;
pub mod employees;
pub mod payroll;
pub mod reports;
pub mod table;
pub mod time;
pub mod users;

use tracing::info;

use crate::fixtures::Fixtures;
use crate::model::{
    company::{Company, Department, Position},
    employee::Employee,
    leave_request::LeaveRequest,
    payroll::{PayrollEntry, PayrollPeriod, PayrollSummary},
    time_entry::TimeEntry,
    timesheet::Timesheet,
    user::User,
};
use crate::storage::{self, Storage};
use table::{Record, Table, timestamped_record};

timestamped_record!(Employee, storage::EMPLOYEES, "Employee");
timestamped_record!(User, storage::USERS, "User");
timestamped_record!(PayrollPeriod, storage::PAYROLL_PERIODS, "Payroll period");
timestamped_record!(PayrollEntry, storage::PAYROLL_ENTRIES, "Payroll entry");
timestamped_record!(TimeEntry, storage::TIME_ENTRIES, "Time entry");
timestamped_record!(Timesheet, storage::TIMESHEETS, "Timesheet");
timestamped_record!(LeaveRequest, storage::LEAVE_REQUESTS, "Leave request");
timestamped_record!(Company, storage::COMPANY, "Company");
timestamped_record!(Department, storage::DEPARTMENTS, "Department");
timestamped_record!(Position, storage::POSITIONS, "Position");

/// Summaries are keyed by their period.
impl Record for PayrollSummary {
    const STORAGE_KEY: &'static str = storage::PAYROLL_SUMMARIES;
    const NAME: &'static str = "Payroll summary";

    fn id(&self) -> u64 {
        self.period_id
    }

    fn set_id(&mut self, id: u64) {
        self.period_id = id;
    }
}

/// Every table of the service, shared by all workers.
pub struct AppStore {
    pub employees: Table<Employee>,
    pub users: Table<User>,
    pub payroll_periods: Table<PayrollPeriod>,
    pub payroll_entries: Table<PayrollEntry>,
    pub payroll_summaries: Table<PayrollSummary>,
    pub time_entries: Table<TimeEntry>,
    pub timesheets: Table<Timesheet>,
    pub leave_requests: Table<LeaveRequest>,
    pub company: Table<Company>,
    pub departments: Table<Department>,
    pub positions: Table<Position>,
    storage: Storage,
    seed: Fixtures,
}

impl AppStore {
    /// Loads each table from its snapshot, or from `seed` when none exists.
    pub fn new(storage: Storage, seed: Fixtures) -> Self {
        let s = seed.clone();
        Self {
            employees: Table::load(storage.clone(), s.employees),
            users: Table::load(storage.clone(), s.users),
            payroll_periods: Table::load(storage.clone(), s.payroll_periods),
            payroll_entries: Table::load(storage.clone(), s.payroll_entries),
            payroll_summaries: Table::load(storage.clone(), s.payroll_summaries),
            time_entries: Table::load(storage.clone(), s.time_entries),
            timesheets: Table::load(storage.clone(), s.timesheets),
            leave_requests: Table::load(storage.clone(), s.leave_requests),
            company: Table::load(storage.clone(), vec![s.company]),
            departments: Table::load(storage.clone(), s.departments),
            positions: Table::load(storage.clone(), s.positions),
            storage,
            seed,
        }
    }

    /// Drops every snapshot and puts the fixtures back.
    pub fn reset(&self) {
        self.storage.clear_all();

        let s = self.seed.clone();
        self.employees.reset(s.employees);
        self.users.reset(s.users);
        self.payroll_periods.reset(s.payroll_periods);
        self.payroll_entries.reset(s.payroll_entries);
        self.payroll_summaries.reset(s.payroll_summaries);
        self.time_entries.reset(s.time_entries);
        self.timesheets.reset(s.timesheets);
        self.leave_requests.reset(s.leave_requests);
        self.company.reset(vec![s.company]);
        self.departments.reset(s.departments);
        self.positions.reset(s.positions);

        info!("Store reset to fixtures");
    }
}
