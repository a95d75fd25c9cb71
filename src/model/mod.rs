pub mod company;
pub mod employee;
pub mod leave_request;
pub mod payroll;
pub mod role;
pub mod time_entry;
pub mod timesheet;
pub mod user;
