pub mod payroll;
pub mod time;
