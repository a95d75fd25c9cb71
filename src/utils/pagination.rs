use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{
    employee::Employee,
    leave_request::LeaveRequest,
    payroll::{PayrollEntry, PayrollPeriod},
    time_entry::TimeEntry,
    timesheet::Timesheet,
    user::UserProfile,
};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    EmployeePage = Page<Employee>,
    PayrollPeriodPage = Page<PayrollPeriod>,
    PayrollEntryPage = Page<PayrollEntry>,
    TimeEntryPage = Page<TimeEntry>,
    TimesheetPage = Page<Timesheet>,
    LeaveRequestPage = Page<LeaveRequest>,
    UserPage = Page<UserProfile>
)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: usize,
    #[schema(example = 1)]
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts one page out of an already filtered and sorted list.
    /// `page` is at least 1 and `per_page` is clamped to 1..=100.
    pub fn paginate(items: Vec<T>, page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

        let total = items.len();
        let total_pages = total.div_ceil(per_page as usize);
        let offset = (page as usize - 1) * per_page as usize;

        let data = items
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();

        Self {
            data,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}
