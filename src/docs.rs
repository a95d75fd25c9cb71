use crate::api::home::{DemoAccount, LoginHints};
use crate::api::profile::ProfileView;
use crate::api::time_entry::ClockBody;
use crate::api::RejectBody;
use crate::model::company::{
    Company, CompanyBenefits, CompanyContact, Department, PayrollSettings, Position, SalaryRange,
    TaxSettings,
};
use crate::model::employee::{
    Address, Benefits, DirectDeposit, EmergencyContact, Employee, EmployeeStatus, EmploymentType,
    NewEmployee, PayFrequency, PayrollInfo, PersonalInfo,
};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest};
use crate::model::payroll::{
    EntryStatus, HoursOverride, NewPayrollEntry, NewPayrollPeriod, PayType, PayrollEntry,
    PayrollPeriod, PayrollSummary, PeriodStatus, ProcessPeriod,
};
use crate::model::role::{Permission, Role};
use crate::model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryStatus};
use crate::model::timesheet::{NewTimesheet, Timesheet, TimesheetStatus, TimesheetView};
use crate::model::user::{UpdateProfile, UserCapabilities, UserProfile};
use crate::models::{LoginReqDto, LoginResponse, LogoutReqDto, TokenPair};
use crate::store::employees::{EmployeeSort, SortOrder};
use crate::store::reports::{
    DashboardStats, DepartmentHeadcount, HeadcountReport, PayrollReport, PeriodLine, TimeReport,
};
use crate::utils::pagination::{
    EmployeePage, LeaveRequestPage, PayrollEntryPage, PayrollPeriodPage, TimeEntryPage,
    TimesheetPage, UserPage,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AccuPay Admin API",
        version = "1.0.0",
        description = r#"
## AccuPay payroll administration

JSON back end for the AccuPay dashboard: people, pay runs, time and leave.

### 🔹 Key Features
- **Employees**
  - Directory with search, filters and sorting; create, edit, remove
- **Payroll**
  - Pay periods from pending through processing to completed, with per-employee entries and summaries
- **Time Tracking**
  - Clock in/out, breaks, weekly timesheets and leave requests with approvals
- **Reports & Settings**
  - Headcount, payroll and time reports; company configuration

### 🔐 Security
Sign in at `/api/auth/login`. The session token travels in the `accupay_token`
cookie or as a **JWT Bearer** header. Every `/dashboard` path is checked by the
access gate: no session redirects to `/login`, a missing role redirects to
`/dashboard?error=unauthorized`.

### 📦 Response Format
- JSON responses; errors as `{"message": "..."}`
- Lists are paginated: `{data, page, per_page, total, total_pages}`

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::home::index,
        crate::api::home::login_page,

        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::dashboard::dashboard_stats,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::direct_reports,

        crate::api::payroll::list_periods,
        crate::api::payroll::create_period,
        crate::api::payroll::get_period,
        crate::api::payroll::update_period,
        crate::api::payroll::period_entries,
        crate::api::payroll::period_summary,
        crate::api::payroll::process_period,
        crate::api::payroll::complete_period,
        crate::api::payroll::cancel_period,
        crate::api::payroll::list_entries,
        crate::api::payroll::create_entry,
        crate::api::payroll::update_entry,

        crate::api::time_entry::list_time_entries,
        crate::api::time_entry::create_time_entry,
        crate::api::time_entry::get_time_entry,
        crate::api::time_entry::update_time_entry,
        crate::api::time_entry::approve_time_entry,
        crate::api::time_entry::reject_time_entry,
        crate::api::time_entry::clock_in,
        crate::api::time_entry::clock_out,
        crate::api::time_entry::break_start,
        crate::api::time_entry::break_end,

        crate::api::timesheet::list_timesheets,
        crate::api::timesheet::create_timesheet,
        crate::api::timesheet::get_timesheet,
        crate::api::timesheet::update_timesheet,
        crate::api::timesheet::submit_timesheet,
        crate::api::timesheet::approve_timesheet,
        crate::api::timesheet::reject_timesheet,

        crate::api::leave_request::list_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::reports::headcount,
        crate::api::reports::payroll,
        crate::api::reports::time,

        crate::api::settings::get_company,
        crate::api::settings::update_company,
        crate::api::settings::list_departments,
        crate::api::settings::list_positions,
        crate::api::settings::list_users,
        crate::api::settings::list_capabilities,
        crate::api::settings::reset_data,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile,
        crate::api::profile::my_payroll
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            TokenPair,
            LogoutReqDto,
            Role,
            Permission,
            UserCapabilities,
            UserProfile,
            UpdateProfile,
            ProfileView,
            LoginHints,
            DemoAccount,
            Employee,
            NewEmployee,
            EmployeeStatus,
            EmploymentType,
            PayFrequency,
            Address,
            EmergencyContact,
            PersonalInfo,
            DirectDeposit,
            PayrollInfo,
            Benefits,
            EmployeeSort,
            SortOrder,
            PayrollPeriod,
            PayrollEntry,
            PayrollSummary,
            NewPayrollPeriod,
            NewPayrollEntry,
            ProcessPeriod,
            HoursOverride,
            PeriodStatus,
            EntryStatus,
            PayType,
            TimeEntry,
            NewTimeEntry,
            TimeEntryStatus,
            ClockBody,
            Timesheet,
            TimesheetView,
            NewTimesheet,
            TimesheetStatus,
            LeaveRequest,
            NewLeaveRequest,
            LeaveType,
            LeaveStatus,
            RejectBody,
            Company,
            CompanyContact,
            PayrollSettings,
            TaxSettings,
            CompanyBenefits,
            Department,
            Position,
            SalaryRange,
            DashboardStats,
            HeadcountReport,
            DepartmentHeadcount,
            PayrollReport,
            PeriodLine,
            TimeReport,
            EmployeePage,
            PayrollPeriodPage,
            PayrollEntryPage,
            TimeEntryPage,
            TimesheetPage,
            LeaveRequestPage,
            UserPage
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Home", description = "Service info and sign-in hints"),
        (name = "Auth", description = "Sessions: login, refresh, logout"),
        (name = "Dashboard", description = "Home figures"),
        (name = "Employee", description = "Employee directory"),
        (name = "Payroll", description = "Pay periods, entries and summaries"),
        (name = "Time Tracking", description = "Time entries, clock and timesheets"),
        (name = "Leave", description = "Leave requests and approvals"),
        (name = "Reports", description = "Headcount, payroll and time reports"),
        (name = "Settings", description = "Company configuration and users"),
        (name = "Profile", description = "The signed-in user"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme the paths refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
