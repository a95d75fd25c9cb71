use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::time_entry::TimeEntry;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Timesheet {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub department: String,
    #[schema(example = "2024-01-15")]
    pub week_start: NaiveDate,
    #[schema(example = "2024-01-21")]
    pub week_end: NaiveDate,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub status: TimesheetStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<u64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timesheet {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.week_start && date <= self.week_end
    }
}

/// A timesheet together with the time entries recorded in its week.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimesheetView {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entries: Vec<TimeEntry>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTimesheet {
    /// Ignored for employees submitting their own week.
    pub employee_id: Option<u64>,
    #[schema(example = "2024-01-22")]
    pub week_start: NaiveDate,
}
