use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeEntryStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeEntry {
    #[schema(example = 1)]
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub department: String,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub clock_in: NaiveTime,
    #[schema(value_type = Option<String>, example = "17:30:00")]
    pub clock_out: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub break_start: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub break_end: Option<NaiveTime>,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub status: TimeEntryStatus,
    pub notes: Option<String>,
    pub approved_by: Option<u64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntryStatus {
    /// Still waiting for an approver.
    pub fn is_undecided(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTimeEntry {
    /// Ignored for employees recording their own time.
    pub employee_id: Option<u64>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub clock_in: NaiveTime,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub clock_out: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub break_start: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub break_end: Option<NaiveTime>,
    pub notes: Option<String>,
}
