use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Bereavement,
    JuryDuty,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub department: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Calendar days, both ends included.
    pub total_days: u32,
    pub status: LeaveStatus,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
    pub approved_by: Option<u64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLeaveRequest {
    /// Ignored for employees applying for themselves.
    pub employee_id: Option<u64>,
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "2024-03-04")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-08")]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
}

/// Inclusive calendar-day length of a leave range; `None` when the range is inverted.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    let days = (end - start).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days + 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn leave_days_counts_both_ends() {
        assert_eq!(leave_days(date("2024-02-15"), date("2024-02-19")), Some(5));
        assert_eq!(leave_days(date("2024-01-20"), date("2024-01-20")), Some(1));
        assert_eq!(leave_days(date("2024-01-21"), date("2024-01-20")), None);
    }
}
