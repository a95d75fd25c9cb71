use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Approved,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayType {
    Salary,
    Hourly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollPeriod {
    #[schema(example = 1)]
    pub id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pay_date: NaiveDate,
    pub status: PeriodStatus,
    pub employee_count: u32,
    pub gross_pay: f64,
    pub net_pay: f64,
    pub total_taxes: f64,
    pub total_deductions: f64,
    pub total_benefits: f64,
    pub overtime_hours: f64,
    pub overtime_pay: f64,
    pub regular_hours: f64,
    pub regular_pay: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollEntry {
    #[schema(example = 1)]
    pub id: u64,
    pub employee_id: u64,
    pub period_id: u64,
    #[schema(example = "John Smith")]
    pub employee_name: String,
    pub department: String,
    pub position: String,
    pub pay_type: PayType,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub regular_rate: f64,
    pub overtime_rate: f64,
    pub gross_pay: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub other_deductions: f64,
    pub benefits: f64,
    pub net_pay: f64,
    pub status: EntryStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayrollEntry {
    pub fn total_taxes(&self) -> f64 {
        self.federal_tax + self.state_tax + self.social_security + self.medicare
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollSummary {
    pub period_id: u64,
    pub total_employees: u32,
    pub total_gross_pay: f64,
    pub total_net_pay: f64,
    pub total_taxes: f64,
    pub total_deductions: f64,
    pub average_pay: f64,
    pub median_pay: f64,
    pub highest_pay: f64,
    pub lowest_pay: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayrollPeriod {
    #[schema(example = "2024-02-16")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-02-29")]
    pub end_date: NaiveDate,
    #[schema(example = "2024-03-01")]
    pub pay_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayrollEntry {
    pub employee_id: u64,
    pub period_id: u64,
    pub regular_hours: f64,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub other_deductions: f64,
    #[serde(default)]
    pub benefits: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, ToSchema)]
pub struct HoursOverride {
    pub regular_hours: f64,
    #[serde(default)]
    pub overtime_hours: f64,
}

/// Options for processing a period.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProcessPeriod {
    /// Hours per employee id, replacing the default 80 regular hours.
    #[serde(default)]
    pub custom_hours: BTreeMap<u64, HoursOverride>,
}
