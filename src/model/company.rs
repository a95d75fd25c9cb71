use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::{Address, EmploymentType, PayFrequency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollSettings {
    pub pay_frequency: PayFrequency,
    /// Weekday number the company pays on (5 = Friday).
    pub pay_day: u32,
    /// Weekly hours before overtime applies.
    pub overtime_threshold: f64,
    pub overtime_multiplier: f64,
    pub holiday_pay: bool,
    /// Hours accrued per pay period.
    pub sick_leave_accrual: f64,
    pub vacation_accrual: f64,
}

/// Rates are fractions of gross pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaxSettings {
    #[schema(example = 0.22)]
    pub federal_tax_rate: f64,
    #[schema(example = 0.06)]
    pub state_tax_rate: f64,
    #[schema(example = 0.062)]
    pub social_security_rate: f64,
    #[schema(example = 0.0145)]
    pub medicare_rate: f64,
    pub unemployment_rate: f64,
    pub workers_comp_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyBenefits {
    pub health_insurance: bool,
    pub dental_insurance: bool,
    pub vision_insurance: bool,
    pub retirement_401k: bool,
    pub life_insurance: bool,
    pub disability_insurance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyContact {
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: u64,
    #[schema(example = "AccuPay Solutions Inc.")]
    pub name: String,
    pub legal_name: String,
    #[schema(example = "12-3456789")]
    pub tax_id: String,
    pub address: Address,
    pub contact: CompanyContact,
    pub payroll_settings: PayrollSettings,
    pub tax_settings: TaxSettings,
    pub benefits: CompanyBenefits,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    pub description: String,
    pub manager_id: Option<u64>,
    pub budget: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub id: u64,
    #[schema(example = "Senior Developer")]
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: SalaryRange,
    pub employment_type: EmploymentType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
