use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Intern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PayFrequency {
    Weekly,
    BiWeekly,
    SemiMonthly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[schema(example = "123 Main St")]
    pub street: String,
    #[schema(example = "San Francisco")]
    pub city: String,
    #[schema(example = "CA")]
    pub state: String,
    #[schema(example = "94105")]
    pub zip_code: String,
    #[schema(example = "USA")]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersonalInfo {
    pub date_of_birth: NaiveDate,
    #[schema(example = "123-45-6789")]
    pub ssn: String,
    pub emergency_contact: EmergencyContact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DirectDeposit {
    pub bank_name: String,
    #[schema(example = "****1234")]
    pub account_number: String,
    #[schema(example = "021000021")]
    pub routing_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollInfo {
    pub pay_frequency: PayFrequency,
    pub tax_exemptions: u32,
    pub direct_deposit: DirectDeposit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Benefits {
    pub health_insurance: bool,
    pub dental_insurance: bool,
    pub vision_insurance: bool,
    pub retirement_401k: bool,
    /// Days per year.
    pub paid_time_off: u32,
    pub sick_leave: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Smith")]
    pub last_name: String,
    #[schema(example = "john.smith@company.com")]
    pub email: String,
    #[schema(example = "(555) 123-4567")]
    pub phone: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Senior Developer")]
    pub position: String,
    pub status: EmployeeStatus,
    pub hire_date: NaiveDate,
    #[schema(example = 85000.0)]
    pub salary: f64,
    pub hourly_rate: Option<f64>,
    pub employment_type: EmploymentType,
    pub manager_id: Option<u64>,
    pub address: Address,
    pub personal_info: PersonalInfo,
    pub payroll_info: PayrollInfo,
    pub benefits: Benefits,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Payload for creating an employee; id and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub status: EmployeeStatus,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub hourly_rate: Option<f64>,
    pub employment_type: EmploymentType,
    pub manager_id: Option<u64>,
    pub address: Address,
    pub personal_info: PersonalInfo,
    pub payroll_info: PayrollInfo,
    pub benefits: Benefits,
}

impl NewEmployee {
    pub fn into_employee(self, now: DateTime<Utc>) -> Employee {
        Employee {
            id: 0,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            department: self.department,
            position: self.position,
            status: self.status,
            hire_date: self.hire_date,
            salary: self.salary,
            hourly_rate: self.hourly_rate,
            employment_type: self.employment_type,
            manager_id: self.manager_id,
            address: self.address,
            personal_info: self.personal_info,
            payroll_info: self.payroll_info,
            benefits: self.benefits,
            created_at: now,
            updated_at: now,
        }
    }
}
