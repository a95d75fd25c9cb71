use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    HrManager,
    PayrollAdmin,
    BusinessOwner,
    Employee,
}

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
pub enum Permission {
    #[serde(rename = "read:all")]
    #[strum(serialize = "read:all")]
    ReadAll,
    #[serde(rename = "write:all")]
    #[strum(serialize = "write:all")]
    WriteAll,
    #[serde(rename = "delete:all")]
    #[strum(serialize = "delete:all")]
    DeleteAll,
    #[serde(rename = "admin:all")]
    #[strum(serialize = "admin:all")]
    AdminAll,
    #[serde(rename = "read:payroll")]
    #[strum(serialize = "read:payroll")]
    ReadPayroll,
    #[serde(rename = "write:payroll")]
    #[strum(serialize = "write:payroll")]
    WritePayroll,
    #[serde(rename = "read:employees")]
    #[strum(serialize = "read:employees")]
    ReadEmployees,
    #[serde(rename = "read:reports")]
    #[strum(serialize = "read:reports")]
    ReadReports,
    #[serde(rename = "read:analytics")]
    #[strum(serialize = "read:analytics")]
    ReadAnalytics,
    #[serde(rename = "admin:settings")]
    #[strum(serialize = "admin:settings")]
    AdminSettings,
    #[serde(rename = "read:own")]
    #[strum(serialize = "read:own")]
    ReadOwn,
    #[serde(rename = "write:own_timesheet")]
    #[strum(serialize = "write:own_timesheet")]
    WriteOwnTimesheet,
    #[serde(rename = "read:own_payroll")]
    #[strum(serialize = "read:own_payroll")]
    ReadOwnPayroll,
}

impl Role {
    /// Permissions granted to every user holding this role.
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;

        match self {
            Role::Admin => &[AdminAll, ReadAll, WriteAll, DeleteAll],
            Role::HrManager => &[ReadAll, WriteAll, DeleteAll, AdminAll],
            Role::PayrollAdmin => &[ReadPayroll, WritePayroll, ReadEmployees, ReadReports],
            Role::BusinessOwner => &[ReadAll, ReadReports, ReadAnalytics, AdminSettings],
            Role::Employee => &[ReadOwn, WriteOwnTimesheet, ReadOwnPayroll],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn permission_strings_round_trip_through_strum() {
        assert_eq!(Permission::WriteOwnTimesheet.as_ref(), "write:own_timesheet");
        assert_eq!(
            Permission::from_str("admin:settings").unwrap(),
            Permission::AdminSettings
        );
        assert!(Permission::from_str("launch:rockets").is_err());
    }

    #[test]
    fn role_names_use_snake_case() {
        assert_eq!(Role::HrManager.to_string(), "hr_manager");
        assert_eq!(Role::from_str("business_owner").unwrap(), Role::BusinessOwner);
        assert_eq!(
            serde_json::to_string(&Role::PayrollAdmin).unwrap(),
            "\"payroll_admin\""
        );
    }

    #[test]
    fn employees_only_get_self_service_permissions() {
        let perms = Role::Employee.permissions();
        assert!(perms.contains(&Permission::ReadOwn));
        assert!(!perms.contains(&Permission::ReadAll));
    }
}
