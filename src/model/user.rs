use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Per-user capability switches shown on the profile and settings screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserCapabilities {
    pub can_view_employees: bool,
    pub can_edit_employees: bool,
    pub can_delete_employees: bool,
    pub can_process_payroll: bool,
    pub can_view_payroll: bool,
    pub can_edit_payroll: bool,
    pub can_view_reports: bool,
    pub can_generate_reports: bool,
    pub can_manage_users: bool,
    pub can_view_settings: bool,
    pub can_edit_settings: bool,
}

impl UserCapabilities {
    pub const NAMES: [&'static str; 11] = [
        "can_view_employees",
        "can_edit_employees",
        "can_delete_employees",
        "can_process_payroll",
        "can_view_payroll",
        "can_edit_payroll",
        "can_view_reports",
        "can_generate_reports",
        "can_manage_users",
        "can_view_settings",
        "can_edit_settings",
    ];

    pub fn get(&self, name: &str) -> Option<bool> {
        let value = match name {
            "can_view_employees" => self.can_view_employees,
            "can_edit_employees" => self.can_edit_employees,
            "can_delete_employees" => self.can_delete_employees,
            "can_process_payroll" => self.can_process_payroll,
            "can_view_payroll" => self.can_view_payroll,
            "can_edit_payroll" => self.can_edit_payroll,
            "can_view_reports" => self.can_view_reports,
            "can_generate_reports" => self.can_generate_reports,
            "can_manage_users" => self.can_manage_users,
            "can_view_settings" => self.can_view_settings,
            "can_edit_settings" => self.can_edit_settings,
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub permissions: UserCapabilities,
    #[serde(default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self::new(user)
    }
}

/// What the API exposes about a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "sarah.johnson@company.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub permissions: UserCapabilities,
    pub employee_id: Option<u64>,
}

impl UserProfile {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            department: user.department.clone(),
            position: user.position.clone(),
            avatar: user.avatar.clone(),
            is_active: user.is_active,
            last_login: user.last_login,
            permissions: user.permissions,
            employee_id: user.employee_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
}
