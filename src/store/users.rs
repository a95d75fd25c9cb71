use chrono::Utc;
use tracing::debug;

use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::{UpdateProfile, User, UserCapabilities};
use crate::store::AppStore;

impl AppStore {
    pub fn user(&self, id: u64) -> Result<User, AppError> {
        self.users.get(id)
    }

    /// Emails compare case-insensitively.
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim();
        self.users.find_by(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn users_by_role(&self, role: Role) -> Vec<User> {
        self.users.filter(|u| u.role == role)
    }

    pub fn active_users(&self) -> Vec<User> {
        self.users.filter(|u| u.is_active)
    }

    pub fn users_by_department(&self, department: &str) -> Vec<User> {
        self.users
            .filter(|u| u.department.as_deref() == Some(department))
    }

    /// Users whose capability flag `name` (e.g. `can_view_payroll`) is set.
    pub fn users_with_capability(&self, name: &str) -> Result<Vec<User>, AppError> {
        // reject unknown names up front instead of returning an empty list
        if !UserCapabilities::NAMES.contains(&name) {
            return Err(AppError::BadRequest(format!("Unknown capability '{name}'")));
        }
        Ok(self
            .users
            .filter(|u| u.permissions.get(name).unwrap_or(false)))
    }

    pub fn update_profile(&self, id: u64, changes: UpdateProfile) -> Result<User, AppError> {
        if changes.first_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("First name is required".into()));
        }
        if changes.last_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("Last name is required".into()));
        }

        self.users.update(id, |user| {
            if let Some(v) = changes.first_name {
                user.first_name = v.trim().to_string();
            }
            if let Some(v) = changes.last_name {
                user.last_name = v.trim().to_string();
            }
            if let Some(v) = changes.department {
                user.department = Some(v);
            }
            if let Some(v) = changes.position {
                user.position = Some(v);
            }
            if let Some(v) = changes.avatar {
                user.avatar = Some(v);
            }
            Ok(())
        })
    }

    pub fn record_login(&self, id: u64) -> Result<User, AppError> {
        debug!(user_id = id, "Recording last login");
        self.users.update(id, |user| {
            user.last_login = Some(Utc::now());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::store;

    #[test]
    fn email_lookup_ignores_case() {
        let store = store();
        let user = store.user_by_email(" HR@AccuPay.com ").unwrap();
        assert_eq!(user.id, 9);
        assert!(store.user_by_email("ghost@accupay.com").is_none());
    }

    #[test]
    fn role_department_and_capability_queries() {
        let store = store();

        assert_eq!(store.users_by_role(Role::HrManager).len(), 3);
        assert_eq!(store.users_by_department("Finance").len(), 3);
        assert_eq!(store.active_users().len(), 12);

        let editors = store.users_with_capability("can_edit_settings").unwrap();
        let ids: Vec<u64> = editors.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 4, 9, 11]);

        assert!(store.users_with_capability("can_fly").is_err());
    }

    #[test]
    fn profile_update_only_touches_given_fields() {
        let store = store();

        let updated = store
            .update_profile(
                2,
                UpdateProfile {
                    position: Some("Head of People".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.position.as_deref(), Some("Head of People"));
        assert_eq!(updated.first_name, "Sarah");

        let err = store
            .update_profile(
                2,
                UpdateProfile {
                    first_name: Some("  ".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "First name is required");
    }

    #[test]
    fn login_is_recorded() {
        let store = store();
        let before = store.user(5).unwrap().last_login;

        let after = store.record_login(5).unwrap().last_login;
        assert!(after > before);
    }
}
