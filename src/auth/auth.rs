use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::AppError;
use crate::model::role::{Permission, Role};
use crate::models::Claims;

/// The signed-in user, attached to the request by the access gate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub jti: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
            employee_id: claims.employee_id,
            jti: claims.jti,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("Authentication required".into())),
        )
    }
}

impl AuthUser {
    /// `admin:all` counts as every permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission) || self.permissions.contains(&Permission::AdminAll)
    }

    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    pub fn require_any(&self, permissions: &[Permission]) -> Result<(), AppError> {
        if self.has_any(permissions) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to perform this action".into(),
            ))
        }
    }

    pub fn own_employee_id(&self) -> Result<u64, AppError> {
        self.employee_id.ok_or_else(|| {
            AppError::Forbidden("No employee record is linked to this account".into())
        })
    }

    /// Which employee a request may act on.
    ///
    /// Holders of any `broad` permission may name anyone (or nobody, meaning
    /// all employees); everyone else is pinned to their own record.
    pub fn employee_scope(
        &self,
        requested: Option<u64>,
        broad: &[Permission],
    ) -> Result<Option<u64>, AppError> {
        if self.has_any(broad) {
            return Ok(requested);
        }

        let own = self.own_employee_id()?;
        match requested {
            Some(id) if id != own => Err(AppError::Forbidden(
                "Employees can only access their own records".into(),
            )),
            _ => Ok(Some(own)),
        }
    }
}
