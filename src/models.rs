use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::{Permission, Role};
use crate::model::user::UserProfile;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "hr@accupay.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    /// When given, the account must hold this role.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: usize,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogoutReqDto {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: u64,
    /// Email of the signed-in user.
    pub sub: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}
