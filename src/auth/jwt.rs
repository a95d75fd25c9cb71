use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
};
use uuid::Uuid;

use crate::model::user::User;
use crate::models::{Claims, TokenType};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn issue(
    user: &User,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let iat = now();
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        role: user.role,
        permissions: user.role.permissions().to_vec(),
        employee_id: user.employee_id,
        iat,
        exp: iat + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(
    user: &User,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(user, TokenType::Access, secret, ttl)
}

pub fn generate_refresh_token(
    user: &User,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    issue(user, TokenType::Refresh, secret, ttl)
}

/// Decodes a token and checks expiry (`now >= exp` is expired).
///
/// With `verify_signature` off the payload is trusted as-is; this mirrors
/// deployments where the gate only reads the claims.
pub fn verify_token(token: &str, secret: &str, verify_signature: bool) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    if !verify_signature {
        validation.insecure_disable_signature_validation();
    }

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if now() >= claims.exp {
        return Err("Token expired".to_string());
    }
    Ok(claims)
}
