use std::time::Duration;

use actix_web::{
    HttpRequest, HttpResponse, Responder,
    cookie::{Cookie, SameSite, time},
    web,
};
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::{generate_access_token, generate_refresh_token};
use crate::auth::middleware::token_from_request;
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::error::AppError;
use crate::model::user::{User, UserProfile};
use crate::models::{LoginReqDto, LoginResponse, LogoutReqDto, TokenPair, TokenType};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn session_cookie(config: &Config, token: &str) -> Cookie<'static> {
    Cookie::build(config.auth_cookie.clone(), token.to_string())
        .path("/")
        .max_age(time::Duration::seconds(config.access_token_ttl as i64))
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .http_only(true)
        .finish()
}

fn cleared_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.auth_cookie.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();
    cookie
}

/// Access + refresh pair for `user`.
fn issue_pair(user: &User, config: &Config) -> Result<TokenPair, AppError> {
    let (access_token, _) = generate_access_token(user, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| AppError::Internal(format!("signing access token: {e}")))?;
    let (refresh_token, _) =
        generate_refresh_token(user, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(|e| AppError::Internal(format!("signing refresh token: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/* ===============================
Login
=============================== */
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in; the session cookie is set", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account does not hold the requested role"),
        (status = 429, description = "Too many attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    info!("Login request received");
    let config = &state.config;

    if config.simulated_latency_ms > 0 {
        actix_web::rt::time::sleep(Duration::from_millis(config.simulated_latency_ms)).await;
    }

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::BadRequest("Email and password are required".into()).into());
    }

    // 2️⃣ Find an active account
    let account = match state.store.user_by_email(&user.email) {
        Some(account) if account.is_active => account,
        Some(_) => {
            info!("Invalid credentials: account inactive");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
        }
        None => {
            info!("Invalid credentials: unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &account.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    // 4️⃣ Role picked on the sign-in screen
    if let Some(role) = user.role {
        if role != account.role {
            info!(requested = %role, actual = %account.role, "Role mismatch");
            return Err(AppError::Forbidden(format!("User does not have the {role} role")).into());
        }
    }

    // 5️⃣ Tokens
    debug!(user_id = account.id, "Issuing tokens");
    let pair = issue_pair(&account, config)?;

    // 6️⃣ last_login (non-fatal)
    let account = match state.store.record_login(account.id) {
        Ok(updated) => updated,
        Err(e) => {
            error!(error = %e, "Failed to update last_login");
            account
        }
    };

    info!(user_id = account.id, role = %account.role, "Login successful");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(config, &pair.access_token))
        .json(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
            expires_in: config.access_token_ttl,
            user: UserProfile::from(&account),
        }))
}

/* ===============================
Refresh
=============================== */
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid, expired or already used refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let token = bearer(&req)
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

    let claims = state
        .session_claims(token, TokenType::Refresh)
        .await
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    // 🔥 the old refresh token is single use; a concurrent refresh loses here
    if !state.revoked.claim(&claims.jti).await {
        return Err(AppError::Unauthorized("Invalid refresh token".into()).into());
    }

    let account = state
        .store
        .user(claims.user_id)
        .ok()
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("Account is no longer active".into()))?;

    // 🔄 new pair; role or link changes since login take effect here
    let pair = issue_pair(&account, &state.config)?;
    debug!(user_id = account.id, "Refresh token rotated");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.config, &pair.access_token))
        .json(pair))
}

/* ===============================
Logout
=============================== */
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body(content = Option<LogoutReqDto>, description = "Refresh token to revoke as well"),
    responses(
        (status = 204, description = "Session cleared; succeeds even without a session")
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    body: Option<web::Json<LogoutReqDto>>,
    state: web::Data<AppState>,
) -> impl Responder {
    let config = &state.config;
    let mut revoke = Vec::new();

    // 1️⃣ the session token (cookie or bearer)
    if let Some(token) = token_from_request(&req, &config.auth_cookie) {
        if let Some(claims) = state.session_claims(&token, TokenType::Access).await {
            revoke.push(claims.jti);
        }
    }

    // 2️⃣ the refresh token, if the client sent it
    if let Some(refresh) = body.and_then(|b| b.into_inner().refresh_token) {
        if let Some(claims) = state.session_claims(&refresh, TokenType::Refresh).await {
            revoke.push(claims.jti);
        }
    }

    state.revoked.revoke_all(&revoke).await;
    info!(revoked = revoke.len(), "Logout");

    // 3️⃣ success (even if there was no session)
    HttpResponse::NoContent()
        .cookie(cleared_cookie(config))
        .finish()
}
