use crate::auth::access::Decision;
use crate::auth::auth::AuthUser;
use crate::models::TokenType;
use crate::state::AppState;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    web::Data,
};
use tracing::debug;

/// Session token from the auth cookie, else from `Authorization: Bearer`.
pub fn token_from_request(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn redirect(to: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, to))
        .finish()
}

/// Guards every non-public, non-excluded path: no session goes to the login
/// page, a session without access goes back to the dashboard.
pub async fn access_gate(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let state = req
        .app_data::<Data<AppState>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App state missing"))?;

    let path = req.path().to_string();
    if !state.policy.requires_session(&path) {
        return next.call(req).await;
    }

    let session = match token_from_request(req.request(), &state.config.auth_cookie) {
        Some(token) => Some(state.session_claims(&token, TokenType::Access).await),
        None => None,
    };

    match state.policy.decide(&path, session.as_ref().map(Option::as_ref)) {
        Decision::Pass => {}
        Decision::Login(to) | Decision::Denied(to) => {
            debug!(path = %path, location = %to, "Access gate redirect");
            let resp = redirect(&to);
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    }

    if let Some(Some(claims)) = session {
        req.extensions_mut().insert(AuthUser::from(claims));
    }

    next.call(req).await
}
