use crate::{model::role::Role, state::AppState};
use actix_web::{HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

/// The roles offered on the sign-in screen, in display order.
const DEMO_ROLES: [(Role, &str, &str); 4] = [
    (Role::HrManager, "HR Manager", "Full access to all features"),
    (
        Role::PayrollAdmin,
        "Payroll Administrator",
        "Payroll and employee management",
    ),
    (
        Role::BusinessOwner,
        "Business Owner",
        "Analytics and reporting focus",
    ),
    (Role::Employee, "Employee", "Self-service and time tracking"),
];

const DEMO_DOMAIN: &str = "@accupay.com";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Where to go after signing in
    pub redirect: Option<String>,
    /// Set by the access gate, e.g. `session_expired`
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DemoAccount {
    pub role: Role,
    pub title: &'static str,
    pub description: &'static str,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginHints {
    pub login_endpoint: &'static str,
    /// Where the client should land after signing in.
    pub redirect: String,
    pub error: Option<String>,
    pub message: Option<String>,
    pub demo_password: String,
    pub demo_accounts: Vec<DemoAccount>,
}

fn error_message(code: &str) -> String {
    match code {
        "session_expired" => "Your session has expired. Please sign in again.".into(),
        "unauthorized" => "You do not have access to that page.".into(),
        other => format!("Sign-in required ({other})"),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service info", body = Object, example = json!({
            "name": "accupay",
            "version": "0.1.0",
            "docs": "/swagger-ui/"
        }))
    ),
    tag = "Home"
)]
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui/",
        "login": "/api/auth/login",
        "dashboard": "/dashboard"
    }))
}

/// What the sign-in screen shows: the pending redirect, why the visitor
/// landed here and the demo accounts.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 200, body = LoginHints)
    ),
    tag = "Home"
)]
#[get("/login")]
pub async fn login_page(
    state: web::Data<AppState>,
    query: web::Query<LoginQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();

    let demo_accounts = DEMO_ROLES
        .iter()
        .filter_map(|&(role, title, description)| {
            let users = state.store.users_by_role(role);
            let user = users
                .iter()
                .find(|u| u.email.ends_with(DEMO_DOMAIN))
                .or(users.first())?;
            Some(DemoAccount {
                role,
                title,
                description,
                email: user.email.clone(),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(LoginHints {
        login_endpoint: "/api/auth/login",
        redirect: query
            .redirect
            .filter(|r| r.starts_with('/') && !r.starts_with("//"))
            .unwrap_or_else(|| "/dashboard".into()),
        message: query.error.as_deref().map(error_message),
        error: query.error,
        demo_password: state.config.demo_password.clone(),
        demo_accounts,
    }))
}
