use crate::{
    api::PageQuery,
    auth::auth::AuthUser,
    model::{
        company::{Company, Department, Position},
        role::{Permission, Role},
        user::{UserCapabilities, UserProfile},
    },
    state::AppState,
    utils::pagination::{Page, UserPage},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;
use utoipa::IntoParams;

const ADMIN_SETTINGS: [Permission; 2] = [Permission::AdminAll, Permission::AdminSettings];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PositionQuery {
    /// Only positions in this department (case-insensitive)
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub department: Option<String>,
    /// Capability flag that must be set, e.g. `can_view_payroll`
    pub capability: Option<String>,
    pub active: Option<bool>,
}

/* =========================
Company
========================= */

#[utoipa::path(
    get,
    path = "/dashboard/settings/company",
    responses(
        (status = 200, body = Company)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_company(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.company()?))
}

#[utoipa::path(
    put,
    path = "/dashboard/settings/company",
    request_body(content = Object, description = "Any part of the company settings", example = json!({
        "payroll_settings": { "overtime_threshold": 38 },
        "tax_settings": { "state_tax_rate": 0.05 }
    })),
    responses(
        (status = 200, description = "Settings saved", body = Company),
        (status = 400, description = "Invalid setting"),
        (status = 403, description = "Missing settings permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_company(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&ADMIN_SETTINGS)?;
    Ok(HttpResponse::Ok().json(state.store.update_company(&body)?))
}

/* =========================
Reference data
========================= */

#[utoipa::path(
    get,
    path = "/dashboard/settings/departments",
    responses(
        (status = 200, description = "Active departments", body = [Department])
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_departments(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.active_departments()))
}

#[utoipa::path(
    get,
    path = "/dashboard/settings/positions",
    params(PositionQuery),
    responses(
        (status = 200, description = "Active positions", body = [Position])
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_positions(
    state: web::Data<AppState>,
    query: web::Query<PositionQuery>,
) -> actix_web::Result<impl Responder> {
    let positions = match query.department.as_deref() {
        Some(department) => state
            .store
            .positions_by_department(department)
            .into_iter()
            .filter(|p| p.is_active)
            .collect(),
        None => state.store.active_positions(),
    };
    Ok(HttpResponse::Ok().json(positions))
}

#[utoipa::path(
    get,
    path = "/dashboard/settings/users",
    params(UserQuery, PageQuery),
    responses(
        (status = 200, description = "User accounts without password hashes", body = UserPage),
        (status = 400, description = "Unknown capability")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let users = match query.capability.as_deref() {
        Some(name) => state.store.users_with_capability(name)?,
        None => state.store.users.all(),
    };

    let profiles: Vec<UserProfile> = users
        .iter()
        .filter(|u| {
            query.role.is_none_or(|r| u.role == r)
                && query.active.is_none_or(|a| u.is_active == a)
                && query
                    .department
                    .as_deref()
                    .is_none_or(|d| u.department.as_deref().is_some_and(|ud| ud.eq_ignore_ascii_case(d)))
        })
        .map(UserProfile::from)
        .collect();

    Ok(HttpResponse::Ok().json(Page::paginate(profiles, page.page, page.per_page)))
}

/// Capability flags a user record can carry.
#[utoipa::path(
    get,
    path = "/dashboard/settings/capabilities",
    responses(
        (status = 200, body = [String])
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_capabilities() -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(UserCapabilities::NAMES))
}

/// Throw away every change and reload the fixtures.
#[utoipa::path(
    post,
    path = "/dashboard/settings/reset",
    responses(
        (status = 200, body = Object, example = json!({
            "message": "Data reset to defaults"
        })),
        (status = 403, description = "Missing settings permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn reset_data(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&ADMIN_SETTINGS)?;

    warn!(user_id = auth.user_id, "Resetting all data to fixtures");
    state.store.reset();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Data reset to defaults"
    })))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn owner_updates_company_settings() {
        let state = state();
        let app = test_app!(state);
        let owner = token(&state, OWNER);

        let req = put("/dashboard/settings/company", &owner)
            .set_json(json!({"payroll_settings": {"overtime_threshold": 38}}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["payroll_settings"]["overtime_threshold"], 38.0);
        assert_eq!(body["name"], "AccuPay Solutions Inc.");

        let req = put("/dashboard/settings/company", &owner)
            .set_json(json!({"tax_settings": {"federal_tax_rate": 22}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Tax rates must be fractions between 0 and 1");
    }

    #[actix_web::test]
    async fn payroll_admin_cannot_open_settings() {
        let state = state();
        let app = test_app!(state);

        let req = get("/dashboard/settings/company", &token(&state, PAYROLL)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn reference_lists() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = get("/dashboard/settings/departments", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 6);

        let req = get("/dashboard/settings/positions?department=Finance", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["title"], "Accountant");
    }

    #[actix_web::test]
    async fn users_hide_password_hashes() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = get("/dashboard/settings/users?role=hr_manager", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 3);
        assert!(body["data"][0].get("password_hash").is_none());

        let req = get("/dashboard/settings/users?capability=can_fly", &hr).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reset_restores_fixtures() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = delete("/dashboard/employees/3", &hr).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = post("/dashboard/settings/reset", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Data reset to defaults");

        let req = get("/dashboard/employees/3", &hr).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
