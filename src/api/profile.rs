use crate::{
    api::PageQuery,
    auth::auth::AuthUser,
    model::{
        employee::Employee,
        user::{UpdateProfile, UserProfile},
    },
    state::AppState,
    utils::pagination::{Page, PayrollEntryPage},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub user: UserProfile,
    /// The linked employee record, when there is one.
    pub employee: Option<Employee>,
}

#[utoipa::path(
    get,
    path = "/dashboard/profile",
    responses(
        (status = 200, description = "The signed-in user and their employee record", body = ProfileView)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let user = state.store.user(auth.user_id)?;
    let employee = user.employee_id.and_then(|id| state.store.employee(id).ok());

    Ok(HttpResponse::Ok().json(ProfileView {
        user: UserProfile::from(&user),
        employee,
    }))
}

#[utoipa::path(
    put,
    path = "/dashboard/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, body = UserProfile),
        (status = 400, description = "Blank name")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdateProfile>,
) -> actix_web::Result<impl Responder> {
    let user = state
        .store
        .update_profile(auth.user_id, payload.into_inner())?;

    info!(user_id = user.id, "Profile updated");
    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}

/// Pay history of the signed-in employee, latest first.
#[utoipa::path(
    get,
    path = "/dashboard/profile/payroll",
    params(PageQuery),
    responses(
        (status = 200, body = PayrollEntryPage),
        (status = 403, description = "No employee record is linked to this account")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn my_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;

    let mut entries = state.store.entries_by_employee(employee_id);
    entries.sort_by(|a, b| b.period_id.cmp(&a.period_id));

    Ok(HttpResponse::Ok().json(Page::paginate(entries, page.page, page.per_page)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn profile_includes_the_employee_record() {
        let state = state();
        let app = test_app!(state);

        let req = get("/dashboard/profile", &token(&state, JOHN)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["email"], "john.smith@company.com");
        assert_eq!(body["employee"]["id"], 1);
        assert!(body["user"].get("password_hash").is_none());

        let req = get("/dashboard/profile", &token(&state, OWNER)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["employee"].is_null());
    }

    #[actix_web::test]
    async fn names_cannot_be_blanked() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = put("/dashboard/profile", &john)
            .set_json(json!({"position": "Staff Engineer"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["position"], "Staff Engineer");

        let req = put("/dashboard/profile", &john)
            .set_json(json!({"first_name": "  "}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn own_pay_history() {
        let state = state();
        let app = test_app!(state);

        let req = get("/dashboard/profile/payroll", &token(&state, JOHN)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["employee_id"], 1);

        let req = get("/dashboard/profile/payroll", &token(&state, OWNER)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
