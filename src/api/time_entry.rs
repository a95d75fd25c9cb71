use crate::{
    api::{MANAGE_TIME, PageQuery, RejectBody, VIEW_ALL},
    auth::auth::AuthUser,
    error::AppError,
    model::time_entry::{NewTimeEntry, TimeEntry, TimeEntryStatus},
    state::AppState,
    utils::pagination::{Page, TimeEntryPage},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeEntryQuery {
    /// Ignored for employees, who only see their own entries
    pub employee_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub status: Option<TimeEntryStatus>,
}

/// Whose clock to punch. Managers may name an employee; everyone else
/// punches their own.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClockBody {
    pub employee_id: Option<u64>,
}

fn clock_target(auth: &AuthUser, body: Option<web::Json<ClockBody>>) -> Result<u64, AppError> {
    let requested = body.and_then(|b| b.employee_id);
    match auth.employee_scope(requested, &MANAGE_TIME)? {
        Some(id) => Ok(id),
        None => auth.own_employee_id(),
    }
}

/* =========================
Entries
========================= */

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/entries",
    params(TimeEntryQuery, PageQuery),
    responses(
        (status = 200, description = "Time entries, latest day first", body = TimeEntryPage),
        (status = 403, description = "Employee asked for someone else's entries")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn list_time_entries(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<TimeEntryQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let scope = auth.employee_scope(query.employee_id, &VIEW_ALL)?;

    let mut entries = state.store.time_entries.filter(|e| {
        scope.is_none_or(|id| e.employee_id == id)
            && query.date.is_none_or(|d| e.date == d)
            && query.status.is_none_or(|s| e.status == s)
    });
    entries.sort_by(|a, b| (b.date, b.clock_in).cmp(&(a.date, a.clock_in)));

    Ok(HttpResponse::Ok().json(Page::paginate(entries, page.page, page.per_page)))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/entries",
    request_body = NewTimeEntry,
    responses(
        (status = 201, description = "Entry recorded as pending", body = TimeEntry),
        (status = 400, description = "Inactive employee, open entry or bad times"),
        (status = 403, description = "Employee recording time for someone else")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn create_time_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewTimeEntry>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = auth
        .employee_scope(payload.employee_id, &MANAGE_TIME)?
        .ok_or_else(|| AppError::BadRequest("employee_id is required".into()))?;

    let entry = state.store.add_time_entry(employee_id, payload)?;
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/entries/{entry_id}",
    params(
        ("entry_id", description = "Time entry ID")
    ),
    responses(
        (status = 200, body = TimeEntry),
        (status = 403, description = "Someone else's entry"),
        (status = 404, description = "Time entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn get_time_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let entry = state.store.time_entry(path.into_inner())?;
    auth.employee_scope(Some(entry.employee_id), &VIEW_ALL)?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/entries/{entry_id}",
    params(
        ("entry_id", description = "Time entry ID")
    ),
    request_body(content = Object, description = "Times, break or notes", example = json!({
        "clock_out": "17:15:00",
        "notes": "Left after standup"
    })),
    responses(
        (status = 200, description = "Entry updated and hours recomputed", body = TimeEntry),
        (status = 400, description = "Entry already decided or bad times"),
        (status = 404, description = "Time entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn update_time_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let entry = state.store.time_entry(id)?;
    auth.employee_scope(Some(entry.employee_id), &MANAGE_TIME)?;

    Ok(HttpResponse::Ok().json(state.store.update_time_entry(id, &body)?))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/entries/{entry_id}/approve",
    params(
        ("entry_id", description = "Time entry ID")
    ),
    responses(
        (status = 200, body = TimeEntry),
        (status = 400, description = "Time entry not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn approve_time_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&MANAGE_TIME)?;

    let entry = state
        .store
        .approve_time_entry(path.into_inner(), auth.user_id)?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/entries/{entry_id}/reject",
    params(
        ("entry_id", description = "Time entry ID")
    ),
    request_body(content = RejectBody, description = "Optional reason"),
    responses(
        (status = 200, body = TimeEntry),
        (status = 400, description = "Time entry not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn reject_time_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<RejectBody>>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&MANAGE_TIME)?;

    let reason = body.and_then(|b| b.into_inner().reason);
    let entry = state
        .store
        .reject_time_entry(path.into_inner(), auth.user_id, reason)?;
    Ok(HttpResponse::Ok().json(entry))
}

/* =========================
Clock
========================= */

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/clock-in",
    request_body(content = ClockBody, description = "Defaults to the caller's own record"),
    responses(
        (status = 201, description = "Today's entry opened", body = TimeEntry),
        (status = 400, description = "Already clocked in, or inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn clock_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: Option<web::Json<ClockBody>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = clock_target(&auth, body)?;

    let entry = state
        .store
        .clock_in(employee_id, Local::now().naive_local())?;
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/clock-out",
    request_body(content = ClockBody, description = "Defaults to the caller's own record"),
    responses(
        (status = 200, description = "Open entry closed", body = TimeEntry),
        (status = 400, description = "Not clocked in")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn clock_out(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: Option<web::Json<ClockBody>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = clock_target(&auth, body)?;

    let entry = state.store.clock_out(employee_id, Local::now().naive_local())?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/break-start",
    request_body(content = ClockBody, description = "Defaults to the caller's own record"),
    responses(
        (status = 200, body = TimeEntry),
        (status = 400, description = "Not clocked in or break already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn break_start(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: Option<web::Json<ClockBody>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = clock_target(&auth, body)?;
    Ok(HttpResponse::Ok().json(state.store.start_break(employee_id, Local::now().naive_local())?))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/break-end",
    request_body(content = ClockBody, description = "Defaults to the caller's own record"),
    responses(
        (status = 200, body = TimeEntry),
        (status = 400, description = "No break in progress")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn break_end(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: Option<web::Json<ClockBody>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = clock_target(&auth, body)?;
    Ok(HttpResponse::Ok().json(state.store.end_break(employee_id, Local::now().naive_local())?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn employees_see_only_their_own_entries() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = get("/dashboard/time-tracking/entries", &john).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["date"], "2024-01-16");

        let req = get("/dashboard/time-tracking/entries?employee_id=2", &john).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = get("/dashboard/time-tracking/entries/2", &john).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn managers_filter_across_employees() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = get("/dashboard/time-tracking/entries?date=2024-01-15&status=approved", &hr)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
    }

    #[actix_web::test]
    async fn approve_once_then_already_processed() {
        let state = state();
        let app = test_app!(state);
        let payroll = token(&state, PAYROLL);

        let req = put("/dashboard/time-tracking/entries/2/approve", &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "approved");
        assert_eq!(body["approved_by"], 10);

        let req = put("/dashboard/time-tracking/entries/2/approve", &payroll).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Time entry not found or already processed");

        let req = put("/dashboard/time-tracking/entries/6/reject", &payroll)
            .set_json(json!({"reason": "Missing lunch break"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["rejected_reason"], "Missing lunch break");
    }

    #[actix_web::test]
    async fn employees_cannot_approve() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = put("/dashboard/time-tracking/entries/2/approve", &john).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn manual_entry_computes_hours() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = post("/dashboard/time-tracking/entries", &john)
            .set_json(json!({"date": "2024-03-04", "clock_in": "08:00:00", "clock_out": "18:00:00"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["employee_id"], 1);
        assert_eq!(body["total_hours"], 10.0);
        assert_eq!(body["overtime_hours"], 2.0);

        let req = put(&format!("/dashboard/time-tracking/entries/{}", body["id"]), &john)
            .set_json(json!({"clock_out": "16:00:00"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_hours"], 8.0);
        assert_eq!(body["overtime_hours"], 0.0);
    }

    #[actix_web::test]
    async fn clock_cycle_for_the_caller() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let resp = test::call_service(&app, post("/dashboard/time-tracking/clock-in", &john).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = test::call_service(&app, post("/dashboard/time-tracking/clock-in", &john).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Already clocked in");

        let resp = test::call_service(&app, post("/dashboard/time-tracking/break-end", &john).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(&app, post("/dashboard/time-tracking/break-start", &john).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = post("/dashboard/time-tracking/clock-out", &john).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["clock_out"].is_string());
        assert!(body["break_end"].is_string());

        let resp = test::call_service(&app, post("/dashboard/time-tracking/clock-out", &john).to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Not clocked in");
    }

    #[actix_web::test]
    async fn inactive_employee_cannot_clock_in() {
        let state = state();
        let app = test_app!(state);
        let me = token(&state, EMPLOYEE);

        let resp = test::call_service(&app, post("/dashboard/time-tracking/clock-in", &me).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Inactive employees cannot record time");
    }

    #[actix_web::test]
    async fn managers_clock_someone_in() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = post("/dashboard/time-tracking/clock-in", &hr)
            .set_json(json!({"employee_id": 8}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["employee_id"], 8);
        assert_eq!(body["status"], "pending");
    }
}
