use crate::{
    api::{MANAGE_TIME, PageQuery, RejectBody, VIEW_ALL},
    auth::auth::AuthUser,
    error::AppError,
    model::timesheet::{NewTimesheet, Timesheet, TimesheetStatus, TimesheetView},
    state::AppState,
    utils::pagination::{Page, TimesheetPage},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimesheetQuery {
    /// Ignored for employees, who only see their own weeks
    pub employee_id: Option<u64>,
    pub status: Option<TimesheetStatus>,
}

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/timesheets",
    params(TimesheetQuery, PageQuery),
    responses(
        (status = 200, description = "Timesheets, latest week first", body = TimesheetPage),
        (status = 403, description = "Employee asked for someone else's timesheets")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn list_timesheets(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<TimesheetQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let scope = auth.employee_scope(query.employee_id, &VIEW_ALL)?;

    let mut sheets = state.store.timesheets.filter(|t| {
        scope.is_none_or(|id| t.employee_id == id) && query.status.is_none_or(|s| t.status == s)
    });
    sheets.sort_by(|a, b| b.week_start.cmp(&a.week_start).then(a.id.cmp(&b.id)));

    Ok(HttpResponse::Ok().json(Page::paginate(sheets, page.page, page.per_page)))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/timesheets",
    request_body = NewTimesheet,
    responses(
        (status = 201, description = "Draft with totals from the week's entries", body = Timesheet),
        (status = 403, description = "Employee creating someone else's timesheet"),
        (status = 409, description = "A timesheet for that week already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn create_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewTimesheet>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = auth
        .employee_scope(payload.employee_id, &MANAGE_TIME)?
        .ok_or_else(|| AppError::BadRequest("employee_id is required".into()))?;

    let sheet = state.store.add_timesheet(employee_id, payload.week_start)?;
    Ok(HttpResponse::Created().json(sheet))
}

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/timesheets/{timesheet_id}",
    params(
        ("timesheet_id", description = "Timesheet ID")
    ),
    responses(
        (status = 200, description = "Timesheet with the week's time entries", body = TimesheetView),
        (status = 403, description = "Someone else's timesheet"),
        (status = 404, description = "Timesheet not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn get_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let view = state.store.timesheet_view(path.into_inner())?;
    auth.employee_scope(Some(view.timesheet.employee_id), &VIEW_ALL)?;

    debug!(timesheet_id = view.timesheet.id, entries = view.entries.len(), "Timesheet opened");
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/timesheets/{timesheet_id}",
    params(
        ("timesheet_id", description = "Timesheet ID")
    ),
    request_body(content = Object, description = "Move the week of a draft", example = json!({
        "week_start": "2024-01-22"
    })),
    responses(
        (status = 200, description = "Back to draft with fresh totals", body = Timesheet),
        (status = 400, description = "Not a draft, or immutable field"),
        (status = 409, description = "Another timesheet covers that week")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn update_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let sheet = state.store.timesheet(id)?;
    auth.employee_scope(Some(sheet.employee_id), &MANAGE_TIME)?;

    Ok(HttpResponse::Ok().json(state.store.update_timesheet(id, &body)?))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/timesheets/{timesheet_id}/submit",
    params(
        ("timesheet_id", description = "Timesheet ID")
    ),
    responses(
        (status = 200, body = Timesheet),
        (status = 400, description = "Already submitted or decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn submit_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let sheet = state.store.timesheet(id)?;
    auth.employee_scope(Some(sheet.employee_id), &MANAGE_TIME)?;

    Ok(HttpResponse::Ok().json(state.store.submit_timesheet(id)?))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/timesheets/{timesheet_id}/approve",
    params(
        ("timesheet_id", description = "Timesheet ID")
    ),
    responses(
        (status = 200, body = Timesheet),
        (status = 400, description = "Timesheet not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn approve_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&MANAGE_TIME)?;

    let sheet = state
        .store
        .approve_timesheet(path.into_inner(), auth.user_id)?;
    Ok(HttpResponse::Ok().json(sheet))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/timesheets/{timesheet_id}/reject",
    params(
        ("timesheet_id", description = "Timesheet ID")
    ),
    request_body(content = RejectBody, description = "Optional reason"),
    responses(
        (status = 200, body = Timesheet),
        (status = 400, description = "Timesheet not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Time Tracking"
)]
pub async fn reject_timesheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<RejectBody>>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&MANAGE_TIME)?;

    let reason = body.and_then(|b| b.into_inner().reason);
    let sheet = state
        .store
        .reject_timesheet(path.into_inner(), auth.user_id, reason)?;
    Ok(HttpResponse::Ok().json(sheet))
}
