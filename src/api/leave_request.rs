use crate::{
    api::{MANAGE_TIME, PageQuery, RejectBody, VIEW_ALL},
    auth::auth::AuthUser,
    error::AppError,
    model::{
        leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest},
        role::Permission,
    },
    state::AppState,
    utils::pagination::{LeaveRequestPage, Page},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

/// Leave decisions belong to people who can write any record.
const DECIDE_LEAVE: [Permission; 1] = [Permission::WriteAll];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// Ignored for employees, who only see their own requests
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

// -------------------- Requests --------------------

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/leave",
    params(LeaveQuery, PageQuery),
    responses(
        (status = 200, description = "Leave requests, latest start first", body = LeaveRequestPage),
        (status = 403, description = "Employee asked for someone else's leave")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<LeaveQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let scope = auth.employee_scope(query.employee_id, &VIEW_ALL)?;

    let mut requests = state.store.leave_requests.filter(|l| {
        scope.is_none_or(|id| l.employee_id == id)
            && query.status.is_none_or(|s| l.status == s)
            && query.leave_type.is_none_or(|t| l.leave_type == t)
    });
    requests.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    Ok(HttpResponse::Ok().json(Page::paginate(requests, page.page, page.per_page)))
}

#[utoipa::path(
    post,
    path = "/dashboard/time-tracking/leave",
    request_body = NewLeaveRequest,
    responses(
        (status = 201, description = "Request filed as pending", body = LeaveRequest),
        (status = 400, description = "Dates out of order or missing reason"),
        (status = 409, description = "Overlaps a pending or approved request")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewLeaveRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = auth
        .employee_scope(payload.employee_id, &MANAGE_TIME)?
        .ok_or_else(|| AppError::BadRequest("employee_id is required".into()))?;

    let request = state.store.add_leave(employee_id, payload)?;
    Ok(HttpResponse::Created().json(request))
}

#[utoipa::path(
    get,
    path = "/dashboard/time-tracking/leave/{leave_id}",
    params(
        ("leave_id", description = "Leave request ID")
    ),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 403, description = "Someone else's request"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let request = state.store.leave_request(path.into_inner())?;
    auth.employee_scope(Some(request.employee_id), &VIEW_ALL)?;

    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/leave/{leave_id}",
    params(
        ("leave_id", description = "Leave request ID")
    ),
    request_body(content = Object, description = "Dates, type or reason", example = json!({
        "end_date": "2024-03-06"
    })),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let request = state.store.leave_request(id)?;
    auth.employee_scope(Some(request.employee_id), &MANAGE_TIME)?;

    Ok(HttpResponse::Ok().json(state.store.update_leave(id, &body)?))
}

// -------------------- Decisions --------------------

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/leave/{leave_id}/approve",
    params(
        ("leave_id", description = "Leave request ID")
    ),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&DECIDE_LEAVE)?;

    let request = state.store.approve_leave(path.into_inner(), auth.user_id)?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/leave/{leave_id}/reject",
    params(
        ("leave_id", description = "Leave request ID")
    ),
    request_body(content = RejectBody, description = "Optional reason"),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 403, description = "Missing approval permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<RejectBody>>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&DECIDE_LEAVE)?;

    let reason = body.and_then(|b| b.into_inner().reason);
    let request = state
        .store
        .reject_leave(path.into_inner(), auth.user_id, reason)?;
    Ok(HttpResponse::Ok().json(request))
}

/// Withdraw a pending request; open to its owner and to approvers.
#[utoipa::path(
    put,
    path = "/dashboard/time-tracking/leave/{leave_id}/cancel",
    params(
        ("leave_id", description = "Leave request ID")
    ),
    responses(
        (status = 200, body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 403, description = "Someone else's request")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let request = state.store.leave_request(id)?;
    auth.employee_scope(Some(request.employee_id), &DECIDE_LEAVE)?;

    Ok(HttpResponse::Ok().json(state.store.cancel_leave(id)?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn vacation(start: &str, end: &str) -> Value {
        json!({
            "leave_type": "vacation",
            "start_date": start,
            "end_date": end,
            "reason": "Spring break"
        })
    }

    #[actix_web::test]
    async fn employees_file_and_cancel_their_own() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = get("/dashboard/time-tracking/leave", &john).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);

        let req = post("/dashboard/time-tracking/leave", &john)
            .set_json(vacation("2024-02-16", "2024-02-20"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = post("/dashboard/time-tracking/leave", &john)
            .set_json(vacation("2024-03-04", "2024-03-08"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_days"], 5);
        assert_eq!(body["status"], "pending");
        let id = body["id"].as_u64().unwrap();

        let req = put(&format!("/dashboard/time-tracking/leave/{id}/cancel"), &john).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "cancelled");

        let req = put(&format!("/dashboard/time-tracking/leave/{id}/cancel"), &john).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Leave request not found or already processed");
    }

    #[actix_web::test]
    async fn inverted_dates_are_rejected() {
        let state = state();
        let app = test_app!(state);
        let john = token(&state, JOHN);

        let req = post("/dashboard/time-tracking/leave", &john)
            .set_json(vacation("2024-03-08", "2024-03-04"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "start_date cannot be after end_date");
    }

    #[actix_web::test]
    async fn only_approvers_decide() {
        let state = state();
        let app = test_app!(state);

        let req = put("/dashboard/time-tracking/leave/3/approve", &token(&state, PAYROLL)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = put("/dashboard/time-tracking/leave/3/cancel", &token(&state, JOHN)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = put("/dashboard/time-tracking/leave/3/approve", &token(&state, HR)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "approved");
        assert_eq!(body["approved_by"], 9);
    }

    #[actix_web::test]
    async fn filter_by_status_and_type() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = get("/dashboard/time-tracking/leave?status=approved&leave_type=sick", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["id"], 2);
    }
}
