use crate::{
    api::PageQuery,
    auth::auth::AuthUser,
    model::{
        payroll::{
            NewPayrollEntry, NewPayrollPeriod, PayrollEntry, PayrollPeriod, PayrollSummary,
            PeriodStatus, ProcessPeriod,
        },
        role::Permission,
    },
    state::AppState,
    utils::pagination::{Page, PayrollEntryPage, PayrollPeriodPage},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

const WRITE_PAYROLL: [Permission; 2] = [Permission::WritePayroll, Permission::WriteAll];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// pending, processing, completed or cancelled
    pub status: Option<PeriodStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryQuery {
    pub employee_id: Option<u64>,
    pub period_id: Option<u64>,
}

/* =========================
Periods
========================= */

#[utoipa::path(
    get,
    path = "/dashboard/payroll/periods",
    params(PeriodQuery, PageQuery),
    responses(
        (status = 200, description = "Payroll periods, newest first", body = PayrollPeriodPage)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_periods(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let mut periods = match query.status {
        Some(status) => state.store.periods_by_status(status),
        None => state.store.payroll_periods.all(),
    };
    periods.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    Ok(HttpResponse::Ok().json(Page::paginate(periods, page.page, page.per_page)))
}

#[utoipa::path(
    post,
    path = "/dashboard/payroll/periods",
    request_body = NewPayrollPeriod,
    responses(
        (status = 201, description = "Period created as pending", body = PayrollPeriod),
        (status = 400, description = "Dates out of order"),
        (status = 403, description = "Missing write permission"),
        (status = 409, description = "Overlaps an existing period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewPayrollPeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;

    let period = state.store.add_period(payload.into_inner())?;
    Ok(HttpResponse::Created().json(period))
}

#[utoipa::path(
    get,
    path = "/dashboard/payroll/periods/{period_id}",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    responses(
        (status = 200, body = PayrollPeriod),
        (status = 404, description = "Payroll period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_period(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.period(path.into_inner())?))
}

#[utoipa::path(
    put,
    path = "/dashboard/payroll/periods/{period_id}",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    request_body(content = Object, description = "New dates for a pending period", example = json!({
        "pay_date": "2024-02-20"
    })),
    responses(
        (status = 200, description = "Payroll period updated", body = PayrollPeriod),
        (status = 400, description = "Not pending, immutable field or bad dates"),
        (status = 404, description = "Payroll period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;

    let period = state.store.update_period(path.into_inner(), &body)?;
    Ok(HttpResponse::Ok().json(period))
}

#[utoipa::path(
    get,
    path = "/dashboard/payroll/periods/{period_id}/entries",
    params(
        ("period_id", description = "Payroll period ID"),
        PageQuery
    ),
    responses(
        (status = 200, body = PayrollEntryPage),
        (status = 404, description = "Payroll period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn period_entries(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let period = state.store.period(path.into_inner())?;
    let entries = state.store.entries_by_period(period.id);

    Ok(HttpResponse::Ok().json(Page::paginate(entries, page.page, page.per_page)))
}

#[utoipa::path(
    get,
    path = "/dashboard/payroll/periods/{period_id}/summary",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Stored summary, or one computed from the entries", body = PayrollSummary),
        (status = 404, description = "Payroll period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn period_summary(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.summary_for_period(path.into_inner())?))
}

#[utoipa::path(
    post,
    path = "/dashboard/payroll/periods/{period_id}/process",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    request_body(content = ProcessPeriod, description = "Optional hours per employee"),
    responses(
        (status = 200, description = "Entries computed; period is processing", body = PayrollPeriod),
        (status = 400, description = "Payroll period cannot be processed from its status")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn process_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<ProcessPeriod>>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;

    let options = body.map(|b| b.into_inner()).unwrap_or_default();
    let period = state.store.process_period(path.into_inner(), &options)?;
    Ok(HttpResponse::Ok().json(period))
}

#[utoipa::path(
    post,
    path = "/dashboard/payroll/periods/{period_id}/complete",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Entries paid; summary stored", body = PayrollPeriod),
        (status = 400, description = "Payroll period cannot be completed from its status")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn complete_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;
    Ok(HttpResponse::Ok().json(state.store.complete_period(path.into_inner())?))
}

#[utoipa::path(
    post,
    path = "/dashboard/payroll/periods/{period_id}/cancel",
    params(
        ("period_id", description = "Payroll period ID")
    ),
    responses(
        (status = 200, description = "Period and its entries cancelled", body = PayrollPeriod),
        (status = 400, description = "Payroll period cannot be cancelled from its status")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn cancel_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;
    Ok(HttpResponse::Ok().json(state.store.cancel_period(path.into_inner())?))
}

/* =========================
Entries
========================= */

#[utoipa::path(
    get,
    path = "/dashboard/payroll/entries",
    params(EntryQuery, PageQuery),
    responses(
        (status = 200, body = PayrollEntryPage)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_entries(
    state: web::Data<AppState>,
    query: web::Query<EntryQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let entries = state.store.payroll_entries.filter(|e| {
        query.employee_id.is_none_or(|id| e.employee_id == id)
            && query.period_id.is_none_or(|id| e.period_id == id)
    });

    Ok(HttpResponse::Ok().json(Page::paginate(entries, page.page, page.per_page)))
}

#[utoipa::path(
    post,
    path = "/dashboard/payroll/entries",
    request_body = NewPayrollEntry,
    responses(
        (status = 201, description = "Entry computed from the employee's rate", body = PayrollEntry),
        (status = 400, description = "Period closed or negative amounts"),
        (status = 404, description = "Employee or period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewPayrollEntry>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;

    let entry = state.store.add_entry(payload.into_inner())?;
    Ok(HttpResponse::Created().json(entry))
}

#[utoipa::path(
    put,
    path = "/dashboard/payroll/entries/{entry_id}",
    params(
        ("entry_id", description = "Payroll entry ID")
    ),
    request_body(content = Object, description = "Hours, rates, deductions or benefits", example = json!({
        "overtime_hours": 4
    })),
    responses(
        (status = 200, description = "Entry recomputed", body = PayrollEntry),
        (status = 400, description = "Payroll entry not found or already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_entry(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&WRITE_PAYROLL)?;

    let entry = state.store.update_entry(path.into_inner(), &body)?;
    Ok(HttpResponse::Ok().json(entry))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn periods_list_newest_first_and_filter() {
        let state = state();
        let app = test_app!(state);
        let payroll = token(&state, PAYROLL);

        let body: Value =
            test::call_and_read_body_json(&app, get("/dashboard/payroll/periods", &payroll).to_request()).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["data"][0]["id"], 3);

        let req = get("/dashboard/payroll/periods?status=completed", &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["status"], "completed");
    }

    #[actix_web::test]
    async fn run_a_period_end_to_end() {
        let state = state();
        let app = test_app!(state);
        let payroll = token(&state, PAYROLL);

        let req = post("/dashboard/payroll/periods", &payroll)
            .set_json(json!({"start_date": "2024-03-01", "end_date": "2024-03-15", "pay_date": "2024-03-19"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let period: Value = test::read_body_json(resp).await;
        let id = period["id"].as_u64().unwrap();

        let req = post(&format!("/dashboard/payroll/periods/{id}/complete"), &payroll).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Payroll period cannot be completed from status pending");

        let req = post(&format!("/dashboard/payroll/periods/{id}/process"), &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "processing");
        assert_eq!(body["employee_count"], 9);

        let req = get(&format!("/dashboard/payroll/periods/{id}/entries?per_page=5"), &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 9);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);

        let req = post(&format!("/dashboard/payroll/periods/{id}/complete"), &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "completed");

        let req = get(&format!("/dashboard/payroll/periods/{id}/summary"), &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_employees"], 9);
    }

    #[actix_web::test]
    async fn process_accepts_custom_hours() {
        let state = state();
        let app = test_app!(state);
        let payroll = token(&state, PAYROLL);

        let req = post("/dashboard/payroll/periods/3/process", &payroll)
            .set_json(json!({"custom_hours": {"3": {"regular_hours": 72.0, "overtime_hours": 6.0}}}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "processing");
        assert_eq!(body["regular_hours"], 712.0);
        assert_eq!(body["overtime_hours"], 6.0);

        let req = get("/dashboard/payroll/entries?employee_id=3&period_id=3", &payroll).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["regular_hours"], 72.0);
    }

    #[actix_web::test]
    async fn entries_filter_and_recompute() {
        let state = state();
        let app = test_app!(state);
        let hr = token(&state, HR);

        let req = get("/dashboard/payroll/entries?employee_id=8", &hr).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);

        let req = post("/dashboard/payroll/entries", &hr)
            .set_json(json!({"employee_id": 8, "period_id": 3, "regular_hours": 10}))
            .to_request();
        let entry: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entry["gross_pay"], 288.5);

        let req = put(&format!("/dashboard/payroll/entries/{}", entry["id"]), &hr)
            .set_json(json!({"regular_hours": 20}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["gross_pay"], 577.0);
    }

    #[actix_web::test]
    async fn owners_and_employees_stay_out() {
        let state = state();
        let app = test_app!(state);

        for who in [OWNER, EMPLOYEE] {
            let req = get("/dashboard/payroll/periods", &token(&state, who)).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FOUND, "{who}");
        }
    }
}
