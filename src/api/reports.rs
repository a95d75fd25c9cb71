use crate::{
    state::AppState,
    store::reports::{HeadcountReport, PayrollReport, ReportRange, TimeReport},
};
use actix_web::{HttpResponse, Responder, web};
use tracing::debug;

#[utoipa::path(
    get,
    path = "/dashboard/reports/headcount",
    responses(
        (status = 200, description = "Employees by department, status and employment type", body = HeadcountReport)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn headcount(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.headcount_report()))
}

#[utoipa::path(
    get,
    path = "/dashboard/reports/payroll",
    params(ReportRange),
    responses(
        (status = 200, description = "Pay totals for periods starting in the range", body = PayrollReport)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn payroll(
    state: web::Data<AppState>,
    range: web::Query<ReportRange>,
) -> actix_web::Result<impl Responder> {
    debug!(from = ?range.from, to = ?range.to, "Payroll report");
    Ok(HttpResponse::Ok().json(state.store.payroll_report(range.into_inner())))
}

#[utoipa::path(
    get,
    path = "/dashboard/reports/time",
    params(ReportRange),
    responses(
        (status = 200, description = "Hours and overtime for entries dated in the range", body = TimeReport)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn time(
    state: web::Data<AppState>,
    range: web::Query<ReportRange>,
) -> actix_web::Result<impl Responder> {
    debug!(from = ?range.from, to = ?range.to, "Time report");
    Ok(HttpResponse::Ok().json(state.store.time_report(range.into_inner())))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use crate::state::test_support::state;
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn owner_reads_reports() {
        let state = state();
        let app = test_app!(state);
        let owner = token(&state, OWNER);

        let req = get("/dashboard/reports/headcount", &owner).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 10);

        let req = get("/dashboard/reports/payroll?from=2024-01-16", &owner).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["periods"].as_array().unwrap().len(), 2);

        let req = get("/dashboard/reports/time?from=2024-01-16&to=2024-01-16", &owner).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entries"], 1);
    }

    #[actix_web::test]
    async fn employees_are_turned_away() {
        let state = state();
        let app = test_app!(state);

        let req = get("/dashboard/reports/headcount", &token(&state, JOHN)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/dashboard?error=unauthorized"
        );
    }
}
