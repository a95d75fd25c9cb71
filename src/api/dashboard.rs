use crate::{state::AppState, store::reports::DashboardStats};
use actix_web::{HttpResponse, Responder, web};

/// Dashboard home figures.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Headcount, payroll and approval queues", body = DashboardStats),
        (status = 302, description = "No session")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard_stats(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(state.store.dashboard_stats()))
}
