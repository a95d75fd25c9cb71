use crate::{
    api::PageQuery,
    auth::auth::AuthUser,
    model::{
        employee::{Employee, EmployeeStatus, EmploymentType, NewEmployee},
        role::Permission,
    },
    state::AppState,
    store::employees::{EmployeeFilter, EmployeeSort, SortOrder},
    utils::pagination::{EmployeePage, Page},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Search by name, email or position
    pub search: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub manager_id: Option<u64>,
    /// Hired on or after (YYYY-MM-DD)
    pub hired_from: Option<NaiveDate>,
    /// Hired on or before (YYYY-MM-DD)
    pub hired_to: Option<NaiveDate>,
    pub sort_by: Option<EmployeeSort>,
    pub sort_order: Option<SortOrder>,
}

impl From<EmployeeQuery> for EmployeeFilter {
    fn from(q: EmployeeQuery) -> Self {
        Self {
            search: q.search,
            status: q.status,
            department: q.department,
            employment_type: q.employment_type,
            manager_id: q.manager_id,
            hired_from: q.hired_from,
            hired_to: q.hired_to,
            sort_by: q.sort_by.unwrap_or_default(),
            sort_order: q.sort_order.unwrap_or_default(),
        }
    }
}

// -------------------- Handlers --------------------

#[utoipa::path(
    get,
    path = "/dashboard/employees",
    params(EmployeeQuery, PageQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeePage),
        (status = 302, description = "No session, or no access to the directory")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    state: web::Data<AppState>,
    query: web::Query<EmployeeQuery>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = EmployeeFilter::from(query.into_inner());
    let found = state.store.search_employees(&filter);
    debug!(count = found.len(), ?filter, "Listing employees");

    Ok(HttpResponse::Ok().json(Page::paginate(found, page.page, page.per_page)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/dashboard/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "Validation failed",
            "errors": { "personal_info.ssn": "SSN must be in format XXX-XX-XXXX" }
        })),
        (status = 403, description = "Missing write permission"),
        (status = 409, description = "Email already used", body = Object, example = json!({
            "message": "An employee with this email already exists"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&[Permission::WriteAll])?;

    let employee = state.store.add_employee(payload.into_inner())?;
    Ok(HttpResponse::Created().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/dashboard/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee = state.store.employee(path.into_inner())?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
///
/// Any subset of employee fields; nested objects merge field by field.
#[utoipa::path(
    put,
    path = "/dashboard/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body(content = Object, description = "Partial employee", example = json!({
        "salary": 90000,
        "address": { "city": "Oakland" }
    })),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Unknown field, immutable field or invalid value"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&[Permission::WriteAll])?;

    let employee = state.store.update_employee(path.into_inner(), &body)?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/dashboard/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Missing delete permission"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_any(&[Permission::DeleteAll])?;

    state.store.delete_employee(path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

#[utoipa::path(
    get,
    path = "/dashboard/employees/{employee_id}/direct-reports",
    params(
        ("employee_id", Path, description = "Manager's employee ID")
    ),
    responses(
        (status = 200, description = "Employees reporting to this manager", body = [Employee]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn direct_reports(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let manager = state.store.employee(path.into_inner())?;
    Ok(HttpResponse::Ok().json(state.store.employees_by_manager(manager.id)))
}
