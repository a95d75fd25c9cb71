pub mod dashboard;
pub mod employee;
pub mod home;
pub mod leave_request;
pub mod payroll;
pub mod profile;
pub mod reports;
pub mod settings;
pub mod time_entry;
pub mod timesheet;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::model::role::Permission;

/// May see every employee's time, leave and pay records.
pub const VIEW_ALL: [Permission; 3] = [
    Permission::ReadAll,
    Permission::ReadPayroll,
    Permission::ReadEmployees,
];

/// May record or decide time on behalf of others.
pub const MANAGE_TIME: [Permission; 2] = [Permission::WriteAll, Permission::WritePayroll];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page (1-100, default 20)
    pub per_page: Option<u32>,
}

/// Optional note when turning something down.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectBody {
    #[schema(example = "Hours do not match the schedule")]
    pub reason: Option<String>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::test::TestRequest;
    use actix_web::web::Data;

    use crate::auth::jwt::generate_access_token;
    use crate::state::AppState;

    /// Builds the full application (gate, limiters, routes) around `$state`.
    macro_rules! test_app {
        ($state:expr) => {{
            let config = $state.config.clone();
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data($state.clone())
                    .wrap(actix_web::middleware::from_fn(
                        $crate::auth::middleware::access_gate,
                    ))
                    .configure(|cfg| $crate::routes::configure(cfg, &config)),
            )
            .await
        }};
    }
    pub(crate) use test_app;

    /// A fresh access token for the seeded user with `email`.
    pub fn token(state: &Data<AppState>, email: &str) -> String {
        let user = state.store.user_by_email(email).unwrap();
        generate_access_token(&user, &state.config.jwt_secret, 600)
            .unwrap()
            .0
    }

    fn with_auth(req: TestRequest, token: &str) -> TestRequest {
        req.peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header(("Authorization", format!("Bearer {token}")))
    }

    pub fn get(uri: &str, token: &str) -> TestRequest {
        with_auth(TestRequest::get().uri(uri), token)
    }

    pub fn post(uri: &str, token: &str) -> TestRequest {
        with_auth(TestRequest::post().uri(uri), token)
    }

    pub fn put(uri: &str, token: &str) -> TestRequest {
        with_auth(TestRequest::put().uri(uri), token)
    }

    pub fn delete(uri: &str, token: &str) -> TestRequest {
        with_auth(TestRequest::delete().uri(uri), token)
    }

    pub const HR: &str = "hr@accupay.com";
    pub const PAYROLL: &str = "payroll@accupay.com";
    pub const OWNER: &str = "owner@accupay.com";
    pub const EMPLOYEE: &str = "employee@accupay.com";
    /// john.smith@company.com, linked to employee 1.
    pub const JOHN: &str = "john.smith@company.com";
}
