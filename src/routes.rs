use crate::{
    api::{
        dashboard, employee, home, leave_request, payroll, profile, reports, settings,
        time_entry, timesheet,
    },
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Per-peer limiter allowing `requests_per_min` with an equal burst
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / u64::from(per_min)).max(1))
        .burst_size(per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public pages
    cfg.service(home::index).service(home::login_page);

    // Session API
    cfg.service(
        web::scope("/api/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Dashboard, behind the access gate
    cfg.service(
        web::scope("/dashboard")
            .wrap(protected_limiter)
            .route("", web::get().to(dashboard::dashboard_stats))
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/{id}/direct-reports")
                            .route(web::get().to(employee::direct_reports)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll/periods
                    .service(
                        web::resource("/periods")
                            .route(web::get().to(payroll::list_periods))
                            .route(web::post().to(payroll::create_period)),
                    )
                    .service(
                        web::resource("/periods/{id}")
                            .route(web::get().to(payroll::get_period))
                            .route(web::put().to(payroll::update_period)),
                    )
                    .service(
                        web::resource("/periods/{id}/entries")
                            .route(web::get().to(payroll::period_entries)),
                    )
                    .service(
                        web::resource("/periods/{id}/summary")
                            .route(web::get().to(payroll::period_summary)),
                    )
                    .service(
                        web::resource("/periods/{id}/process")
                            .route(web::post().to(payroll::process_period)),
                    )
                    .service(
                        web::resource("/periods/{id}/complete")
                            .route(web::post().to(payroll::complete_period)),
                    )
                    .service(
                        web::resource("/periods/{id}/cancel")
                            .route(web::post().to(payroll::cancel_period)),
                    )
                    // /payroll/entries
                    .service(
                        web::resource("/entries")
                            .route(web::get().to(payroll::list_entries))
                            .route(web::post().to(payroll::create_entry)),
                    )
                    .service(
                        web::resource("/entries/{id}").route(web::put().to(payroll::update_entry)),
                    ),
            )
            .service(
                web::scope("/time-tracking")
                    // /time-tracking/entries
                    .service(
                        web::resource("/entries")
                            .route(web::get().to(time_entry::list_time_entries))
                            .route(web::post().to(time_entry::create_time_entry)),
                    )
                    .service(
                        web::resource("/entries/{id}")
                            .route(web::get().to(time_entry::get_time_entry))
                            .route(web::put().to(time_entry::update_time_entry)),
                    )
                    .service(
                        web::resource("/entries/{id}/approve")
                            .route(web::put().to(time_entry::approve_time_entry)),
                    )
                    .service(
                        web::resource("/entries/{id}/reject")
                            .route(web::put().to(time_entry::reject_time_entry)),
                    )
                    // clock
                    .route("/clock-in", web::post().to(time_entry::clock_in))
                    .route("/clock-out", web::post().to(time_entry::clock_out))
                    .route("/break-start", web::post().to(time_entry::break_start))
                    .route("/break-end", web::post().to(time_entry::break_end))
                    // /time-tracking/timesheets
                    .service(
                        web::resource("/timesheets")
                            .route(web::get().to(timesheet::list_timesheets))
                            .route(web::post().to(timesheet::create_timesheet)),
                    )
                    .service(
                        web::resource("/timesheets/{id}")
                            .route(web::get().to(timesheet::get_timesheet))
                            .route(web::put().to(timesheet::update_timesheet)),
                    )
                    .service(
                        web::resource("/timesheets/{id}/submit")
                            .route(web::put().to(timesheet::submit_timesheet)),
                    )
                    .service(
                        web::resource("/timesheets/{id}/approve")
                            .route(web::put().to(timesheet::approve_timesheet)),
                    )
                    .service(
                        web::resource("/timesheets/{id}/reject")
                            .route(web::put().to(timesheet::reject_timesheet)),
                    )
                    // /time-tracking/leave
                    .service(
                        web::resource("/leave")
                            .route(web::get().to(leave_request::list_leave))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/leave/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave)),
                    )
                    .service(
                        web::resource("/leave/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/leave/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    .service(
                        web::resource("/leave/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .route("/headcount", web::get().to(reports::headcount))
                    .route("/payroll", web::get().to(reports::payroll))
                    .route("/time", web::get().to(reports::time)),
            )
            .service(
                web::scope("/settings")
                    .service(
                        web::resource("/company")
                            .route(web::get().to(settings::get_company))
                            .route(web::put().to(settings::update_company)),
                    )
                    .route("/departments", web::get().to(settings::list_departments))
                    .route("/positions", web::get().to(settings::list_positions))
                    .route("/users", web::get().to(settings::list_users))
                    .route("/capabilities", web::get().to(settings::list_capabilities))
                    .route("/reset", web::post().to(settings::reset_data)),
            )
            .service(
                web::scope("/profile")
                    .service(
                        web::resource("")
                            .route(web::get().to(profile::get_profile))
                            .route(web::put().to(profile::update_profile)),
                    )
                    .route("/payroll", web::get().to(profile::my_payroll)),
            ),
    );
}

// LOGIN
//  ├─ access_token (24 h)
//  └─ refresh_token (7 days)

// DASHBOARD REQUEST
//  └─ accupay_token cookie, or Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ 302 /login?redirect=...&error=session_expired
//       └─ POST /api/auth/refresh with refresh_token
