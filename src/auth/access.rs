//! Which dashboard paths a session may open.
//!
//! A path is either skipped by the gate (static assets, the JSON auth API),
//! public, or guarded by the rule with the longest matching prefix. A rule
//! lets a session through when it holds any listed permission or any listed
//! role.

use url::form_urlencoded;

use crate::model::role::{Permission, Role};
use crate::models::Claims;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const PUBLIC_PATHS: [&str; 6] = ["/", "/about", "/contact", "/pricing", "/login", "/api/auth"];

/// Raw prefixes the gate never sees, like a frontend route matcher.
const EXCLUDED_PREFIXES: [&str; 6] = [
    "/api",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
    "/public",
    "/swagger-ui",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRule {
    pub prefix: String,
    pub permissions: Vec<Permission>,
    pub roles: Vec<Role>,
}

impl RouteRule {
    fn new(prefix: &str, permissions: &[Permission], roles: &[Role]) -> Self {
        Self {
            prefix: prefix.to_string(),
            permissions: permissions.to_vec(),
            roles: roles.to_vec(),
        }
    }

    /// `admin:all` stands in for any permission.
    pub fn allows(&self, claims: &Claims) -> bool {
        claims.permissions.contains(&Permission::AdminAll)
            || claims
                .permissions
                .iter()
                .any(|p| self.permissions.contains(p))
            || self.roles.contains(&claims.role)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    /// Not guarded, or guarded and allowed.
    Pass,
    /// No usable session; carries the redirect target.
    Login(String),
    /// Signed in but not allowed; carries the redirect target.
    Denied(String),
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public: Vec<String>,
    rules: Vec<RouteRule>,
    fallback: RouteRule,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AccessPolicy {
    /// The dashboard rule table; `public` replaces the default public paths.
    pub fn new(public: Option<Vec<String>>) -> Self {
        use Permission::*;
        use Role::*;

        let dashboard = RouteRule::new(
            DASHBOARD_PATH,
            &[ReadAll, ReadOwn],
            &[HrManager, PayrollAdmin, BusinessOwner, Employee],
        );

        let rules = vec![
            dashboard.clone(),
            RouteRule::new(
                "/dashboard/employees",
                &[ReadAll, ReadEmployees],
                &[HrManager, PayrollAdmin],
            ),
            RouteRule::new(
                "/dashboard/payroll",
                &[ReadPayroll, WritePayroll],
                &[HrManager, PayrollAdmin],
            ),
            RouteRule::new(
                "/dashboard/time-tracking",
                &[ReadAll, ReadOwn, WriteOwnTimesheet],
                &[HrManager, PayrollAdmin, Employee],
            ),
            RouteRule::new(
                "/dashboard/reports",
                &[ReadReports, ReadAnalytics],
                &[HrManager, PayrollAdmin, BusinessOwner],
            ),
            RouteRule::new(
                "/dashboard/settings",
                &[AdminAll, AdminSettings],
                &[HrManager, BusinessOwner],
            ),
        ];

        Self {
            public: public
                .unwrap_or_else(|| PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()),
            rules,
            fallback: dashboard,
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p))
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| is_under(path, p))
    }

    /// Exact match, then the longest prefix, then the dashboard fallback.
    /// A nested path is held to its own section's rule, never the broad
    /// `/dashboard` one.
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        if let Some(rule) = self.rules.iter().find(|r| r.prefix == path) {
            return Some(rule);
        }

        let longest = self
            .rules
            .iter()
            .filter(|r| path.starts_with(&format!("{}/", r.prefix)))
            .max_by_key(|r| r.prefix.len());

        longest.or_else(|| is_under(path, DASHBOARD_PATH).then_some(&self.fallback))
    }

    pub fn requires_session(&self, path: &str) -> bool {
        !self.is_excluded(path) && !self.is_public(path)
    }

    /// Decides a guarded path given the outcome of reading the session.
    ///
    /// `session` is `None` when no token was sent and `Some(None)` when one
    /// was sent but is unusable (bad, expired or revoked).
    pub fn decide(&self, path: &str, session: Option<Option<&Claims>>) -> Decision {
        if !self.requires_session(path) {
            return Decision::Pass;
        }

        let claims = match session {
            None => return Decision::Login(login_redirect(path, false)),
            Some(None) => return Decision::Login(login_redirect(path, true)),
            Some(Some(claims)) => claims,
        };

        match self.rule_for(path) {
            Some(rule) if !rule.allows(claims) => {
                Decision::Denied(format!("{DASHBOARD_PATH}?error=unauthorized"))
            }
            _ => Decision::Pass,
        }
    }
}

/// `path` equals `base` or sits below it.
fn is_under(path: &str, base: &str) -> bool {
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/') && !base.ends_with('/'))
}

pub fn login_redirect(path: &str, expired: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("redirect", path);
    if expired {
        query.append_pair("error", "session_expired");
    }
    format!("{LOGIN_PATH}?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenType;

    fn claims(role: Role) -> Claims {
        Claims {
            user_id: 1,
            sub: "someone@accupay.com".into(),
            role,
            permissions: role.permissions().to_vec(),
            employee_id: None,
            iat: 0,
            exp: usize::MAX,
            jti: "jti".into(),
            token_type: TokenType::Access,
        }
    }

    #[test]
    fn public_and_excluded_paths_pass() {
        let policy = AccessPolicy::default();

        for path in ["/", "/about", "/pricing/team", "/login", "/api/auth/login", "/_next/static/x.js", "/swagger-ui/"] {
            assert_eq!(policy.decide(path, None), Decision::Pass, "{path}");
        }
        // "/" only covers itself, and the dashboard always needs a session
        assert!(!policy.is_public("/dashboard"));
        assert_eq!(
            policy.decide("/dashboard", None),
            Decision::Login("/login?redirect=%2Fdashboard".into())
        );
        assert!(!policy.is_public("/aboutus"));
    }

    #[test]
    fn nested_paths_use_their_section_rule() {
        let policy = AccessPolicy::default();

        assert_eq!(policy.rule_for("/dashboard").unwrap().prefix, "/dashboard");
        assert_eq!(
            policy.rule_for("/dashboard/payroll/periods/3").unwrap().prefix,
            "/dashboard/payroll"
        );
        assert_eq!(
            policy.rule_for("/dashboard/payrollx").unwrap().prefix,
            "/dashboard"
        );
        assert_eq!(policy.rule_for("/dashboard/profile").unwrap().prefix, "/dashboard");
        assert!(policy.rule_for("/elsewhere").is_none());

        // the employee role passes `/dashboard` but not the payroll section below it
        let employee = claims(Role::Employee);
        assert_eq!(policy.decide("/dashboard", Some(Some(&employee))), Decision::Pass);
        assert_eq!(
            policy.decide("/dashboard/payroll/periods/3", Some(Some(&employee))),
            Decision::Denied("/dashboard?error=unauthorized".into())
        );
    }

    #[test]
    fn missing_and_expired_sessions_go_to_login() {
        let policy = AccessPolicy::default();

        assert_eq!(
            policy.decide("/dashboard/payroll", None),
            Decision::Login("/login?redirect=%2Fdashboard%2Fpayroll".into())
        );
        assert_eq!(
            policy.decide("/dashboard", Some(None)),
            Decision::Login("/login?redirect=%2Fdashboard&error=session_expired".into())
        );
    }

    #[test]
    fn permission_or_role_grants_access() {
        let policy = AccessPolicy::default();
        let employee = claims(Role::Employee);
        let payroll = claims(Role::PayrollAdmin);
        let owner = claims(Role::BusinessOwner);

        assert_eq!(policy.decide("/dashboard/time-tracking", Some(Some(&employee))), Decision::Pass);
        assert_eq!(
            policy.decide("/dashboard/payroll", Some(Some(&employee))),
            Decision::Denied("/dashboard?error=unauthorized".into())
        );

        assert_eq!(policy.decide("/dashboard/payroll/entries", Some(Some(&payroll))), Decision::Pass);
        assert!(matches!(
            policy.decide("/dashboard/settings", Some(Some(&payroll))),
            Decision::Denied(_)
        ));

        // read:all on the owner opens the employee directory
        assert_eq!(policy.decide("/dashboard/employees", Some(Some(&owner))), Decision::Pass);
        assert!(matches!(
            policy.decide("/dashboard/payroll", Some(Some(&owner))),
            Decision::Denied(_)
        ));
    }

    #[test]
    fn admin_passes_every_rule() {
        let policy = AccessPolicy::default();
        let admin = claims(Role::Admin);
        for path in ["/dashboard", "/dashboard/payroll", "/dashboard/settings/company"] {
            assert_eq!(policy.decide(path, Some(Some(&admin))), Decision::Pass);
        }
    }

    #[test]
    fn public_paths_can_be_overridden() {
        let policy = AccessPolicy::new(Some(vec!["/status".into()]));
        assert!(policy.is_public("/status"));
        assert!(!policy.is_public("/about"));
    }
}
