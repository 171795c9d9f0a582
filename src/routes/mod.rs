use std::collections::BTreeMap;

use crate::auth::Role;

/// Route Module Index
///
/// The console's route table, split by access level the same way the menu is: pages anyone
/// may open, pages any signed-in user may open, and pages gated by a role allow-list.
///
/// Role gating here is a UX convenience. It keeps people out of screens whose API calls would
/// be refused anyway; it is never what protects the data. The server re-checks every request.

/// Routes that render without a session.
pub mod public;

/// Routes open to any authenticated user (no allow-list).
pub mod authenticated;

/// Routes restricted to an explicit role allow-list.
pub mod restricted;

pub mod guard;
pub mod history;

pub use guard::{GuardDecision, RouteGuard};
pub use history::{History, Navigator};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Page
///
/// Every screen a route can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Dashboard,
    MyPayslips,
    MyAttendance,
    UserManagement,
    SystemAdmin,
    Employees,
    EmployeeDetail,
    Organization,
    Departments,
    Positions,
    LeaveApproval,
    Payroll,
    Shareholders,
    Reports,
}

/// RouteAccessRule
///
/// Static, defined at registration time. `allowed_roles: None` means "any authenticated user";
/// `requires_auth: false` is reserved for the login screen.
#[derive(Debug, Clone, Copy)]
pub struct RouteAccessRule {
    pub pattern: &'static str,
    pub page: Page,
    pub requires_auth: bool,
    pub allowed_roles: Option<&'static [Role]>,
}

impl RouteAccessRule {
    pub const fn public(pattern: &'static str, page: Page) -> Self {
        Self {
            pattern,
            page,
            requires_auth: false,
            allowed_roles: None,
        }
    }

    pub const fn authenticated(pattern: &'static str, page: Page) -> Self {
        Self {
            pattern,
            page,
            requires_auth: true,
            allowed_roles: None,
        }
    }

    pub const fn restricted(pattern: &'static str, page: Page, roles: &'static [Role]) -> Self {
        Self {
            pattern,
            page,
            requires_auth: true,
            allowed_roles: Some(roles),
        }
    }

    /// Matches a concrete path against the pattern, returning the `:name` captures.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = BTreeMap::new();
        let mut pattern_segments = segments(self.pattern);
        let mut path_segments = segments(path);
        loop {
            match (pattern_segments.next(), path_segments.next()) {
                (None, None) => return Some(RouteParams(params)),
                (Some(expected), Some(actual)) => {
                    if let Some(name) = expected.strip_prefix(':') {
                        params.insert(name.to_string(), actual.to_string());
                    } else if expected != actual {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('?')
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
}

/// Captured `:name` segments of a matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(|raw| raw.parse().ok())
    }
}

// --- Role Sets ---

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ADMIN_HR: &[Role] = &[Role::Admin, Role::HrManager];
pub const ADMIN_PAYROLL: &[Role] = &[Role::Admin, Role::PayrollManager];
pub const ADMIN_HR_PAYROLL: &[Role] = &[Role::Admin, Role::HrManager, Role::PayrollManager];
pub const PROFILE_VIEWERS: &[Role] = &[Role::Admin, Role::HrManager, Role::Employee];

/// RouteTable
///
/// The merged registry of all three groups. Lookup is first-match in registration order,
/// so literal paths are registered before parameterised ones that could shadow them.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteAccessRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteAccessRule>) -> Self {
        Self { rules }
    }

    /// The dashboard's routes.
    pub fn standard() -> Self {
        let mut rules = public::public_routes();
        rules.extend(authenticated::authenticated_routes());
        rules.extend(restricted::restricted_routes());
        Self { rules }
    }

    pub fn resolve(&self, path: &str) -> Option<(&RouteAccessRule, RouteParams)> {
        self.rules
            .iter()
            .find_map(|rule| rule.matches(path).map(|params| (rule, params)))
    }

    pub fn rules(&self) -> &[RouteAccessRule] {
        &self.rules
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameterised_segment_is_captured() {
        let rule = RouteAccessRule::restricted("/employees/:id", Page::EmployeeDetail, PROFILE_VIEWERS);
        let params = rule.matches("/employees/42").unwrap();
        assert_eq!(params.id(), Some(42));
        assert!(rule.matches("/employees").is_none());
        assert!(rule.matches("/employees/42/salaries").is_none());
    }

    #[test]
    fn trailing_slash_and_query_are_ignored() {
        let rule = RouteAccessRule::restricted("/payroll", Page::Payroll, ADMIN_PAYROLL);
        assert!(rule.matches("/payroll/").is_some());
        assert!(rule.matches("/payroll?department_id=3").is_some());
    }

    #[test]
    fn root_matches_only_root() {
        let rule = RouteAccessRule::authenticated("/", Page::Dashboard);
        assert!(rule.matches("/").is_some());
        assert!(rule.matches("").is_some());
        assert!(rule.matches("/reports").is_none());
    }

    #[test]
    fn standard_table_resolves_list_before_detail() {
        let table = RouteTable::standard();
        let (rule, _) = table.resolve("/employees").unwrap();
        assert_eq!(rule.page, Page::Employees);
        let (rule, params) = table.resolve("/employees/7").unwrap();
        assert_eq!(rule.page, Page::EmployeeDetail);
        assert_eq!(params.id(), Some(7));
        assert!(table.resolve("/nowhere").is_none());
    }
}
