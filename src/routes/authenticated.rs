use super::{HOME_PATH, Page, RouteAccessRule};

/// Authenticated Route Group
///
/// Screens any signed-in user may open, whatever their role. The dashboard is also the landing
/// page the guard falls back to when a role is refused elsewhere, so it must stay in this group.
pub fn authenticated_routes() -> Vec<RouteAccessRule> {
    vec![
        // / : role-aware dashboard (aggregates come from /reports/dashboard-summary)
        RouteAccessRule::authenticated(HOME_PATH, Page::Dashboard),
        // /my-payslips : the signed-in employee's salary history
        RouteAccessRule::authenticated("/my-payslips", Page::MyPayslips),
        // /my-attendance : attendance record plus leave request submission
        RouteAccessRule::authenticated("/my-attendance", Page::MyAttendance),
    ]
}
