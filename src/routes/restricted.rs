use super::{
    ADMIN_HR, ADMIN_HR_PAYROLL, ADMIN_ONLY, ADMIN_PAYROLL, PROFILE_VIEWERS, Page, RouteAccessRule,
};

/// Restricted Route Group
///
/// Screens behind a role allow-list. A signed-in user whose role is not listed is sent back to
/// the dashboard without an error page; the matching API endpoints enforce the same roles
/// server-side.
pub fn restricted_routes() -> Vec<RouteAccessRule> {
    vec![
        // --- Administration ---
        RouteAccessRule::restricted("/user-management", Page::UserManagement, ADMIN_ONLY),
        RouteAccessRule::restricted("/system-admin", Page::SystemAdmin, ADMIN_ONLY),
        // --- HR ---
        RouteAccessRule::restricted("/employees", Page::Employees, ADMIN_HR),
        // Employees reach this one through "my profile" with their linked id.
        RouteAccessRule::restricted("/employees/:id", Page::EmployeeDetail, PROFILE_VIEWERS),
        RouteAccessRule::restricted("/management", Page::Organization, ADMIN_HR),
        RouteAccessRule::restricted("/departments", Page::Departments, ADMIN_HR),
        RouteAccessRule::restricted("/positions", Page::Positions, ADMIN_HR),
        RouteAccessRule::restricted("/leave-approval", Page::LeaveApproval, ADMIN_HR),
        // --- Payroll ---
        RouteAccessRule::restricted("/payroll", Page::Payroll, ADMIN_PAYROLL),
        RouteAccessRule::restricted("/shareholders", Page::Shareholders, ADMIN_PAYROLL),
        // --- Reporting ---
        RouteAccessRule::restricted("/reports", Page::Reports, ADMIN_HR_PAYROLL),
    ]
}
