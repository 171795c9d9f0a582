use super::{LOGIN_PATH, Page, RouteAccessRule};

/// Public Route Group
///
/// Screens that render without a session. Only the login form lives here; after a successful
/// login the console returns to whatever path the guard remembered.
pub fn public_routes() -> Vec<RouteAccessRule> {
    vec![
        // /login
        RouteAccessRule::public(LOGIN_PATH, Page::Login),
    ]
}
