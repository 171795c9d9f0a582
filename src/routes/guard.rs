use crate::auth::CurrentUser;

use super::RouteAccessRule;

/// GuardDecision
///
/// The outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the guarded page unchanged.
    Render,
    /// Nobody is signed in. `from` is the attempted path so login can return there.
    RedirectToLogin { from: String },
    /// Signed in, but the role is not on the allow-list. Silent fallback to the dashboard.
    RedirectHome,
}

/// RouteGuard
///
/// Decides whether the current user may render a route. Holds no state: every navigation is
/// judged fresh from the user and the rule alone.
///
/// This is UX, not access control. Hiding a screen from a role does not stop that role from
/// calling the API directly; the server authorises every request on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(
        user: Option<&CurrentUser>,
        rule: &RouteAccessRule,
        attempted_path: &str,
    ) -> GuardDecision {
        if !rule.requires_auth {
            return GuardDecision::Render;
        }

        let Some(user) = user else {
            return GuardDecision::RedirectToLogin {
                from: attempted_path.to_string(),
            };
        };

        match rule.allowed_roles {
            Some(roles) if !user.has_role(roles) => {
                tracing::warn!(
                    role = %user.role,
                    path = attempted_path,
                    allowed = ?roles,
                    "role not in allow-list, falling back to dashboard"
                );
                GuardDecision::RedirectHome
            }
            _ => GuardDecision::Render,
        }
    }
}
