use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    auth::{CurrentUser, Role},
    auth_context::AuthContext,
    error::ApiError,
    routes::{
        ADMIN_HR, ADMIN_HR_PAYROLL, ADMIN_ONLY, ADMIN_PAYROLL, GuardDecision, HOME_PATH, History,
        LOGIN_PATH, Page, RouteGuard, RouteParams, RouteTable,
    },
    storage::{ClientStorageState, Theme},
};

/// Navigation
///
/// What the front end should show after a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render { page: Page, params: RouteParams },
    /// The guard sent the user elsewhere. `from` is set when login should return there.
    Redirect { to: String, from: Option<String> },
    NotFound { path: String },
}

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: String,
}

impl MenuItem {
    fn new(label: &'static str, path: impl Into<String>) -> Self {
        Self {
            label,
            path: path.into(),
        }
    }
}

/// Shell
///
/// Ties the route table, the guard, the location history and the auth context together.
/// Everything the user can do between pages goes through here.
pub struct Shell {
    auth: Arc<AuthContext>,
    routes: RouteTable,
    history: Arc<History>,
    storage: ClientStorageState,
    // Path a guarded navigation was refused on, consumed by the next login.
    return_to: Mutex<Option<String>>,
}

impl Shell {
    pub fn new(
        auth: Arc<AuthContext>,
        routes: RouteTable,
        history: Arc<History>,
        storage: ClientStorageState,
    ) -> Self {
        Self {
            auth,
            routes,
            history,
            storage,
            return_to: Mutex::new(None),
        }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn current_path(&self) -> String {
        self.history.current()
    }

    /// navigate
    ///
    /// Matches `path`, runs the guard against the current user and records where the user
    /// ended up. A refused anonymous visit remembers `path` for the next login.
    pub fn navigate(&self, path: &str) -> Navigation {
        let Some((rule, params)) = self.routes.resolve(path) else {
            tracing::debug!(path, "no route matches");
            return Navigation::NotFound {
                path: path.to_string(),
            };
        };

        let user = self.auth.current_user();
        match RouteGuard::evaluate(user.as_ref(), rule, path) {
            GuardDecision::Render => {
                self.visit(path);
                Navigation::Render {
                    page: rule.page,
                    params,
                }
            }
            GuardDecision::RedirectToLogin { from } => {
                *self.return_to.lock() = Some(from.clone());
                self.visit(LOGIN_PATH);
                Navigation::Redirect {
                    to: LOGIN_PATH.to_string(),
                    from: Some(from),
                }
            }
            GuardDecision::RedirectHome => {
                self.visit(HOME_PATH);
                Navigation::Redirect {
                    to: HOME_PATH.to_string(),
                    from: None,
                }
            }
        }
    }

    fn visit(&self, path: &str) {
        if self.history.current() != path {
            self.history.push(path);
        }
    }

    /// login
    ///
    /// Signs in, then continues to the page that sent the user to the login screen, or to the
    /// dashboard. A failed login leaves the remembered page in place for the next attempt.
    pub async fn login(&self, email: &str, password: &str) -> Result<Navigation, ApiError> {
        self.auth.login(email, password).await?;

        let target = self
            .return_to
            .lock()
            .take()
            .filter(|path| path != LOGIN_PATH)
            .unwrap_or_else(|| HOME_PATH.to_string());

        Ok(self.navigate(&target))
    }

    pub fn logout(&self) -> Navigation {
        self.auth.logout();
        self.return_to.lock().take();
        self.history.replace(LOGIN_PATH);
        Navigation::Redirect {
            to: LOGIN_PATH.to_string(),
            from: None,
        }
    }

    /// Menu entries for whoever is signed in. Empty when nobody is.
    pub fn menu(&self) -> Vec<MenuItem> {
        self.auth
            .current_user()
            .map(|user| menu_for(&user))
            .unwrap_or_default()
    }

    // --- Theme ---

    pub fn theme(&self) -> Theme {
        self.storage.theme().unwrap_or(Theme::Light)
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.theme().toggled();
        self.storage.set_theme(theme);
        theme
    }
}

/// menu_for
///
/// The sidebar for one user, in display order. Every entry is a route the guard lets that
/// user render.
pub fn menu_for(user: &CurrentUser) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::new("Dashboard", HOME_PATH)];

    if user.has_role(ADMIN_ONLY) {
        items.push(MenuItem::new("Account management", "/user-management"));
        items.push(MenuItem::new("System administration", "/system-admin"));
    }

    if user.role == Role::Employee {
        if let Some(employee_id) = user.employee_id {
            items.push(MenuItem::new("My profile", format!("/employees/{employee_id}")));
        }
        items.push(MenuItem::new("My payslips", "/my-payslips"));
        items.push(MenuItem::new("My attendance", "/my-attendance"));
    }

    if user.has_role(ADMIN_HR) {
        items.push(MenuItem::new("Employees", "/employees"));
        items.push(MenuItem::new("Organisation", "/management"));
        items.push(MenuItem::new("Leave approval", "/leave-approval"));
    }

    if user.has_role(ADMIN_PAYROLL) {
        items.push(MenuItem::new("Payroll", "/payroll"));
        items.push(MenuItem::new("Shareholders", "/shareholders"));
    }

    if user.has_role(ADMIN_HR_PAYROLL) {
        items.push(MenuItem::new("Reports", "/reports"));
    }

    items
}
