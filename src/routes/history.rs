use parking_lot::Mutex;

use super::{HOME_PATH, LOGIN_PATH};

/// Navigator
///
/// The one navigation capability the API client needs: a forced, full jump to the login
/// screen after the server has invalidated the session.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// History
///
/// The console's location stack. The shell pushes and replaces entries as navigations
/// resolve; the 401 interceptor replaces the whole stack with the login screen, which is what
/// a hard reload to `/login` amounts to.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    pub fn current(&self) -> String {
        self.entries
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| HOME_PATH.to_string())
    }

    pub fn push(&self, path: &str) {
        self.entries.lock().push(path.to_string());
    }

    pub fn replace(&self, path: &str) {
        let mut entries = self.entries.lock();
        entries.pop();
        entries.push(path.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl Navigator for History {
    fn redirect_to_login(&self) {
        tracing::info!("session invalidated by server, redirecting to {}", LOGIN_PATH);
        let mut entries = self.entries.lock();
        entries.clear();
        entries.push(LOGIN_PATH.to_string());
    }
}
