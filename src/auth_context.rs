use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{auth::CurrentUser, error::ApiError, session::SessionStore};

/// AuthContext
///
/// Makes the session store's state observable. It is an ordinary value built once at the
/// composition root and handed to whoever needs it; there is no global instance.
///
/// The current user lives in a `watch` channel: `subscribe()` gives a receiver that sees every
/// change, and each change is visible to all receivers as soon as it is sent.
pub struct AuthContext {
    session: SessionStore,
    state: watch::Sender<Option<CurrentUser>>,
    // Revocation signal from the API client's 401 interceptor.
    revocations: Mutex<watch::Receiver<u64>>,
}

impl AuthContext {
    /// Initialises the reactive state once, from whatever token is already persisted.
    pub fn new(session: SessionStore, revocations: watch::Receiver<u64>) -> Self {
        let initial = session.current_user();
        let (state, _) = watch::channel(initial);
        Self {
            session,
            state,
            revocations: Mutex::new(revocations),
        }
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.sync_revocations();
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.sync_revocations();
        self.state.subscribe()
    }

    /// login
    ///
    /// On success the new user becomes the reactive state and is returned. On failure the
    /// state is reset to `None` and the error is handed back unchanged.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<CurrentUser, ApiError> {
        match self.session.login(identifier, secret).await {
            Ok(user) => {
                // Revocations that arrived before this login belong to the old token.
                self.revocations.lock().borrow_and_update();
                self.state.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.state.send_replace(None);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.session.logout();
        self.state.send_replace(None);
    }

    fn sync_revocations(&self) {
        let mut revocations = self.revocations.lock();
        if revocations.has_changed().unwrap_or(false) {
            revocations.borrow_and_update();
            drop(revocations);
            self.state.send_replace(None);
        }
    }

    /// follow_revocations
    ///
    /// Pushes server-side invalidations to subscribers as they happen instead of on the next
    /// read. Spawn it once next to the context; it ends when the API client is dropped.
    pub async fn follow_revocations(self: Arc<Self>) {
        let mut signal = self.revocations.lock().clone();
        while signal.changed().await.is_ok() {
            self.sync_revocations();
        }
    }
}
