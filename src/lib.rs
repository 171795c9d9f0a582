use std::sync::Arc;

// --- Module Structure ---

// Session and transport: persisted token, claims, reactive auth state and the HTTP client.
pub mod api;
pub mod auth;
pub mod auth_context;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

// Wire types and the typed calls built on them.
pub mod endpoints;
pub mod models;
pub mod notifications;

// Page plumbing: routes and guard, the shell, the list/detail controller and its resources.
pub mod controller;
pub mod notice;
pub mod resources;
pub mod routes;
pub mod shell;

// --- Public Re-exports ---

pub use api::ApiClient;
pub use auth::{CurrentUser, Role};
pub use auth_context::AuthContext;
pub use config::{ClientConfig, Env};
pub use controller::{ListDetailController, ListQuery, MutationOutcome};
pub use error::ApiError;
pub use notice::{Notice, Notifier};
pub use session::SessionStore;
pub use shell::{Navigation, Shell};
pub use storage::{ClientStorageState, FileClientStorage, MemoryClientStorage};

use endpoints::Endpoints;
use notifications::{NotificationPoller, NotificationsApi};
use resources::{GatewayState, HttpGateway, Resource};
use routes::{History, RouteTable};

/// ClientState
///
/// The composition root. Builds every long-lived service once, from the configuration and a
/// storage backend, and wires them so that:
///
/// * the API client reads the token from the same storage the session store writes,
/// * a 401 anywhere clears that storage, notifies the auth context and moves `History` to
///   `/login`,
/// * pages get their controllers from here rather than from globals.
#[derive(Clone)]
pub struct ClientState {
    pub config: ClientConfig,
    pub storage: ClientStorageState,
    pub history: Arc<History>,
    pub api: Arc<ApiClient>,
    pub session: SessionStore,
    pub auth: Arc<AuthContext>,
    pub shell: Arc<Shell>,
    pub endpoints: Endpoints,
    pub notifications: NotificationsApi,
    pub notifier: Arc<dyn Notifier>,
}

impl ClientState {
    /// build
    ///
    /// Assembles the services. Spawns nothing; call `spawn_background` from within the
    /// runtime to start the revocation follower.
    pub fn build(
        config: ClientConfig,
        storage: ClientStorageState,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let history = Arc::new(History::default());
        let api = Arc::new(ApiClient::new(
            &config,
            storage.clone(),
            history.clone() as Arc<dyn routes::Navigator>,
        )?);

        let session = SessionStore::new(api.clone());
        let auth = Arc::new(AuthContext::new(session.clone(), api.revocations()));
        let shell = Arc::new(Shell::new(
            auth.clone(),
            RouteTable::standard(),
            history.clone(),
            storage.clone(),
        ));

        Ok(Self {
            endpoints: Endpoints::new(api.clone()),
            notifications: NotificationsApi::new(api.clone()),
            config,
            storage,
            history,
            api,
            session,
            auth,
            shell,
            notifier,
        })
    }

    /// Starts pushing server-side session invalidations to auth subscribers.
    pub fn spawn_background(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.auth.clone().follow_revocations())
    }

    /// Starts the unread-notification refresh at the configured interval.
    pub fn spawn_notification_poller(&self) -> NotificationPoller {
        NotificationPoller::spawn(self.notifications.clone(), self.config.notification_poll)
    }

    pub fn gateway<R: Resource>(&self) -> GatewayState<R> {
        Arc::new(HttpGateway::new(self.api.clone()))
    }

    /// A fresh controller for one mounted page.
    pub fn controller<R: Resource>(&self) -> ListDetailController<R> {
        ListDetailController::new(
            self.gateway::<R>(),
            self.notifier.clone(),
            self.config.search_debounce,
        )
    }
}
