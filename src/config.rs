use std::{env, path::PathBuf, time::Duration};

/// ClientConfig
///
/// Holds the console's entire configuration state. It is loaded once at startup and then
/// shared (cloned) into the API client, the list controllers and the notification poller.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    // Base URL of the HR REST API, including the version prefix (e.g. `/api/v1`).
    pub api_base_url: String,
    // Location of the JSON document that persists the bearer token and theme.
    pub storage_path: PathBuf,
    // Quiet period applied to free-text search input before a list re-fetch fires.
    pub search_debounce: Duration,
    // Interval of the background unread-notification refresh.
    pub notification_poll: Duration,
    // Upper bound for a single HTTP exchange.
    pub request_timeout: Duration,
    // Runtime environment marker. Controls log format and the fail-fast checks.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context: local development against a backend on localhost,
/// or a deployed console pointed at an explicitly configured API.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_STORAGE_PATH: &str = ".hrm-console/storage.json";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_NOTIFICATION_POLL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl Default for ClientConfig {
    /// default
    ///
    /// Provides a non-panicking configuration for tests and embedding, with the same
    /// timings the dashboard uses in production.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            notification_poll: Duration::from_secs(DEFAULT_NOTIFICATION_POLL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            env: Env::Local,
        }
    }
}

impl ClientConfig {
    /// load
    ///
    /// Reads every parameter from environment variables (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in `Env::Production` when `API_BASE_URL` is missing, or in any environment when a
    /// numeric setting is present but not a number. A console silently talking to the wrong API
    /// is worse than one that refuses to start.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("API_BASE_URL")
                .expect("FATAL: API_BASE_URL must be set in production."),
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            }
        };

        let storage_path = env::var("HRM_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_path,
            search_debounce: Duration::from_millis(read_u64(
                "SEARCH_DEBOUNCE_MS",
                DEFAULT_SEARCH_DEBOUNCE_MS,
            )),
            notification_poll: Duration::from_secs(read_u64(
                "NOTIFICATION_POLL_SECS",
                DEFAULT_NOTIFICATION_POLL_SECS,
            )),
            request_timeout: Duration::from_secs(read_u64(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            env,
        }
    }
}

fn read_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {key} must be a whole number, got {raw:?}")),
        Err(_) => default,
    }
}
