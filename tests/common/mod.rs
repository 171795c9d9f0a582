#![allow(dead_code)]

use axum::{
    Router,
    extract::Request,
    http::header,
    middleware::{self, Next},
};
use chrono::Utc;
use hrm_console::{
    ClientConfig, ClientState,
    auth::{Claims, Role},
    notice::NoticeLog,
    storage::{ClientStorageState, MemoryClientStorage},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/api/v1";

// --- Tokens ---

/// Signs a token the way the backend does. The console never sees this secret.
pub fn mint_token(email: &str, role: Role, emp_id: Option<i64>, ttl_secs: i64) -> String {
    let claims = Claims {
        sub: email.to_string(),
        role,
        emp_id,
        exp: Utc::now().timestamp() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-only-secret"),
    )
    .expect("token encoding")
}

pub fn valid_token(role: Role, emp_id: Option<i64>) -> String {
    mint_token("someone@corp.vn", role, emp_id, 3600)
}

// --- Fake Backend ---

/// One request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

pub type Recorder = Arc<Mutex<Vec<Recorded>>>;

/// Wraps `router` so every request it receives is appended to the returned recorder.
pub fn recording(router: Router) -> (Router, Recorder) {
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let log = recorder.clone();
    let router = router.layer(middleware::from_fn(move |request: Request, next: Next| {
        let log = log.clone();
        async move {
            log.lock().push(Recorded {
                method: request.method().to_string(),
                path: request.uri().path().to_string(),
                query: request.uri().query().map(str::to_string),
                authorization: request
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            });
            next.run(request).await
        }
    }));
    (router, recorder)
}

/// Serves `router` on an ephemeral port and returns the API base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{port}{API_PREFIX}")
}

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

// --- Client Assembly ---

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    }
}

pub fn memory_storage(token: Option<&str>) -> ClientStorageState {
    match token {
        Some(token) => Arc::new(MemoryClientStorage::with_token(token)),
        None => Arc::new(MemoryClientStorage::new()),
    }
}

/// A fully wired client against `base_url`, with notices captured for assertions.
pub fn client_state(base_url: &str, storage: ClientStorageState) -> (ClientState, Arc<NoticeLog>) {
    let notices = NoticeLog::new();
    let state = ClientState::build(config_for(base_url), storage, notices.clone())
        .expect("client state");
    (state, notices)
}
