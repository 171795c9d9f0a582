use std::sync::Arc;

use crate::{
    api::ApiClient,
    auth::{CurrentUser, decode_token},
    error::ApiError,
    models::TokenResponse,
    storage::ClientStorageState,
};

pub const LOGIN_ENDPOINT: &str = "/login";

/// SessionStore
///
/// Single source of truth for "is anyone logged in, and as whom". The persisted token is the
/// only state; the current user is always re-derived from it.
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: ClientStorageState,
}

impl SessionStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let storage = api.storage().clone();
        Self { api, storage }
    }

    /// login
    ///
    /// Exchanges credentials for a token (`POST /login`, form-encoded `username`/`password`),
    /// decodes it locally and persists it. The token is stored only once it has been read
    /// successfully; any failure leaves storage as it was and propagates unchanged.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<CurrentUser, ApiError> {
        let response: TokenResponse = self
            .api
            .post_form(
                LOGIN_ENDPOINT,
                &[("username", identifier), ("password", secret)],
            )
            .await
            .inspect_err(|e| tracing::warn!(identifier, "login failed: {}", e))?;

        let session = decode_token(&response.access_token)?;
        self.storage.set_token(&session.token);

        tracing::info!(email = %session.user.email, role = %session.user.role, "logged in");
        Ok(session.user)
    }

    /// Removes the persisted token. Always succeeds; calling it twice is the same as once.
    pub fn logout(&self) {
        self.storage.remove_token();
    }

    /// current_user
    ///
    /// Reads the persisted token. A token that cannot be decoded, or whose expiry has passed,
    /// is cleared from storage and treated as "nobody logged in".
    pub fn current_user(&self) -> Option<CurrentUser> {
        let token = self.storage.token()?;
        match decode_token(&token) {
            Ok(session) => Some(session.user),
            Err(e) => {
                tracing::info!("discarding stored token: {}", e);
                self.storage.remove_token();
                None
            }
        }
    }
}
