use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    error::{ApiError, extract_detail},
    routes::Navigator,
    storage::ClientStorageState,
};

/// Query parameters as sent on the wire. Absent keys mean "no constraint".
pub type QueryParams = Vec<(String, String)>;

/// ApiClient
///
/// The single HTTP gateway to the HR API. Two behaviours apply to every exchange, with no way
/// for a caller to opt out:
///
/// 1. **Request interceptor**: if a token is stored, it is attached as
///    `Authorization: Bearer <token>`. Without one the request goes out unauthenticated and the
///    server decides. Each request also carries a fresh `x-request-id` for log correlation.
/// 2. **Response interceptor**: a 401 from *any* endpoint (including background polls) removes
///    the stored token, signals revocation to session observers and forces navigation to
///    `/login`, before the caller gets `ApiError::Unauthorized`. Every other status is handed
///    back to the caller untouched.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: ClientStorageState,
    navigator: Arc<dyn Navigator>,
    // Monotonic counter bumped on every 401. Observers clear their view of the session.
    revocations: watch::Sender<u64>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        storage: ClientStorageState,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let (revocations, _) = watch::channel(0);

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            storage,
            navigator,
            revocations,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &ClientStorageState {
        &self.storage
    }

    /// A receiver that changes every time the server invalidates the session.
    pub fn revocations(&self) -> watch::Receiver<u64> {
        self.revocations.subscribe()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// execute
    ///
    /// Builds, authorises, sends and intercepts one request. `customize` adds the body or
    /// query string.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        customize: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .http
            .request(method.clone(), self.url(path))
            .header("x-request-id", &request_id);

        if let Some(token) = self.storage.token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method = %method, path, req_id = %request_id, "api request");

        let response = customize(builder).send().await.map_err(|e| {
            tracing::warn!(method = %method, path, req_id = %request_id, "transport failure: {}", e);
            ApiError::Transport(e)
        })?;

        self.intercept(response).await
    }

    async fn intercept(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_session(response.url().path());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unauthorized {
                detail: extract_detail(&body),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            detail: extract_detail(&body),
        })
    }

    fn invalidate_session(&self, origin: &str) {
        tracing::warn!(origin, "401 received, clearing session");
        self.storage.remove_token();
        self.revocations.send_modify(|epoch| *epoch += 1);
        self.navigator.redirect_to_login();
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // --- Verb Helpers ---

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::GET, path, |builder| {
                if query.is_empty() {
                    builder
                } else {
                    builder.query(query)
                }
            })
            .await?;
        Self::decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::POST, path, |builder| builder.json(body))
            .await?;
        Self::decode(response).await
    }

    /// Form-encoded POST, as the credential exchange expects.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::POST, path, |builder| builder.form(form))
            .await?;
        Self::decode(response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::PUT, path, |builder| builder.json(body))
            .await?;
        Self::decode(response).await
    }

    /// PUT whose answer is `204 No Content` (password reset).
    pub async fn put_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.execute(Method::PUT, path, |builder| builder.json(body))
            .await?;
        Ok(())
    }

    /// POST carrying only query parameters (`/payroll/finalize?month=..&year=..`).
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::POST, path, |builder| builder.query(query))
            .await?;
        Self::decode(response).await
    }

    /// PUT without a body (state transitions such as "mark as read").
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::PUT, path, |builder| builder).await?;
        Self::decode(response).await
    }

    /// DELETE. The body, if any, is ignored (the API answers 204).
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, |builder| builder).await?;
        Ok(())
    }
}
