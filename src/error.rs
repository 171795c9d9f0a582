use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::auth::TokenError;

/// ApiError
///
/// Every failure a caller of the API client can observe. Callers convert these into
/// user-facing notices; nothing in the client panics on a failed exchange.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401. By the time a caller sees this, the stored token has
    /// already been removed and the login redirect has fired. Wrong credentials at login
    /// arrive here too, with the server's reason in `detail`.
    #[error("unauthorized{}", format_detail(.detail))]
    Unauthorized { detail: Option<String> },

    /// Any other non-success status. `detail` is the server's human-readable reason.
    #[error("request failed with status {status}{}", format_detail(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// No response at all (connection refused, timeout, TLS failure).
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A response arrived but its body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The login exchange succeeded but the issued token could not be read.
    #[error("issued token is unusable: {0}")]
    Token(#[from] TokenError),

    /// Rejected locally, before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The server-provided explanation, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } | ApiError::Unauthorized { detail } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// user_message
    ///
    /// Text suitable for a transient notification: the server's `detail` verbatim when
    /// present, the local reason for input refused before sending, otherwise the caller's
    /// fallback sentence.
    pub fn user_message(&self, fallback: &str) -> String {
        if let ApiError::InvalidInput(reason) = self {
            return reason.clone();
        }
        match self.detail() {
            Some(detail) => detail.to_string(),
            None => fallback.to_string(),
        }
    }
}

fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// extract_detail
///
/// Pulls the `detail` field out of an error body. The backend sends either a plain string
/// or, for request validation failures, a list of `{ "msg": ... }` objects.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_returned_verbatim() {
        let body = r#"{"detail":"Cannot delete department: employees still assigned"}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("Cannot delete department: employees still assigned")
        );
    }

    #[test]
    fn validation_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","Email"],"msg":"value is not a valid email"},{"msg":"field required"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("value is not a valid email; field required")
        );
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(extract_detail("<html>502 Bad Gateway</html>"), None);
    }

    #[test]
    fn user_message_prefers_detail() {
        let err = ApiError::Status {
            status: StatusCode::CONFLICT,
            detail: Some("Email already registered".into()),
        };
        assert_eq!(err.user_message("Save failed."), "Email already registered");
        let expired = ApiError::Unauthorized { detail: None };
        assert_eq!(expired.user_message("Save failed."), "Save failed.");
    }
}
