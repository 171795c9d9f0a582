use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role
///
/// The four roles the backend issues in the `role` claim. The wire strings are the exact
/// values the server writes into the token and accepts in role-filter queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "HR Manager")]
    HrManager,
    #[serde(rename = "Payroll Manager")]
    PayrollManager,
    #[serde(rename = "Employee")]
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::HrManager,
        Role::PayrollManager,
        Role::Employee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::HrManager => "HR Manager",
            Role::PayrollManager => "Payroll Manager",
            Role::Employee => "Employee",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == raw)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims
///
/// The payload the backend signs into every access token at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the account email.
    pub sub: String,
    pub role: Role,
    /// Linked employee record, present for accounts attached to an employee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emp_id: Option<i64>,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: i64,
}

/// CurrentUser
///
/// The part of a session the rest of the console is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub email: String,
    pub role: Role,
    pub employee_id: Option<i64>,
}

impl CurrentUser {
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

impl From<&Claims> for CurrentUser {
    fn from(claims: &Claims) -> Self {
        CurrentUser {
            email: claims.sub.clone(),
            role: claims.role,
            employee_id: claims.emp_id,
        }
    }
}

/// Session
///
/// A decoded token together with the identity it carries.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed: {0}")]
    Invalid(String),
}

/// decode_token
///
/// Reads the claims of a server-issued token without verifying its signature. The console
/// has no key to verify with and does not need one: the decoded role only decides what
/// to *show*. Every request is re-authorised by the server, so a forged token buys nothing
/// but a menu the API will refuse to serve.
///
/// Expiry is checked with zero leeway; the server is the one that enforces it for real.
pub fn decode_token(token: &str) -> Result<Session, TokenError> {
    let data =
        insecure_decode::<Claims>(token).map_err(|e| TokenError::Invalid(e.to_string()))?;

    let claims = data.claims;
    if claims.exp < Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| TokenError::Invalid(format!("exp {} is out of range", claims.exp)))?;

    Ok(Session {
        token: token.to_string(),
        user: CurrentUser::from(&claims),
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn mint(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_claims_without_the_signing_key() {
        let exp = Utc::now().timestamp() + 3600;
        let token = mint(&Claims {
            sub: "payroll@corp.vn".into(),
            role: Role::PayrollManager,
            emp_id: Some(7),
            exp,
        });

        let session = decode_token(&token).unwrap();
        assert_eq!(session.user.email, "payroll@corp.vn");
        assert_eq!(session.user.role, Role::PayrollManager);
        assert_eq!(session.user.employee_id, Some(7));
        assert_eq!(session.expires_at.timestamp(), exp);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = mint(&Claims {
            sub: "old@corp.vn".into(),
            role: Role::Employee,
            emp_id: None,
            exp: Utc::now().timestamp() - 5,
        });
        assert_eq!(decode_token(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn token_with_seconds_left_is_valid() {
        let token = mint(&Claims {
            sub: "now@corp.vn".into(),
            role: Role::HrManager,
            emp_id: None,
            exp: Utc::now().timestamp() + 2,
        });
        assert!(decode_token(&token).is_ok());
    }

    #[test]
    fn missing_expiry_is_invalid() {
        let payload = serde_json::json!({"sub": "x@corp.vn", "role": "Admin"});
        let token = encode(&Header::default(), &payload, &EncodingKey::from_secret(b"k")).unwrap();
        assert!(matches!(decode_token(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn unknown_role_is_invalid() {
        let payload = serde_json::json!({
            "sub": "x@corp.vn",
            "role": "Superuser",
            "exp": Utc::now().timestamp() + 60,
        });
        let token = encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        assert!(matches!(decode_token(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            decode_token("not-a-jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn role_wire_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        assert_eq!(Role::parse("hr manager"), None);
    }
}
