//! Session introspection
//!
//! A single bearer token from configuration identifies the configured user.
//! Nothing here gates access to other endpoints.

use axum::http::{header, HeaderMap};
use serde::Serialize;

use crate::config::AuthConfig;

/// Current authentication state of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AuthStatus {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            username: None,
        }
    }
}

/// Inspect the `Authorization` header of a request
pub fn authenticate(headers: &HeaderMap, config: &AuthConfig) -> AuthStatus {
    let Some(expected) = config.token.as_deref() else {
        return AuthStatus::anonymous();
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => AuthStatus {
            authenticated: true,
            username: Some(config.username.clone()),
        },
        Some(_) => {
            tracing::debug!("Rejected bearer token");
            AuthStatus::anonymous()
        }
        None => AuthStatus::anonymous(),
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
