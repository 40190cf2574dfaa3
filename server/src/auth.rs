use axum::http::{HeaderMap, header};

use crate::config;

/// Caller role for the refresh surface. Derived per-request from the
/// `Authorization` header; everything that cannot prove the admin token is a
/// viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn can_bypass_cooldown(self) -> bool {
        matches!(self, Role::Admin)
    }
}

pub fn role_from_headers(headers: &HeaderMap) -> Role {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match (presented, config::admin_token()) {
        (Some(token), Some(expected)) if token_matches(token.as_bytes(), expected.as_bytes()) => {
            Role::Admin
        }
        _ => Role::Viewer,
    }
}

/// Constant-time equality: folds over the whole slice, no early exit.
fn token_matches(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
