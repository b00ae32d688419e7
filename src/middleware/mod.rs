use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

/// Caller allowed to read the reservation list.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

// Сравниваем хеши, а не сами строки
fn same_secret(a: &str, b: &str) -> bool {
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

/// Parses `Authorization: Basic <base64(user:password)>`.
pub fn basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let encoded = auth_header.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Разделяем user:password
    let (user, password) = credentials.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

// Basic Auth extractor. Без ADMIN_PASSWORD список открыт.
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let admin = &state.config.admin;
        let Some(expected_password) = admin.password.as_deref() else {
            return Ok(AdminUser { username: "anonymous".to_string() });
        };

        let (user, password) = basic_credentials(parts).ok_or(AppError::Unauthorized)?;
        if user != admin.username || !same_secret(&password, expected_password) {
            tracing::warn!("Rejected admin credentials for user '{}'", user);
            return Err(AppError::Unauthorized);
        }

        Ok(AdminUser { username: user })
    }
}
