use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use jsonwebtoken::{decode, Validation};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use super::error::AuthError;
use crate::shared::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// JWT claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Authenticated identity for a request, decoded from the bearer header
/// or the session cookie. Handlers that take this extractor refuse to
/// run without a valid session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl AuthenticatedUser {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth| {
            if auth.to_lowercase().starts_with("bearer ") {
                Some(auth[7..].to_string())
            } else {
                None
            }
        })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookie_token = Cookies::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|cookies| cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()));

        let token = bearer_token(&parts.headers)
            .or(cookie_token)
            .ok_or(AuthError::Unauthorized)?;

        let claims = decode::<Claims>(
            &token,
            &state.auth.decoding_key(),
            &Validation::default(),
        )
        .map_err(|_| AuthError::Unauthorized)?
        .claims;

        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;

        Ok(Self {
            id,
            email: claims.email,
            name: claims.name,
        })
    }
}
