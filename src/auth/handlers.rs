use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_cookies::{Cookie, Cookies};

use super::error::AuthError;
use super::service::AuthService;
use super::types::{AuthenticatedUser, LoginRequest, RegisterRequest, SessionUser, SESSION_COOKIE};
use crate::shared::state::AppState;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionUser>), AuthError> {
    let service = AuthService::new(Arc::new(state.conn.clone()));
    let user = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionUser>, AuthError> {
    let service = AuthService::new(Arc::new(state.conn.clone()));
    let (token, user) = service.login(request, &state.auth).await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    Ok(Json(user))
}

pub async fn logout_handler(cookies: Cookies) -> StatusCode {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
    StatusCode::NO_CONTENT
}

pub async fn me_handler(user: AuthenticatedUser) -> Json<SessionUser> {
    Json(user.session_user())
}
