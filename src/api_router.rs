//! Comprehensive API Router
//!
//! Combines all API endpoints from all specialized modules into a unified router.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;

use crate::import_export::MAX_UPLOAD_BYTES;
use crate::shared::state::AppState;

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/auth", crate::auth::auth_routes())
        .nest(
            "/api/contacts",
            crate::contacts::contacts_routes()
                .merge(crate::import_export::import_export_routes()),
        )
        // The multipart body carries some framing overhead on top of
        // the 5 MB file ceiling enforced by the import handler.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
}
