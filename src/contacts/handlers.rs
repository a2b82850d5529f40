use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::error::ContactsError;
use super::service::ContactsService;
use super::types::*;
use crate::auth::AuthenticatedUser;
use crate::import_export::{validate, ContactDraft};
use crate::shared::state::AppState;

pub fn contacts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_contacts_handler).post(create_contact_handler))
        .route("/stats", get(contact_stats_handler))
        .route(
            "/:id",
            get(get_contact_handler)
                .put(update_contact_handler)
                .delete(delete_contact_handler),
        )
}

/// Create and update share the importer's record validator, so a bad
/// request fails with the same message an import row would.
fn validated_draft(request: ContactRequest) -> Result<ContactDraft, ContactsError> {
    validate::validate(&request.into_candidate()).map_err(ContactsError::InvalidInput)
}

pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactListResponse>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let response = service.list_contacts(user.id, query).await?;
    Ok(Json(response))
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ContactsError> {
    let draft = validated_draft(request)?;
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.create_contact(user.id, &draft).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn get_contact_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Contact>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.get_contact(user.id, contact_id).await?;
    Ok(Json(contact))
}

pub async fn update_contact_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Contact>, ContactsError> {
    let draft = validated_draft(request)?;
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.update_contact(user.id, contact_id, &draft).await?;
    Ok(Json(contact))
}

pub async fn delete_contact_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<StatusCode, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    service.delete_contact(user.id, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn contact_stats_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<ContactStats>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let stats = service.contact_stats(user.id).await?;
    Ok(Json(stats))
}
