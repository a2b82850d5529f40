use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::warn;
use serde::Deserialize;

use super::error::ImportExportError;
use super::service::ImportExportService;
use super::types::{ExportFile, ExportFormat, ImportSummary};
use crate::auth::AuthenticatedUser;
use crate::shared::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["text/csv", "text/vcard", "text/x-vcard"];

pub fn import_export_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/import", post(import_contacts_handler))
        .route("/export", get(export_contacts_handler))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportQuery {
    pub format: ExportFormat,
}

pub async fn import_contacts_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ImportExportError> {
    let mut file_name = String::new();
    let mut content_type = String::new();
    let mut data: Vec<u8> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed import upload: {e}");
        ImportExportError::Structural("Malformed multipart upload".to_string())
    })? {
        if field.name() != Some("file") {
            continue;
        }
        file_name = field.file_name().unwrap_or("upload").to_string();
        content_type = field.content_type().unwrap_or("").to_string();
        data = field
            .bytes()
            .await
            .map_err(|e| {
                warn!("Failed to read import upload: {e}");
                ImportExportError::Structural("Failed to read uploaded file".to_string())
            })?
            .to_vec();
    }

    if data.is_empty() {
        return Err(ImportExportError::MissingFile);
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ImportExportError::FileTooLarge);
    }
    if !is_accepted_upload(&file_name, &content_type) {
        return Err(ImportExportError::UnsupportedFileType);
    }

    let service = ImportExportService::new(Arc::new(state.conn.clone()));
    let summary = service
        .import_contacts(user.id, &file_name, &content_type, &data)
        .await?;
    Ok(Json(summary))
}

pub async fn export_contacts_handler(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportFile>, ImportExportError> {
    let service = ImportExportService::new(Arc::new(state.conn.clone()));
    let file = service.export_contacts(user.id, query.format).await?;
    Ok(Json(file))
}

fn is_accepted_upload(file_name: &str, content_type: &str) -> bool {
    if ACCEPTED_CONTENT_TYPES.contains(&content_type) {
        return true;
    }
    let name = file_name.to_lowercase();
    name.ends_with(".csv") || name.ends_with(".vcf") || name.ends_with(".vcard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_uploads() {
        assert!(is_accepted_upload("contacts.csv", "application/octet-stream"));
        assert!(is_accepted_upload("Contacts.VCF", ""));
        assert!(is_accepted_upload("export", "text/x-vcard"));
        assert!(!is_accepted_upload("contacts.xlsx", "application/vnd.ms-excel"));
        assert!(!is_accepted_upload("notes.txt", "text/plain"));
    }
}
