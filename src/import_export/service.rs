use std::sync::Arc;

use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::csv::{generate_csv, parse_csv};
use super::error::ImportExportError;
use super::types::{ExportFile, ExportFormat, ImportSummary};
use super::vcard::{generate_vcard, parse_vcard};
use crate::contacts::{ContactsError, ContactsService};
use crate::shared::utils::DbPool;

pub struct ImportExportService {
    contacts: ContactsService,
}

impl ImportExportService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            contacts: ContactsService::new(pool),
        }
    }

    /// Decode the uploaded file and persist every validated row for the
    /// owner. Size and content-type gates belong to the HTTP boundary;
    /// this assumes the input already passed them.
    pub async fn import_contacts(
        &self,
        user_id: Uuid,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, ImportExportError> {
        let content = std::str::from_utf8(bytes).map_err(|_| {
            ImportExportError::Structural("File is not valid UTF-8 text".to_string())
        })?;
        if content.trim().is_empty() {
            return Err(ImportExportError::Structural("File is empty".to_string()));
        }

        let result = if is_vcard_upload(file_name, content_type) {
            parse_vcard(content)
        } else {
            parse_csv(content)
        };

        if result.contacts.is_empty() {
            return Err(ImportExportError::NoValidContacts(result.errors));
        }

        let imported = self
            .contacts
            .create_many(user_id, &result.contacts)
            .await
            .map_err(import_store_error)?;

        info!(
            "Imported {imported} of {} rows from {file_name} for user {user_id}",
            result.total_rows
        );

        Ok(ImportSummary {
            success: true,
            imported,
            total: result.total_rows,
            errors: result.errors,
        })
    }

    /// Encode the owner's full contact set, ordered by first name. An
    /// empty set is a business-rule failure, not an empty file.
    pub async fn export_contacts(
        &self,
        user_id: Uuid,
        format: ExportFormat,
    ) -> Result<ExportFile, ImportExportError> {
        let contacts = self
            .contacts
            .list_all(user_id)
            .await
            .map_err(export_store_error)?;

        if contacts.is_empty() {
            return Err(ImportExportError::NothingToExport);
        }

        let content = match format {
            ExportFormat::Csv => generate_csv(&contacts)
                .map_err(|e| ImportExportError::ExportFailed(e.to_string()))?,
            ExportFormat::Vcard => generate_vcard(&contacts),
        };

        let filename = format!(
            "contacts-{}.{}",
            Utc::now().format("%Y-%m-%d"),
            format.extension()
        );

        info!(
            "Exported {} contacts as {filename} for user {user_id}",
            contacts.len()
        );

        Ok(ExportFile {
            success: true,
            content,
            content_type: format.content_type().to_string(),
            filename,
            contact_count: contacts.len(),
        })
    }
}

/// Structured-record format is selected by extension or declared
/// content type; anything else is treated as tabular.
pub(crate) fn is_vcard_upload(file_name: &str, content_type: &str) -> bool {
    let name = file_name.to_lowercase();
    name.ends_with(".vcf")
        || name.ends_with(".vcard")
        || content_type.to_lowercase().contains("vcard")
}

fn import_store_error(e: ContactsError) -> ImportExportError {
    match e {
        ContactsError::DatabaseConnection => ImportExportError::DatabaseConnection,
        other => ImportExportError::ImportFailed(other.to_string()),
    }
}

fn export_store_error(e: ContactsError) -> ImportExportError {
    match e {
        ContactsError::DatabaseConnection => ImportExportError::DatabaseConnection,
        other => ImportExportError::ExportFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcard_selected_by_extension() {
        assert!(is_vcard_upload("contacts.vcf", "application/octet-stream"));
        assert!(is_vcard_upload("CONTACTS.VCARD", ""));
        assert!(!is_vcard_upload("contacts.csv", "text/csv"));
    }

    #[test]
    fn test_vcard_selected_by_content_type() {
        assert!(is_vcard_upload("upload", "text/vcard"));
        assert!(is_vcard_upload("upload", "text/x-vcard"));
        assert!(!is_vcard_upload("upload", "text/plain"));
    }
}
