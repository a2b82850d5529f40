use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Operation-level failures of the import/export flows. Row and block
/// failures never show up here; they are aggregated inside ParseResult.
#[derive(Debug, Clone)]
pub enum ImportExportError {
    MissingFile,
    FileTooLarge,
    UnsupportedFileType,
    Structural(String),
    NoValidContacts(Vec<String>),
    NothingToExport,
    DatabaseConnection,
    ImportFailed(String),
    ExportFailed(String),
}

impl std::fmt::Display for ImportExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile => write!(f, "No file provided"),
            Self::FileTooLarge => write!(f, "File size exceeds 5MB limit"),
            Self::UnsupportedFileType => write!(
                f,
                "Invalid file type. Only CSV and vCard files are supported."
            ),
            Self::Structural(msg) => write!(f, "{msg}"),
            Self::NoValidContacts(_) => write!(f, "No valid contacts found in file"),
            Self::NothingToExport => write!(f, "No contacts to export"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::ImportFailed(msg) => write!(f, "Import failed: {msg}"),
            Self::ExportFailed(msg) => write!(f, "Export failed: {msg}"),
        }
    }
}

impl std::error::Error for ImportExportError {}

impl IntoResponse for ImportExportError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::MissingFile
            | Self::FileTooLarge
            | Self::UnsupportedFileType
            | Self::Structural(_)
            | Self::NoValidContacts(_) => StatusCode::BAD_REQUEST,
            Self::NothingToExport => StatusCode::CONFLICT,
            Self::DatabaseConnection | Self::ImportFailed(_) | Self::ExportFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let details = match &self {
            Self::NoValidContacts(errors) => errors.clone(),
            _ => Vec::new(),
        };
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "details": details,
        }));
        (status, body).into_response()
    }
}
