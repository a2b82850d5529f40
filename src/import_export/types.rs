use serde::{Deserialize, Serialize};

/// Raw decode output for one tabular row or one structured block, prior
/// to validation. Every attribute is possibly-empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub notes: String,
}

/// A candidate that passed the record validator. Optional attributes
/// that decoded to empty text are collapsed to None here, so the
/// persistence layer stores NULL rather than empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// Aggregate outcome of decoding one uploaded file. Row and block
/// failures are collected here instead of aborting the batch; only a
/// structurally unreadable input fails the whole operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub contacts: Vec<ContactDraft>,
    pub errors: Vec<String>,
    pub total_rows: usize,
    pub success_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Vcard,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Vcard => "vcf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Vcard => "text/vcard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    pub success: bool,
    pub content: String,
    pub content_type: String,
    pub filename: String,
    pub contact_count: usize,
}
