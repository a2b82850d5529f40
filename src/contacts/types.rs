use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::import_export::CandidateContact;

/// One contact as persisted. Identity, ownership and timestamps are
/// assigned here at the persistence boundary, never by the codecs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create and update both take the full attribute set and run it
/// through the same record validator the importer uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
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

impl ContactRequest {
    pub fn into_candidate(self) -> CandidateContact {
        CandidateContact {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactStats {
    pub total: i64,
    pub recent: Vec<Contact>,
}
