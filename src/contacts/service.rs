use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz, Uuid as DieselUuid};
use log::error;
use uuid::Uuid;

use super::error::ContactsError;
use super::types::{Contact, ContactListQuery, ContactListResponse, ContactStats};
use crate::import_export::ContactDraft;
use crate::shared::utils::DbPool;

#[derive(QueryableByName)]
struct ContactRow {
    #[diesel(sql_type = DieselUuid)]
    id: Uuid,
    #[diesel(sql_type = DieselUuid)]
    user_id: Uuid,
    #[diesel(sql_type = Text)]
    first_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    last_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    email: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    phone: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    address: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    city: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    state: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    zip_code: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    country: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    notes: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    updated_at: DateTime<Utc>,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

const CONTACT_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, address, \
     city, state, zip_code, country, notes, created_at, updated_at";

pub struct ContactsService {
    pool: Arc<DbPool>,
}

impl ContactsService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub async fn create_contact(
        &self,
        user_id: Uuid,
        draft: &ContactDraft,
    ) -> Result<Contact, ContactsError> {
        let mut conn = self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ContactsError::DatabaseConnection
        })?;

        let id = Uuid::new_v4();
        insert_contact(&mut conn, id, user_id, draft).map_err(|e| {
            error!("Failed to create contact: {e}");
            ContactsError::CreateFailed
        })?;

        self.get_contact(user_id, id).await
    }

    /// Insert every draft in one transaction so a storage failure never
    /// leaves a half-imported batch behind.
    pub async fn create_many(
        &self,
        user_id: Uuid,
        drafts: &[ContactDraft],
    ) -> Result<usize, ContactsError> {
        let mut conn = self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ContactsError::DatabaseConnection
        })?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for draft in drafts {
                insert_contact(conn, Uuid::new_v4(), user_id, draft)?;
            }
            Ok(())
        })
        .map_err(|e| {
            error!("Failed to insert imported contacts: {e}");
            ContactsError::CreateFailed
        })?;

        Ok(drafts.len())
    }

    pub async fn get_contact(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
    ) -> Result<Contact, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2"
        );

        let rows: Vec<ContactRow> = diesel::sql_query(sql)
            .bind::<DieselUuid, _>(contact_id)
            .bind::<DieselUuid, _>(user_id)
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to get contact: {e}");
                ContactsError::DatabaseConnection
            })?;

        let row = rows.into_iter().next().ok_or(ContactsError::NotFound)?;
        Ok(row_to_contact(row))
    }

    pub async fn list_contacts(
        &self,
        user_id: Uuid,
        query: ContactListQuery,
    ) -> Result<ContactListResponse, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let rows: Vec<ContactRow> = match query.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                let sql = format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts \
                     WHERE user_id = $1 AND (first_name ILIKE '%' || $2 || '%' \
                        OR last_name ILIKE '%' || $2 || '%' \
                        OR email ILIKE '%' || $2 || '%' \
                        OR phone ILIKE '%' || $2 || '%') \
                     ORDER BY first_name ASC"
                );
                diesel::sql_query(sql)
                    .bind::<DieselUuid, _>(user_id)
                    .bind::<Text, _>(search)
                    .load(&mut conn)
            }
            None => {
                let sql = format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts \
                     WHERE user_id = $1 ORDER BY first_name ASC"
                );
                diesel::sql_query(sql)
                    .bind::<DieselUuid, _>(user_id)
                    .load(&mut conn)
            }
        }
        .map_err(|e| {
            error!("Failed to list contacts: {e}");
            ContactsError::DatabaseConnection
        })?;

        let contacts: Vec<Contact> = rows.into_iter().map(row_to_contact).collect();
        let total_count = contacts.len();

        Ok(ContactListResponse {
            contacts,
            total_count,
        })
    }

    /// Full owned set in export order.
    pub async fn list_all(&self, user_id: Uuid) -> Result<Vec<Contact>, ContactsError> {
        let response = self
            .list_contacts(user_id, ContactListQuery::default())
            .await?;
        Ok(response.contacts)
    }

    pub async fn update_contact(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
        draft: &ContactDraft,
    ) -> Result<Contact, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let sql = r#"
            UPDATE contacts SET
                first_name = $1, last_name = $2, email = $3, phone = $4,
                address = $5, city = $6, state = $7, zip_code = $8,
                country = $9, notes = $10, updated_at = NOW()
            WHERE id = $11 AND user_id = $12
        "#;

        let updated = diesel::sql_query(sql)
            .bind::<Text, _>(&draft.first_name)
            .bind::<Nullable<Text>, _>(draft.last_name.as_deref())
            .bind::<Nullable<Text>, _>(draft.email.as_deref())
            .bind::<Nullable<Text>, _>(draft.phone.as_deref())
            .bind::<Nullable<Text>, _>(draft.address.as_deref())
            .bind::<Nullable<Text>, _>(draft.city.as_deref())
            .bind::<Nullable<Text>, _>(draft.state.as_deref())
            .bind::<Nullable<Text>, _>(draft.zip_code.as_deref())
            .bind::<Nullable<Text>, _>(draft.country.as_deref())
            .bind::<Nullable<Text>, _>(draft.notes.as_deref())
            .bind::<DieselUuid, _>(contact_id)
            .bind::<DieselUuid, _>(user_id)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to update contact: {e}");
                ContactsError::UpdateFailed
            })?;

        if updated == 0 {
            return Err(ContactsError::NotFound);
        }

        self.get_contact(user_id, contact_id).await
    }

    pub async fn delete_contact(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
    ) -> Result<(), ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let deleted =
            diesel::sql_query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
                .bind::<DieselUuid, _>(contact_id)
                .bind::<DieselUuid, _>(user_id)
                .execute(&mut conn)
                .map_err(|e| {
                    error!("Failed to delete contact: {e}");
                    ContactsError::DeleteFailed
                })?;

        if deleted == 0 {
            return Err(ContactsError::NotFound);
        }

        log::info!("Deleted contact {contact_id}");
        Ok(())
    }

    pub async fn contact_stats(&self, user_id: Uuid) -> Result<ContactStats, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let counts: Vec<CountRow> =
            diesel::sql_query("SELECT COUNT(*) as count FROM contacts WHERE user_id = $1")
                .bind::<DieselUuid, _>(user_id)
                .load(&mut conn)
                .map_err(|e| {
                    error!("Failed to count contacts: {e}");
                    ContactsError::DatabaseConnection
                })?;
        let total = counts.first().map(|r| r.count).unwrap_or(0);

        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 5"
        );
        let rows: Vec<ContactRow> = diesel::sql_query(sql)
            .bind::<DieselUuid, _>(user_id)
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to load recent contacts: {e}");
                ContactsError::DatabaseConnection
            })?;

        Ok(ContactStats {
            total,
            recent: rows.into_iter().map(row_to_contact).collect(),
        })
    }
}

fn insert_contact(
    conn: &mut PgConnection,
    id: Uuid,
    user_id: Uuid,
    draft: &ContactDraft,
) -> Result<usize, diesel::result::Error> {
    let sql = r#"
        INSERT INTO contacts (
            id, user_id, first_name, last_name, email, phone, address,
            city, state, zip_code, country, notes, created_at, updated_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW()
        )
    "#;

    diesel::sql_query(sql)
        .bind::<DieselUuid, _>(id)
        .bind::<DieselUuid, _>(user_id)
        .bind::<Text, _>(&draft.first_name)
        .bind::<Nullable<Text>, _>(draft.last_name.as_deref())
        .bind::<Nullable<Text>, _>(draft.email.as_deref())
        .bind::<Nullable<Text>, _>(draft.phone.as_deref())
        .bind::<Nullable<Text>, _>(draft.address.as_deref())
        .bind::<Nullable<Text>, _>(draft.city.as_deref())
        .bind::<Nullable<Text>, _>(draft.state.as_deref())
        .bind::<Nullable<Text>, _>(draft.zip_code.as_deref())
        .bind::<Nullable<Text>, _>(draft.country.as_deref())
        .bind::<Nullable<Text>, _>(draft.notes.as_deref())
        .execute(conn)
}

fn row_to_contact(row: ContactRow) -> Contact {
    Contact {
        id: row.id,
        user_id: row.user_id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        city: row.city,
        state: row.state,
        zip_code: row.zip_code,
        country: row.country,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
