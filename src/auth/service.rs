use std::sync::Arc;

use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text, Uuid as DieselUuid};
use jsonwebtoken::{encode, Header};
use log::{error, info};
use uuid::Uuid;

use super::error::AuthError;
use super::password::{hash_password, password_issues, verify_password};
use super::types::{Claims, LoginRequest, RegisterRequest, SessionUser};
use crate::config::AuthConfig;
use crate::import_export::validate::is_valid_email;
use crate::shared::utils::DbPool;

#[derive(QueryableByName)]
struct UserRow {
    #[diesel(sql_type = DieselUuid)]
    id: Uuid,
    #[diesel(sql_type = Text)]
    email: String,
    #[diesel(sql_type = Nullable<Text>)]
    name: Option<String>,
    #[diesel(sql_type = Text)]
    password_hash: String,
}

pub struct AuthService {
    pool: Arc<DbPool>,
}

impl AuthService {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<SessionUser, AuthError> {
        let mut reasons = Vec::new();
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = name {
            if name.chars().count() < 2 {
                reasons.push("Name must be at least 2 characters".to_string());
            }
        }
        if !is_valid_email(&request.email) {
            reasons.push("Invalid email address".to_string());
        }
        reasons.extend(password_issues(&request.password));
        if !reasons.is_empty() {
            return Err(AuthError::InvalidInput(reasons.join("; ")));
        }

        let mut conn = self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            AuthError::DatabaseConnection
        })?;

        let existing: Vec<UserRow> = diesel::sql_query(
            "SELECT id, email, name, password_hash FROM users WHERE email = $1",
        )
        .bind::<Text, _>(&request.email)
        .load(&mut conn)
        .map_err(|e| {
            error!("Failed to look up user: {e}");
            AuthError::DatabaseConnection
        })?;
        if !existing.is_empty() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&request.password).map_err(|e| {
            error!("Failed to hash password: {e}");
            AuthError::RegistrationFailed
        })?;

        let id = Uuid::new_v4();
        diesel::sql_query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            "#,
        )
        .bind::<DieselUuid, _>(id)
        .bind::<Text, _>(&request.email)
        .bind::<Nullable<Text>, _>(name)
        .bind::<Text, _>(&password_hash)
        .execute(&mut conn)
        .map_err(|e| {
            error!("Failed to create user: {e}");
            AuthError::RegistrationFailed
        })?;

        info!("Registered user {id}");
        Ok(SessionUser {
            id,
            email: request.email,
            name: name.map(str::to_string),
        })
    }

    /// Credential check followed by session-token issue. A missing user
    /// and a bad password fail identically.
    pub async fn login(
        &self,
        request: LoginRequest,
        config: &AuthConfig,
    ) -> Result<(String, SessionUser), AuthError> {
        let mut conn = self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            AuthError::DatabaseConnection
        })?;

        let rows: Vec<UserRow> = diesel::sql_query(
            "SELECT id, email, name, password_hash FROM users WHERE email = $1",
        )
        .bind::<Text, _>(&request.email)
        .load(&mut conn)
        .map_err(|e| {
            error!("Failed to look up user: {e}");
            AuthError::DatabaseConnection
        })?;

        let user = rows.into_iter().next().ok_or(AuthError::InvalidCredentials)?;

        let valid = verify_password(&request.password, &user.password_hash).map_err(|e| {
            error!("Password verification failed: {e}");
            AuthError::InvalidCredentials
        })?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token = issue_token(&user, config)?;
        info!("User {} logged in", user.id);

        Ok((
            token,
            SessionUser {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        ))
    }
}

fn issue_token(user: &UserRow, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.session_expiry_hours)).timestamp(),
    };
    encode(&Header::default(), &claims, &config.encoding_key()).map_err(|e| {
        error!("Failed to issue session token: {e}");
        AuthError::SessionFailed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::pg::PgConnection;
    use diesel::r2d2::{ConnectionManager, Pool};
    use jsonwebtoken::{decode, Validation};

    fn disconnected_pool() -> crate::shared::utils::DbPool {
        let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unused");
        Pool::builder().build_unchecked(manager)
    }

    #[test]
    fn test_issued_token_round_trips() {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            session_expiry_hours: 24,
        };
        let user = UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            password_hash: String::new(),
        };

        let token = issue_token(&user, &config).unwrap();
        let claims = decode::<Claims>(&token, &config.decoding_key(), &Validation::default())
            .unwrap()
            .claims;

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input_before_touching_the_store() {
        let service = AuthService::new(Arc::new(disconnected_pool()));
        let err = service
            .register(RegisterRequest {
                name: Some("A".to_string()),
                email: "not-an-email".to_string(),
                password: "weak".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            AuthError::InvalidInput(msg) => {
                assert!(msg.contains("Name must be at least 2 characters"));
                assert!(msg.contains("Invalid email address"));
                assert!(msg.contains("Password must be at least 8 characters"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
