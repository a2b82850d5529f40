use crate::config::AuthConfig;
use crate::shared::utils::DbPool;

pub struct AppState {
    pub conn: DbPool,
    pub auth: AuthConfig,
}
