use sqlx::PgPool;

use siteforge::services::Storage;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub storage: Storage,
}
