use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PageTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub html: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTemplateCreate {
    pub name: String,
    pub description: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
}
