use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Existence of a NavbarItem for a page means "included in navbar".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NavbarItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub page_id: Uuid,
    pub link_text: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarItemCreate {
    pub project_id: Uuid,
    pub page_id: Uuid,
    pub link_text: String,
    pub position: i32,
}

/// A navbar entry joined with its page slug, ready for link rendering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NavbarLink {
    pub link_text: String,
    pub position: i32,
    pub slug: String,
}
