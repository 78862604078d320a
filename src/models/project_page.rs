use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A page belonging to a project. Its placeholders are derived from
/// the template's current HTML, never stored; `content` keeps the flat
/// dot-notation map the editor last saved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectPage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub template_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: Json<HashMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPageCreate {
    pub project_id: Uuid,
    pub template_id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPageUpdate {
    pub template_id: Option<Uuid>,
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// Lowercase alphanumeric runs separated by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
