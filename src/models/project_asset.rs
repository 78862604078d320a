use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Favicon,
    Css,
    Js,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Favicon => "favicon",
            Self::Css => "css",
            Self::Js => "js",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "favicon" => Ok(Self::Favicon),
            "css" => Ok(Self::Css),
            "js" => Ok(Self::Js),
            _ => Err(format!("invalid asset kind: {}", s)),
        }
    }
}

/// An uploaded file owned by a project. `stored_filename` is generated
/// server-side and is the only name trusted for disk and zip paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectAsset {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: AssetKind,
    pub original_filename: String,
    pub stored_filename: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAssetCreate {
    pub project_id: Uuid,
    pub kind: AssetKind,
    pub original_filename: String,
    pub stored_filename: String,
}
