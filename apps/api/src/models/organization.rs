use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1e40af";
pub const DEFAULT_FONT: &str = "Inter";

/// Branding applied to every rendered CV of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub primary_color: String,
    pub secondary_color: String,
    pub font: String,
    /// `http(s)://` URL, or a path relative to the assets directory.
    pub logo_reference: Option<String>,
}

impl Default for OrganizationProfile {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            font: DEFAULT_FONT.to_string(),
            logo_reference: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub font: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizationRow> for OrganizationProfile {
    fn from(row: OrganizationRow) -> Self {
        let defaults = OrganizationProfile::default();
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            primary_color: non_empty(row.primary_color).unwrap_or(defaults.primary_color),
            secondary_color: non_empty(row.secondary_color).unwrap_or(defaults.secondary_color),
            font: non_empty(row.font).unwrap_or(defaults.font),
            logo_reference: non_empty(row.logo_url),
        }
    }
}
