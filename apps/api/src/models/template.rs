use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Which column of a layout a section is placed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
    #[default]
    Full,
}

/// One entry of a template's ordered section list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub column: Column,
    /// Editor metadata (`id`, ...) kept as-is; the renderer ignores it.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SectionDescriptor {
    pub fn new(section_type: &str, column: Column) -> Self {
        Self {
            section_type: section_type.to_string(),
            title: None,
            column,
            extra: Map::new(),
        }
    }
}

/// Layout name plus ordered sections. Read-only input to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub layout: String,
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub layout: String,
    pub sections: Value,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl TemplateRow {
    pub fn descriptor(&self) -> Result<TemplateDescriptor, serde_json::Error> {
        Ok(TemplateDescriptor {
            layout: self.layout.clone(),
            sections: serde_json::from_value(self.sections.clone())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_descriptor_reads_editor_json() {
        let section: SectionDescriptor = serde_json::from_value(json!({
            "id": "s-1",
            "type": "experience",
            "title": "Career",
            "column": "right"
        }))
        .unwrap();
        assert_eq!(section.section_type, "experience");
        assert_eq!(section.title.as_deref(), Some("Career"));
        assert_eq!(section.column, Column::Right);
        assert_eq!(section.extra["id"], "s-1");
    }

    #[test]
    fn test_column_defaults_to_full() {
        let section: SectionDescriptor =
            serde_json::from_value(json!({"type": "skills"})).unwrap();
        assert_eq!(section.column, Column::Full);
        assert!(section.title.is_none());
    }

    #[test]
    fn test_row_to_descriptor_rejects_malformed_sections() {
        let row = TemplateRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Broken".to_string(),
            layout: "1-column".to_string(),
            sections: json!({"not": "a list"}),
            is_default: false,
            created_at: Utc::now(),
        };
        assert!(row.descriptor().is_err());
    }
}
