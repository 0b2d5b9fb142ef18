//! The canonical structured résumé and its lenient construction from model output.
//!
//! Every field always exists with a type-correct value. A field the model left
//! out, or produced in the wrong shape, becomes its empty default; the rest of
//! the record is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::personal_info::split_personal_info;
use super::schema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub dates: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub dates: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredResume {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

impl StructuredResume {
    /// Builds a résumé from the model's top-level JSON object, defaulting per field.
    pub fn from_model_object(object: &Map<String, Value>) -> Self {
        let field = |name: &str| object.get(name).unwrap_or(&Value::Null);

        StructuredResume {
            personal_info: personal_info_from(field(schema::PERSONAL_INFO)),
            summary: text_from(field(schema::SUMMARY)),
            work_experience: list_of(field(schema::WORK_EXPERIENCE), work_experience_from),
            education: list_of(field(schema::EDUCATION), education_from),
            skills: text_list_from(field(schema::SKILLS)),
            certifications: text_list_from(field(schema::CERTIFICATIONS)),
        }
    }
}

fn personal_info_from(value: &Value) -> PersonalInfo {
    match value {
        Value::Object(map) => PersonalInfo {
            name: text_from(map.get("name").unwrap_or(&Value::Null)),
            email: text_from(map.get("email").unwrap_or(&Value::Null)),
            phone: text_from(map.get("phone").unwrap_or(&Value::Null)),
            location: text_from(map.get("location").unwrap_or(&Value::Null)),
        },
        Value::String(raw) => split_personal_info(raw),
        _ => PersonalInfo::default(),
    }
}

fn work_experience_from(value: &Value) -> Option<WorkExperience> {
    let map = value.as_object()?;
    Some(WorkExperience {
        company: first_text(map, &["company", "employer"]),
        position: first_text(map, &["position", "title", "role"]),
        dates: first_text(map, &["dates", "date", "period"]),
        responsibilities: text_list_from(map.get("responsibilities").unwrap_or(&Value::Null)),
    })
}

fn education_from(value: &Value) -> Option<Education> {
    let map = value.as_object()?;
    Some(Education {
        institution: first_text(map, &["institution", "school", "university"]),
        degree: first_text(map, &["degree", "qualification"]),
        dates: first_text(map, &["dates", "date", "period"]),
    })
}

/// Scalar → string. Numbers and booleans are rendered; anything else is empty.
fn text_from(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(text_from)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn list_of<T>(value: &Value, item: fn(&Value) -> Option<T>) -> Vec<T> {
    match value {
        Value::Array(items) => items.iter().filter_map(item).collect(),
        Value::Object(_) => item(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Accepts a list of strings, a comma-separated string, a list of objects with a
/// `name`, or an object of category → list (flattened in order).
fn text_list_from(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_texts(value, &mut out);
    out
}

fn collect_texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        ),
        Value::Array(items) => {
            for item in items {
                match item {
                    // list entries are kept whole, commas included
                    Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
                    Value::Object(map) => {
                        let name = first_text(map, &["name", "title"]);
                        if !name.is_empty() {
                            out.push(name);
                        }
                    }
                    Value::Number(_) | Value::Bool(_) => out.push(text_from(item)),
                    _ => {}
                }
            }
        }
        Value::Object(map) => {
            for nested in map.values() {
                collect_texts(nested, out);
            }
        }
        _ => {}
    }
}
