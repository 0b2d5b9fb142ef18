//! Everything one render needs, resolved up front: which sections appear where,
//! and the sanitized branding values.

use std::path::Path;

use tracing::warn;

use crate::models::organization::{
    OrganizationProfile, DEFAULT_FONT, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
};
use crate::models::template::{Column, SectionDescriptor, TemplateDescriptor};
use crate::structuring::StructuredResume;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    PersonalInfo,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Footer,
}

impl SectionKind {
    /// Accepts `personal-info`, `personal_info`, `Experience`, ...
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "header" => Some(SectionKind::Header),
            "personal-info" => Some(SectionKind::PersonalInfo),
            "summary" => Some(SectionKind::Summary),
            "experience" | "work-experience" => Some(SectionKind::Experience),
            "education" => Some(SectionKind::Education),
            "skills" => Some(SectionKind::Skills),
            "certifications" => Some(SectionKind::Certifications),
            "footer" => Some(SectionKind::Footer),
            _ => None,
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            SectionKind::Header => "Header",
            SectionKind::PersonalInfo => "Personal Information",
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Certifications => "Certifications",
            SectionKind::Footer => "Footer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSection {
    pub kind: SectionKind,
    pub title: String,
    pub column: Column,
}

/// Branding values that are safe to drop into CSS and HTML attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styling {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub resume: &'a StructuredResume,
    pub sections: Vec<PlacedSection>,
    pub style: Styling,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        resume: &'a StructuredResume,
        template: &TemplateDescriptor,
        organization: &OrganizationProfile,
        assets_dir: &Path,
    ) -> Self {
        Self {
            resume,
            sections: place_sections(&template.sections),
            style: Styling {
                primary_color: sanitize_color(&organization.primary_color, DEFAULT_PRIMARY_COLOR),
                secondary_color: sanitize_color(
                    &organization.secondary_color,
                    DEFAULT_SECONDARY_COLOR,
                ),
                font_family: sanitize_font(&organization.font),
                logo_url: resolve_logo(organization.logo_reference.as_deref(), assets_dir),
            },
        }
    }
}

/// Keeps template order, drops `personal-info` (the page header already shows
/// identity) and skips types this renderer does not know.
pub fn place_sections(sections: &[SectionDescriptor]) -> Vec<PlacedSection> {
    sections
        .iter()
        .filter_map(|section| {
            let Some(kind) = SectionKind::parse(&section.section_type) else {
                warn!("Skipping unknown section type '{}'", section.section_type);
                return None;
            };
            if kind == SectionKind::PersonalInfo {
                return None;
            }
            let title = section
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(kind.default_title())
                .to_string();
            Some(PlacedSection {
                kind,
                title,
                column: section.column,
            })
        })
        .collect()
}

fn sanitize_color(raw: &str, fallback: &str) -> String {
    let value = raw.trim();
    let hex = value.strip_prefix('#').unwrap_or("");
    if matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        value.to_string()
    } else {
        warn!("Ignoring invalid color '{raw}', using {fallback}");
        fallback.to_string()
    }
}

fn sanitize_font(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        DEFAULT_FONT.to_string()
    } else {
        cleaned
    }
}

/// Resolves an organization logo reference to something the rasterizer can load.
///
/// Remote URLs pass through. Anything else is a path under `assets_dir`; it must
/// exist and must not escape the directory, or the page is rendered without a logo.
pub fn resolve_logo(reference: Option<&str>, assets_dir: &Path) -> Option<String> {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;

    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(reference.to_string());
    }

    let relative = reference
        .strip_prefix("file://")
        .unwrap_or(reference)
        .trim_start_matches('/');

    let root = match assets_dir.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            warn!("Assets dir {} unavailable: {e}", assets_dir.display());
            return None;
        }
    };
    let resolved = match root.join(relative).canonicalize() {
        Ok(path) => path,
        Err(_) => {
            warn!("Logo '{reference}' not found under {}", root.display());
            return None;
        }
    };
    if !resolved.starts_with(&root) || !resolved.is_file() {
        warn!("Logo '{reference}' does not name a file inside the assets dir");
        return None;
    }

    Some(format!("file://{}", encode_path(&resolved.to_string_lossy())))
}

fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '%' => out.push_str("%25"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_personal_info_and_unknown_sections_are_dropped() {
        let sections = vec![
            SectionDescriptor::new("header", Column::Full),
            SectionDescriptor::new("personal-info", Column::Left),
            SectionDescriptor::new("personal_info", Column::Full),
            SectionDescriptor::new("hobbies", Column::Full),
            SectionDescriptor::new("experience", Column::Right),
            SectionDescriptor::new("skills", Column::Left),
        ];
        let placed = place_sections(&sections);
        let kinds: Vec<_> = placed.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Header, SectionKind::Experience, SectionKind::Skills]
        );
        assert_eq!(placed[1].title, "Work Experience");
        assert_eq!(placed[2].column, Column::Left);
    }

    #[test]
    fn test_custom_title_wins_over_default() {
        let mut section = SectionDescriptor::new("summary", Column::Full);
        section.title = Some("  About me ".to_string());
        assert_eq!(place_sections(&[section])[0].title, "About me");
    }

    #[test]
    fn test_invalid_branding_values_fall_back() {
        assert_eq!(sanitize_color("#ABCDEF", "#000"), "#ABCDEF");
        assert_eq!(sanitize_color("red;}body{", "#000"), "#000");
        assert_eq!(sanitize_font("Open Sans\"; } </style>"), "Open Sans style");
        assert_eq!(sanitize_font("  ;; "), DEFAULT_FONT);
    }

    #[test]
    fn test_remote_logo_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_logo(Some("https://cdn.example.com/logo.png"), dir.path()).as_deref(),
            Some("https://cdn.example.com/logo.png")
        );
    }

    #[test]
    fn test_local_logo_becomes_absolute_file_url() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("logos")).unwrap();
        fs::write(dir.path().join("logos/acme.png"), b"png").unwrap();

        let url = resolve_logo(Some("/logos/acme.png"), dir.path()).unwrap();

        let expected = dir.path().join("logos/acme.png").canonicalize().unwrap();
        assert_eq!(url, format!("file://{}", encode_path(&expected.to_string_lossy())));
        assert!(url.ends_with("/logos/acme.png"));
    }

    #[test]
    fn test_missing_or_escaping_logo_is_dropped() {
        let outer = tempfile::tempdir().unwrap();
        let assets = outer.path().join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(outer.path().join("secret.png"), b"png").unwrap();

        assert!(resolve_logo(Some("logos/missing.png"), &assets).is_none());
        assert!(resolve_logo(Some("../secret.png"), &assets).is_none());
        assert!(resolve_logo(Some("   "), &assets).is_none());
        assert!(resolve_logo(None, &assets).is_none());
    }
}
