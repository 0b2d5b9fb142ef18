//! Named HTML page layouts.
//!
//! A layout is an HTML document with `{{placeholder}}` slots. `{{style}}` and
//! `{{main}}` are required; a layout that also has `{{left}}` is two-column
//! and receives left-column sections there.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::html::has_placeholder;
use super::RenderError;

pub const ONE_COLUMN: &str = "1-column";
pub const TWO_COLUMN: &str = "2-column";

const REQUIRED_SLOTS: [&str; 2] = ["style", "main"];
const LEFT_SLOT: &str = "left";

#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub html: String,
}

impl Layout {
    fn new(name: &str, html: String) -> Result<Self, String> {
        if let Some(missing) = REQUIRED_SLOTS.iter().find(|slot| !has_placeholder(&html, slot)) {
            return Err(format!("layout '{name}' has no {{{{{missing}}}}} slot"));
        }
        Ok(Self {
            name: name.to_string(),
            html,
        })
    }

    pub fn is_two_column(&self) -> bool {
        has_placeholder(&self.html, LEFT_SLOT)
    }
}

/// Maps accepted spellings to a canonical layout name.
fn canonical_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    match lowered.as_str() {
        "single-column" | "one-column" | "1column" => ONE_COLUMN.to_string(),
        "two-column" | "2column" => TWO_COLUMN.to_string(),
        _ => lowered,
    }
}

#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    layouts: BTreeMap<String, Layout>,
}

impl LayoutRegistry {
    /// The layouts compiled into the binary.
    pub fn builtin() -> Self {
        let mut layouts = BTreeMap::new();
        for (name, html) in [
            (ONE_COLUMN, include_str!("../../layouts/one-column.html")),
            (TWO_COLUMN, include_str!("../../layouts/two-column.html")),
        ] {
            layouts.insert(
                name.to_string(),
                Layout {
                    name: name.to_string(),
                    html: html.to_string(),
                },
            );
        }
        Self { layouts }
    }

    /// Built-in layouts plus every `<name>.html` in `dir`. A file named after a
    /// built-in layout replaces it; a file without the required slots is skipped.
    pub fn with_directory(dir: &Path) -> Result<Self, RenderError> {
        let mut registry = Self::builtin();

        let entries = fs::read_dir(dir).map_err(|e| {
            RenderError::Io(format!("Failed to read layouts dir {}: {e}", dir.display()))
        })?;

        for entry in entries {
            let path = entry.map_err(|e| RenderError::Io(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let html = fs::read_to_string(&path).map_err(|e| {
                RenderError::Io(format!("Failed to read layout {}: {e}", path.display()))
            })?;
            let name = canonical_name(stem);
            match Layout::new(&name, html) {
                Ok(layout) => {
                    info!("Loaded layout '{name}' from {}", path.display());
                    registry.layouts.insert(name, layout);
                }
                Err(reason) => warn!("Skipping {}: {reason}", path.display()),
            }
        }

        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Result<&Layout, RenderError> {
        self.layouts
            .get(&canonical_name(name))
            .ok_or_else(|| RenderError::UnknownLayout(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.layouts.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_have_required_slots() {
        let registry = LayoutRegistry::builtin();
        for name in registry.names() {
            let layout = registry.get(&name).unwrap();
            assert!(Layout::new(&name, layout.html.clone()).is_ok(), "{name}");
        }
        assert!(!registry.get(ONE_COLUMN).unwrap().is_two_column());
        assert!(registry.get(TWO_COLUMN).unwrap().is_two_column());
    }

    #[test]
    fn test_aliases_resolve_to_builtin_names() {
        let registry = LayoutRegistry::builtin();
        assert_eq!(registry.get("single-column").unwrap().name, ONE_COLUMN);
        assert_eq!(registry.get(" Two-Column ").unwrap().name, TWO_COLUMN);
    }

    #[test]
    fn test_unknown_layout_is_an_error() {
        let err = LayoutRegistry::builtin().get("three-column").unwrap_err();
        assert!(matches!(err, RenderError::UnknownLayout(ref name) if name == "three-column"));
    }

    #[test]
    fn test_directory_adds_layouts_and_skips_invalid_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("compact.html"),
            "<html><style>{{style}}</style><body>{{main}}</body></html>",
        )
        .unwrap();
        fs::write(dir.path().join("broken.html"), "<html>{{main}}</html>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = LayoutRegistry::with_directory(dir.path()).unwrap();

        assert_eq!(registry.names(), vec!["1-column", "2-column", "compact"]);
        assert!(registry.get("broken").is_err());
    }

    #[test]
    fn test_spaced_slots_are_recognized() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sidebar.html"),
            "<html><style>{{ style }}</style><aside>{{ left }}</aside><main>{{main }}</main></html>",
        )
        .unwrap();

        let registry = LayoutRegistry::with_directory(dir.path()).unwrap();

        let layout = registry.get("sidebar").unwrap();
        assert!(layout.is_two_column());
    }

    #[test]
    fn test_missing_slot_is_reported_by_name() {
        let err = Layout::new("bare", "<html>{{ main }}</html>".to_string()).unwrap_err();
        assert_eq!(err, "layout 'bare' has no {{style}} slot");
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LayoutRegistry::with_directory(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
