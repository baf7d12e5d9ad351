//! Checklist template model, validation, and the built-in fallback.
//!
//! A [`Template`] is an ordered list of named sections, each holding an
//! ordered list of named items. Templates arrive from YAML, JSON, or Markdown
//! sources (see [`parser`] and [`markdown`]) and are always validated into
//! this one canonical shape before the rest of the engine sees them.

pub mod loader;
pub mod markdown;
pub mod parser;

pub use loader::TemplateLoader;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A single checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name shown to the reviewer.
    pub name: String,
    /// Optional documentation link for the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Item {
    /// Create an item with no documentation link.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    /// Create an item with a documentation link.
    #[must_use]
    pub fn with_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

/// An ordered group of checklist items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Display name of the section.
    pub name: String,
    /// Items in display order.
    pub items: Vec<Item>,
}

impl Section {
    /// Create a section from a name and items.
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

/// A full checklist template in canonical form.
///
/// Section and item order is significant and preserved from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Optional template title (Markdown `# ` heading, or `title` field).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Sections in display order.
    pub sections: Vec<Section>,
}

impl Template {
    /// Validate the canonical structural invariants.
    ///
    /// A template is valid iff it has at least one section, every section has
    /// a non-empty name, and every item has a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns a `template`-category error naming the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(EngineError::template("template has no sections"));
        }
        for (idx, section) in self.sections.iter().enumerate() {
            if section.name.trim().is_empty() {
                return Err(EngineError::template(format!(
                    "section {} has an empty name",
                    idx + 1
                )));
            }
            for item in &section.items {
                if item.name.trim().is_empty() {
                    return Err(EngineError::template(format!(
                        "section '{}' contains an item with an empty name",
                        section.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of items across all sections.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// The built-in template returned whenever loading or parsing fails.
///
/// Guarantees template loading is total: callers always get something
/// renderable, even with an unreachable or garbage source.
#[must_use]
pub fn fallback_template() -> Template {
    Template {
        title: Some("Review Checklist".to_string()),
        sections: vec![
            Section::new(
                "Functionality",
                vec![
                    Item::new("Change works as described"),
                    Item::new("Edge cases are handled"),
                    Item::new("Tests cover the change"),
                ],
            ),
            Section::new(
                "Code Quality",
                vec![
                    Item::new("Code is readable and well named"),
                    Item::new("No unnecessary complexity"),
                    Item::new("Documentation is updated"),
                ],
            ),
            Section::new(
                "Security",
                vec![
                    Item::new("Input is validated"),
                    Item::new("No secrets are committed"),
                    Item::new("New dependencies are reviewed"),
                ],
            ),
        ],
    }
}

/// Template source format, selected by URL extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Yaml,
    Json,
    Markdown,
}

impl TemplateFormat {
    /// Sniff the format from a source URL or path.
    ///
    /// `.yaml`/`.yml` and `.json` are recognized (case-insensitively, query
    /// strings ignored); everything else parses as Markdown.
    #[must_use]
    pub fn for_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::Yaml
        } else if path.ends_with(".json") {
            Self::Json
        } else {
            Self::Markdown
        }
    }
}
