//! Structural parsing for YAML and JSON template sources.
//!
//! Parsing happens in two stages so failures classify correctly: a syntax
//! stage (text into a generic value, `yaml`-category errors) and a schema
//! stage (generic value into the canonical [`Template`], `template`-category
//! errors). Field-name variants accepted in the wild (`title` for a section's
//! name, `text` for an item's) are normalized here.

use serde::Deserialize;

use super::{Item, Section, Template};
use crate::error::{EngineError, Result};

/// Parse YAML template text into a validated [`Template`].
///
/// # Errors
///
/// `yaml` category for syntax failures, `template` for schema violations.
pub fn parse_yaml(text: &str) -> Result<Template> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    let raw: RawTemplate = serde_yaml::from_value(value)
        .map_err(|e| EngineError::template("template does not match the expected schema")
            .with_details(e.to_string()))?;
    build(raw)
}

/// Parse JSON template text into a validated [`Template`].
///
/// # Errors
///
/// `yaml` category for syntax failures, `template` for schema violations.
pub fn parse_json(text: &str) -> Result<Template> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let raw: RawTemplate = serde_json::from_value(value)
        .map_err(|e| EngineError::template("template does not match the expected schema")
            .with_details(e.to_string()))?;
    build(raw)
}

/// Template as deserialized, before normalization and validation.
#[derive(Debug, Deserialize)]
struct RawTemplate {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default, alias = "title")]
    name: Option<String>,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

/// Items may be a bare string or a `{name|text, url}` mapping.
///
/// Serde aliases are not honored inside untagged enums, so `name` and `text`
/// are separate fields resolved during normalization.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

fn build(raw: RawTemplate) -> Result<Template> {
    let raw_sections = raw
        .sections
        .ok_or_else(|| EngineError::template("template is missing the 'sections' list"))?;

    let mut sections = Vec::with_capacity(raw_sections.len());
    for (idx, raw_section) in raw_sections.into_iter().enumerate() {
        let name = raw_section
            .name
            .ok_or_else(|| EngineError::template(format!("section {} has no name", idx + 1)))?;
        let raw_items = raw_section.items.ok_or_else(|| {
            EngineError::template(format!("section '{name}' is missing its 'items' list"))
        })?;

        let items = raw_items
            .into_iter()
            .map(|raw_item| match raw_item {
                RawItem::Name(text) => Ok(Item::new(text)),
                RawItem::Detailed {
                    name: item_name,
                    text,
                    url,
                } => match item_name.or(text) {
                    Some(item_name) => Ok(Item {
                        name: item_name,
                        url,
                    }),
                    None => Err(EngineError::template(format!(
                        "section '{name}' contains an item with no name"
                    ))),
                },
            })
            .collect::<Result<Vec<Item>>>()?;

        sections.push(Section::new(name, items));
    }

    let template = Template {
        title: raw.title,
        sections,
    };
    template.validate()?;
    Ok(template)
}
