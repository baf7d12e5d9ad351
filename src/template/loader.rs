//! Template fetching with graceful multi-stage fallback.
//!
//! [`TemplateLoader::load`] is total with respect to availability: transport
//! failures, parse failures, and schema failures all degrade (with a warning)
//! to the built-in fallback template, so a checklist is always renderable no
//! matter what the configured template source looks like.

use tracing::{debug, warn};

use super::{fallback_template, markdown, parser, Template, TemplateFormat};
use crate::error::{EngineError, Result};

/// Fetches and parses checklist templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateLoader {
    client: reqwest::Client,
}

impl TemplateLoader {
    /// Create a loader with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the template at `url`, falling back to the built-in template on
    /// any failure. Never returns an error.
    pub async fn load(&self, url: &str) -> Template {
        let text = match self.fetch(url).await {
            Ok(text) => text,
            Err(err) => {
                warn!(url, error = %err, "template fetch failed, using fallback");
                return fallback_template();
            }
        };

        let format = TemplateFormat::for_url(url);
        match parse_template(&text, format) {
            Ok(template) => {
                debug!(
                    url,
                    sections = template.sections.len(),
                    items = template.item_count(),
                    "template loaded"
                );
                template
            }
            Err(err) => {
                warn!(url, error = %err, "template parse failed, using fallback");
                fallback_template()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::network(format!(
                "template source returned HTTP {status}"
            )));
        }
        Ok(response.text().await?)
    }
}

/// Parse template text in the given format, surfacing classification errors.
///
/// This is the pure stage of [`TemplateLoader::load`], exposed for callers
/// that already hold the template text and want to see why parsing failed.
///
/// # Errors
///
/// `yaml` category for syntax failures, `template` for schema violations.
pub fn parse_template(text: &str, format: TemplateFormat) -> Result<Template> {
    match format {
        TemplateFormat::Yaml => parser::parse_yaml(text),
        TemplateFormat::Json => parser::parse_json(text),
        TemplateFormat::Markdown => markdown::parse_markdown(text),
    }
}
