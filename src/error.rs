//! Structured error types for the checklist engine.
//!
//! Every anticipated failure crosses the engine boundary as an [`EngineError`]
//! carrying a category, an optional detail string, recovery suggestions, and a
//! recoverable flag, so callers can inspect failures uniformly instead of
//! matching on ad-hoc error shapes.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure taxonomy shared by every engine component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Structurally invalid template (well-formed source, bad schema).
    Template,
    /// Parse failure in a YAML or JSON template source.
    Yaml,
    /// Fetch or transport failure while loading a template.
    Network,
    /// Underlying key-value store failure.
    Storage,
    /// Review-context identifier could not be extracted.
    Context,
    /// Catch-all for unanticipated failures.
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Template => "template",
            Self::Yaml => "yaml",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Context => "context",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The engine's single error type.
#[derive(Error, Debug, Clone)]
#[error("{category} error: {message}")]
pub struct EngineError {
    category: ErrorCategory,
    message: String,
    details: Option<String>,
    suggestions: Vec<String>,
    recoverable: bool,
    timestamp: DateTime<Utc>,
}

impl EngineError {
    /// Create an error with category-default suggestions and recoverability.
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            details: None,
            suggestions: default_suggestions(category),
            recoverable: default_recoverable(category),
            timestamp: Utc::now(),
        }
    }

    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a structurally-invalid-template error.
    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Template, message)
    }

    /// Create a YAML/JSON parse error.
    #[must_use]
    pub fn yaml(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Yaml, message)
    }

    /// Create a fetch/transport error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    /// Create a key-value store error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Storage, message)
    }

    /// Create a context-identifier extraction error.
    #[must_use]
    pub fn context_id(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Context, message)
    }

    /// Create a catch-all error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Unknown, message)
    }

    /// Attach a detail string (underlying error text, offending input, ...).
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Replace the category-default suggestions with explicit ones.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Override the category-default recoverable flag.
    #[must_use]
    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// The failure category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional underlying detail.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Suggested remedies for this failure.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Whether a retry or fallback can sensibly follow this failure.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    /// When the error was constructed.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn default_recoverable(category: ErrorCategory) -> bool {
    matches!(
        category,
        ErrorCategory::Template
            | ErrorCategory::Yaml
            | ErrorCategory::Network
            | ErrorCategory::Storage
    )
}

fn default_suggestions(category: ErrorCategory) -> Vec<String> {
    let suggestions: &[&str] = match category {
        ErrorCategory::Template => &[
            "Check that the template has a 'sections' list",
            "Ensure every section has a name and an 'items' list",
        ],
        ErrorCategory::Yaml => &[
            "Check the template's indentation and quoting",
            "Fall back to the built-in default template",
        ],
        ErrorCategory::Network => &[
            "Check your network connection",
            "Verify the template URL is reachable",
            "Retry the request",
        ],
        ErrorCategory::Storage => &[
            "Retry the operation",
            "Clear stored checklist data if the store is corrupted",
        ],
        ErrorCategory::Context => &["Verify the review-context identifier (e.g. owner/repo#123)"],
        ErrorCategory::Unknown => &["Retry the operation"],
    };
    suggestions.iter().map(|s| (*s).to_string()).collect()
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::network("template fetch failed").with_details(err.to_string())
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::yaml("invalid YAML").with_details(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::yaml("invalid JSON").with_details(err.to_string())
    }
}

/// Type alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
