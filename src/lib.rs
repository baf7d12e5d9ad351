//! revcheck - Review Checklist Engine
//!
//! Template loading and state synchronization for per-document review
//! checklists: fetch a checklist template from a configurable source (YAML,
//! JSON, or Markdown), reconcile it against persisted per-context state, and
//! write updates back through a uniform storage abstraction.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`engine`] - The caller-owned handle tying everything together
//! - [`error`] - Categorized error type shared by every component
//! - [`keys`] - Deterministic section/item identifier derivation
//! - [`options`] - Persisted options (template URL, theme) with defaulting
//! - [`state`] - Per-context checklist state and reconciliation
//! - [`storage`] - Uniform async key-value storage over two calling styles
//! - [`template`] - Template model, parsing, validation, and fallback
//!
//! # Example
//!
//! ```rust,ignore
//! use revcheck::engine::ChecklistEngine;
//! use revcheck::storage::FileStorage;
//!
//! let engine = ChecklistEngine::new(FileStorage::new("store.json"));
//! let (template, mut state) = engine.load_checklist("owner/repo#123").await?;
//!
//! state.set_checked(&revcheck::keys::scoped_item_key("Security", "Check auth"), true);
//! engine.save_state("owner/repo#123", &state).await?;
//! ```

pub mod engine;
pub mod error;
pub mod keys;
pub mod options;
pub mod state;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use error::{EngineError, ErrorCategory, Result};

pub use engine::{ChecklistEngine, EngineConfig, OPTIONS_STORAGE_KEY, STATE_STORAGE_KEY};

pub use keys::{item_key, scoped_item_key, section_key};

pub use options::{EngineOptions, ParseThemeError, Theme, DEFAULT_TEMPLATE_URL};

pub use state::{needs_attention, AttentionEntry, ChecklistState, ItemState, StorageState};

pub use storage::{CallbackAdapter, CallbackStore, FileStorage, MemoryStorage, Storage};

pub use template::{
    fallback_template, loader::parse_template, Item, Section, Template, TemplateFormat,
    TemplateLoader,
};
