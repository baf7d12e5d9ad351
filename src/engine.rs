//! The checklist engine: one caller-owned handle over template loading,
//! state reconciliation, and options.
//!
//! There is deliberately no module-level state anywhere in this crate; every
//! operation goes through a [`ChecklistEngine`] the caller constructs and
//! owns. Within one handle, operations issued sequentially against the same
//! state key complete in issue order. Across processes, concurrent saves
//! race with whole-store last-write-wins granularity, an accepted limitation
//! of the single-blob persistence model.

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::options::EngineOptions;
use crate::state::{prune_stale, ChecklistState, StorageState};
use crate::storage::Storage;
use crate::template::{Template, TemplateLoader};

/// Storage key holding the full per-context state map.
pub const STATE_STORAGE_KEY: &str = "checklist-state";

/// Storage key holding the options record.
pub const OPTIONS_STORAGE_KEY: &str = "options";

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Records with a `last_updated` older than this are dropped at save
    /// time; `None` disables pruning entirely.
    pub retention: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention: Some(Duration::days(90)),
        }
    }
}

/// The engine handle. Generic over the storage backend.
pub struct ChecklistEngine<S> {
    storage: S,
    loader: TemplateLoader,
    config: EngineConfig,
}

impl<S: Storage> ChecklistEngine<S> {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(storage: S, config: EngineConfig) -> Self {
        Self {
            storage,
            loader: TemplateLoader::new(),
            config,
        }
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Load the template at `url`; total, never fails (see
    /// [`TemplateLoader::load`]).
    pub async fn load_template(&self, url: &str) -> Template {
        self.loader.load(url).await
    }

    /// The full happy path: options supply the template URL, the template is
    /// loaded (with fallback), and the context's state is reconciled
    /// against it.
    ///
    /// # Errors
    ///
    /// Only storage failures while reading state surface here; template and
    /// options problems degrade to defaults.
    pub async fn load_checklist(&self, state_key: &str) -> Result<(Template, ChecklistState)> {
        let options = self.get_options().await;
        let url = options.default_template_url;
        let template = self.load_template(&url).await;
        let state = self.load_state(state_key, &template, &url).await?;
        Ok((template, state))
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Load the state for one review context.
    ///
    /// A never-saved key yields a fresh state derived from `template`. A
    /// previously saved record is returned as-is: entries for items no
    /// longer in the template are preserved, and entries for newly-added
    /// items default lazily on access.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    pub async fn load_state(
        &self,
        state_key: &str,
        template: &Template,
        template_url: &str,
    ) -> Result<ChecklistState> {
        let store = self.read_store().await?;
        match store.get(state_key) {
            Some(state) => {
                debug!(state_key, items = state.items.len(), "loaded existing state");
                Ok(state.clone())
            }
            None => {
                debug!(state_key, "no saved state, initializing from template");
                Ok(ChecklistState::for_template(template, template_url))
            }
        }
    }

    /// Persist the state for one review context.
    ///
    /// Stamps `last_updated`, prunes records older than the retention window
    /// (never the one being saved), and writes the whole store back as a
    /// single `set`. The underlying store has no partial-update primitive,
    /// so every save is a read-modify-write of the entire map.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    pub async fn save_state(&self, state_key: &str, state: &ChecklistState) -> Result<()> {
        let mut store = self.read_store().await?;

        let mut stamped = state.clone();
        stamped.last_updated = Utc::now();
        store.insert(state_key.to_string(), stamped);

        if let Some(retention) = self.config.retention {
            let removed = prune_stale(&mut store, state_key, retention);
            if removed > 0 {
                debug!(removed, "pruned stale checklist records");
            }
        }

        self.write_store(&store).await
    }

    /// Reset a context's state to defaults and persist the result.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    pub async fn reset_state(
        &self,
        state_key: &str,
        template: &Template,
        template_url: &str,
    ) -> Result<ChecklistState> {
        let mut state = self.load_state(state_key, template, template_url).await?;
        state.reset(template);
        self.save_state(state_key, &state).await?;
        Ok(state)
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Read the options record, falling back to compiled-in defaults when the
    /// record is absent, unreadable, or the store itself fails. Options are
    /// always available; they never block checklist loading.
    pub async fn get_options(&self) -> EngineOptions {
        let value = match self.storage.get(OPTIONS_STORAGE_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return EngineOptions::default(),
            Err(err) => {
                warn!(error = %err, "options read failed, using defaults");
                return EngineOptions::default();
            }
        };
        match serde_json::from_value(value) {
            Ok(options) => options,
            Err(err) => {
                warn!(error = %err, "options record is malformed, using defaults");
                EngineOptions::default()
            }
        }
    }

    /// Persist the full options record.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    pub async fn save_options(&self, options: &EngineOptions) -> Result<()> {
        let value = serde_json::to_value(options)
            .map_err(|e| EngineError::storage("failed to encode options").with_details(e.to_string()))?;
        self.storage.set(OPTIONS_STORAGE_KEY, value).await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Wipe everything: all per-context state and the options record.
    ///
    /// # Errors
    ///
    /// Returns a `storage` error if the underlying store fails.
    pub async fn clear(&self) -> Result<()> {
        self.storage.clear().await
    }

    async fn read_store(&self) -> Result<StorageState> {
        match self.storage.get(STATE_STORAGE_KEY).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                EngineError::storage("stored checklist state is malformed")
                    .with_details(e.to_string())
            }),
            None => Ok(StorageState::new()),
        }
    }

    async fn write_store(&self, store: &StorageState) -> Result<()> {
        let value = serde_json::to_value(store)
            .map_err(|e| EngineError::storage("failed to encode state").with_details(e.to_string()))?;
        self.storage.set(STATE_STORAGE_KEY, value).await
    }
}
