//! Per-context checklist state and reconciliation against a template.
//!
//! One [`ChecklistState`] exists per review context (state key such as
//! `owner/repo#123`); all of them live in a single persisted [`StorageState`]
//! map. Reconciliation is deliberately conservative: entries whose item no
//! longer exists in the template are kept, never pruned, so a template edit
//! cannot destroy a reviewer's recorded work.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{scoped_item_key, section_key};
use crate::template::Template;

/// Checked / needs-attention flags for one checklist item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemState {
    /// Whether the reviewer has checked the item off.
    pub checked: bool,
    /// Whether the reviewer flagged the item for attention.
    pub needs_attention: bool,
}

/// Persisted checklist state for one review context.
///
/// Item entries are keyed by the scoped item key
/// (`<section-key>/<item-key>`); section expansion flags by the section key.
/// Entries are created lazily with defaults the first time a key is touched
/// and survive the removal of their template counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistState {
    /// Item flags by scoped item key.
    pub items: BTreeMap<String, ItemState>,
    /// Section expansion by section key; absent means expanded.
    pub sections: BTreeMap<String, bool>,
    /// Stamped on every save.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    /// The template source this state was last reconciled against.
    pub template_url: String,
}

impl Default for ChecklistState {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            sections: BTreeMap::new(),
            last_updated: Utc::now(),
            template_url: String::new(),
        }
    }
}

impl ChecklistState {
    /// Fresh state for a template: every item unchecked and unflagged, every
    /// section expanded.
    #[must_use]
    pub fn for_template(template: &Template, template_url: &str) -> Self {
        let mut state = Self {
            template_url: template_url.to_string(),
            ..Self::default()
        };
        state.ensure_defaults(template);
        state
    }

    /// The state for an item, defaulting when the key was never touched.
    #[must_use]
    pub fn item(&self, scoped_key: &str) -> ItemState {
        self.items.get(scoped_key).copied().unwrap_or_default()
    }

    /// Whether a section is expanded; absent keys default to expanded.
    #[must_use]
    pub fn section_expanded(&self, section_key: &str) -> bool {
        self.sections.get(section_key).copied().unwrap_or(true)
    }

    /// Set the checked flag, materializing a default entry if needed.
    pub fn set_checked(&mut self, scoped_key: &str, checked: bool) {
        self.items.entry(scoped_key.to_string()).or_default().checked = checked;
    }

    /// Set the needs-attention flag, materializing a default entry if needed.
    pub fn set_attention(&mut self, scoped_key: &str, needs_attention: bool) {
        self.items
            .entry(scoped_key.to_string())
            .or_default()
            .needs_attention = needs_attention;
    }

    /// Set a section's expansion flag.
    pub fn set_section_expanded(&mut self, section_key: &str, expanded: bool) {
        self.sections.insert(section_key.to_string(), expanded);
    }

    /// Reinitialize every known item and section to defaults.
    ///
    /// "Known" covers both existing entries (orphans included) and the
    /// current template's keys. The record itself stays in storage until the
    /// caller saves it.
    pub fn reset(&mut self, template: &Template) {
        for item_state in self.items.values_mut() {
            *item_state = ItemState::default();
        }
        for expanded in self.sections.values_mut() {
            *expanded = true;
        }
        self.ensure_defaults(template);
    }

    /// Make sure every template key has an entry, without touching entries
    /// that already exist.
    fn ensure_defaults(&mut self, template: &Template) {
        for section in &template.sections {
            self.sections.entry(section_key(&section.name)).or_insert(true);
            for item in &section.items {
                self.items
                    .entry(scoped_item_key(&section.name, &item.name))
                    .or_default();
            }
        }
    }
}

/// The full persisted record: one [`ChecklistState`] per state key.
pub type StorageState = BTreeMap<String, ChecklistState>;

/// An item surfaced by the needs-attention projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionEntry {
    /// Display name of the containing section.
    pub section: String,
    /// Display name of the flagged item.
    pub item: String,
    /// Scoped key of the flagged item.
    pub key: String,
}

/// Items flagged for attention that exist in the current template.
///
/// A pure projection computed on demand and never persisted; orphaned flags
/// stay in the state map but are not surfaced here.
#[must_use]
pub fn needs_attention(state: &ChecklistState, template: &Template) -> Vec<AttentionEntry> {
    let mut entries = Vec::new();
    for section in &template.sections {
        for item in &section.items {
            let key = scoped_item_key(&section.name, &item.name);
            if state.item(&key).needs_attention {
                entries.push(AttentionEntry {
                    section: section.name.clone(),
                    item: item.name.clone(),
                    key,
                });
            }
        }
    }
    entries
}

/// Drop records whose `last_updated` is older than the retention window.
///
/// The record addressed by `keep_key` is never pruned, whatever its age.
/// Returns the number of records removed.
pub fn prune_stale(store: &mut StorageState, keep_key: &str, max_age: Duration) -> usize {
    let cutoff = Utc::now() - max_age;
    let before = store.len();
    store.retain(|key, state| key == keep_key || state.last_updated >= cutoff);
    before - store.len()
}
