//! Deterministic identifier derivation for sections and items.
//!
//! Keys are pure functions of a display name: lower-cased, with every maximal
//! run of characters outside `[a-z0-9]` collapsed to a single `-`. They index
//! the persisted state maps and double as DOM-addressable anchors for callers
//! that render the checklist.

/// Derive the stable key for a section display name.
#[must_use]
pub fn section_key(name: &str) -> String {
    slug(name)
}

/// Derive the stable key for an item display name.
///
/// Depends only on the name, never on the item's position or URL.
#[must_use]
pub fn item_key(name: &str) -> String {
    slug(name)
}

/// Derive the key under which an item's state is stored.
///
/// Scoped by section so that identically-named items in different sections
/// keep independent state.
#[must_use]
pub fn scoped_item_key(section_name: &str, item_name: &str) -> String {
    format!("{}/{}", section_key(section_name), item_key(item_name))
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_basic() {
        assert_eq!(item_key("Check auth"), "check-auth");
    }

    #[test]
    fn test_key_is_idempotent() {
        let first = item_key("Edge cases handled?");
        let second = item_key("Edge cases handled?");
        assert_eq!(first, second);
    }

    #[test]
    fn test_symbol_runs_collapse_to_one_separator() {
        assert_eq!(item_key("foo -- bar!!baz"), "foo-bar-baz");
    }

    #[test]
    fn test_leading_and_trailing_symbols_are_trimmed() {
        assert_eq!(section_key("  Code Quality  "), "code-quality");
        assert_eq!(item_key("(optional) docs"), "optional-docs");
    }

    #[test]
    fn test_case_is_folded() {
        assert_eq!(section_key("SECURITY"), "security");
        assert_eq!(section_key("Security"), section_key("security"));
    }

    #[test]
    fn test_digits_are_kept() {
        assert_eq!(item_key("HTTP 2 support"), "http-2-support");
    }

    #[test]
    fn test_scoped_key_separates_sections() {
        let a = scoped_item_key("Functionality", "Docs updated");
        let b = scoped_item_key("Code Quality", "Docs updated");
        assert_ne!(a, b);
        assert_eq!(a, "functionality/docs-updated");
    }
}
