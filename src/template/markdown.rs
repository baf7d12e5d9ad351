//! Line-based parsing of Markdown checklist templates.
//!
//! Recognized structure:
//!
//! - `# Heading` — template title (first one wins)
//! - `## Heading` — starts a new section
//! - `- [ ] text` / `- [x] text` / `- [X] text` — an item in the current
//!   section; items appearing before any heading land in an implicit
//!   "General" section
//!
//! Checkmark state in the source text is deliberately ignored: checked flags
//! live only in the persisted per-context state, never in the template.

use super::{Item, Section, Template};
use crate::error::Result;

/// Name of the section that collects items appearing before any `## ` heading.
pub const IMPLICIT_SECTION: &str = "General";

const TASK_MARKERS: [&str; 3] = ["- [ ] ", "- [x] ", "- [X] "];

/// Parse Markdown template text into a validated [`Template`].
///
/// # Errors
///
/// Returns a `template`-category error when the text yields no sections at
/// all (for example, arbitrary prose with no task-list lines).
pub fn parse_markdown(text: &str) -> Result<Template> {
    let mut title: Option<String> = None;
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(heading) = line.strip_prefix("## ") {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section::new(heading.trim(), Vec::new()));
        } else if let Some(heading) = line.strip_prefix("# ") {
            if title.is_none() {
                title = Some(heading.trim().to_string());
            }
        } else if let Some(text) = task_item_text(line) {
            let section = current.get_or_insert_with(|| Section::new(IMPLICIT_SECTION, Vec::new()));
            section.items.push(parse_item(text));
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    let template = Template { title, sections };
    template.validate()?;
    Ok(template)
}

fn task_item_text(line: &str) -> Option<&str> {
    TASK_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// An item whose whole text is a Markdown link keeps the link target as its
/// documentation URL.
fn parse_item(text: &str) -> Item {
    if let Some(rest) = text.strip_prefix('[') {
        if let Some((name, target)) = rest.split_once("](") {
            if let Some(url) = target.strip_suffix(')') {
                if !name.is_empty() && !url.is_empty() && !target[..target.len() - 1].contains(')')
                {
                    return Item::with_url(name, url);
                }
            }
        }
    }
    Item::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_basic() {
        let text = "# Title\n## Sec\n- [ ] Item A\n- [x] Item B\n";
        let template = parse_markdown(text).expect("parse");
        assert_eq!(template.title.as_deref(), Some("Title"));
        assert_eq!(template.sections.len(), 1);
        assert_eq!(template.sections[0].name, "Sec");
        let names: Vec<&str> = template.sections[0]
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, ["Item A", "Item B"]);
    }

    #[test]
    fn test_source_checkmarks_do_not_matter() {
        // `- [x]` and `- [ ]` produce identical items; state is persisted
        // separately, never read from the template text.
        let checked = parse_markdown("## S\n- [x] Thing\n").expect("parse");
        let unchecked = parse_markdown("## S\n- [ ] Thing\n").expect("parse");
        assert_eq!(checked, unchecked);
    }

    #[test]
    fn test_items_before_heading_go_to_general() {
        let text = "- [ ] Early item\n## Later\n- [ ] Late item\n";
        let template = parse_markdown(text).expect("parse");
        assert_eq!(template.sections[0].name, IMPLICIT_SECTION);
        assert_eq!(template.sections[0].items[0].name, "Early item");
        assert_eq!(template.sections[1].name, "Later");
    }

    #[test]
    fn test_uppercase_checkmark() {
        let template = parse_markdown("## S\n- [X] Done loudly\n").expect("parse");
        assert_eq!(template.sections[0].items[0].name, "Done loudly");
    }

    #[test]
    fn test_plain_prose_is_rejected() {
        assert!(parse_markdown("just some text\nwith no checklist\n").is_err());
        assert!(parse_markdown("").is_err());
    }

    #[test]
    fn test_non_task_lines_are_skipped() {
        let text = "## S\nSome prose here.\n- not a task\n- [ ] Real item\n";
        let template = parse_markdown(text).expect("parse");
        assert_eq!(template.sections[0].items.len(), 1);
    }

    #[test]
    fn test_link_item_keeps_url() {
        let template =
            parse_markdown("## S\n- [ ] [Style guide](https://example.test/style)\n").expect("parse");
        let item = &template.sections[0].items[0];
        assert_eq!(item.name, "Style guide");
        assert_eq!(item.url.as_deref(), Some("https://example.test/style"));
    }

    #[test]
    fn test_multiple_sections_preserve_order() {
        let text = "## Zeta\n- [ ] z\n## Alpha\n- [ ] a\n";
        let template = parse_markdown(text).expect("parse");
        assert_eq!(template.sections[0].name, "Zeta");
        assert_eq!(template.sections[1].name, "Alpha");
    }

    #[test]
    fn test_first_title_wins() {
        let text = "# One\n# Two\n## S\n- [ ] x\n";
        let template = parse_markdown(text).expect("parse");
        assert_eq!(template.title.as_deref(), Some("One"));
    }
}
