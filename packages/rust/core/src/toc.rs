//! TOC (Table of Contents) extraction.
//!
//! Collects headings from a compiled content tree into the nested
//! `TocEntry` shape stored on page records, and assigns anchor ids to
//! headings that lack one.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use docrender_shared::{ContentNode, PageRecord, TocConfig, TocEntry};

/// Build a nested TOC from the headings in `content`.
///
/// Headings with a level in `min_level..=max_level` are taken in document
/// order. Each nests under the closest preceding heading of a lower level.
/// Headings without an `id` get one from [`AnchorSlugger`].
#[instrument(skip(content))]
pub fn extract_toc(content: &ContentNode, min_level: u8, max_level: u8) -> Vec<TocEntry> {
    let with_ids = with_heading_ids(content);
    let mut flat = Vec::new();
    collect_headings(&with_ids, min_level, max_level, &mut flat);

    let count = flat.len();
    let toc = nest_by_level(flat);
    debug!(headings = count, top_level = toc.len(), "TOC extracted");
    toc
}

/// The page's stored TOC, or one extracted from its content when empty.
pub fn toc_for_page(page: &PageRecord, config: &TocConfig) -> Vec<TocEntry> {
    stored_or_extracted(&page.toc, page.content.as_ref(), config)
}

/// `stored` when non-empty, otherwise the TOC extracted from `content`.
pub fn stored_or_extracted(
    stored: &[TocEntry],
    content: Option<&ContentNode>,
    config: &TocConfig,
) -> Vec<TocEntry> {
    if !stored.is_empty() {
        return stored.to_vec();
    }
    match content {
        Some(content) => {
            extract_toc(content, config.min_heading_level, config.max_heading_level)
        }
        None => Vec::new(),
    }
}

/// A copy of `content` where every heading has an `id` prop.
///
/// Existing ids are kept and reserved so generated ones never collide.
pub fn with_heading_ids(content: &ContentNode) -> ContentNode {
    let mut slugger = AnchorSlugger::default();
    reserve_ids(content, &mut slugger);
    let mut out = content.clone();
    assign_ids(&mut out, &mut slugger);
    out
}

// ---------------------------------------------------------------------------
// Anchor slugs
// ---------------------------------------------------------------------------

/// Turn heading text into an anchor id: `"Config details"` → `config-details`.
pub fn slugify_anchor(text: &str) -> String {
    static STRIP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]").expect("valid regex"));
    static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = text.trim().to_lowercase();
    let stripped = STRIP_RE.replace_all(&lowered, "");
    SPACE_RE.replace_all(&stripped, "-").into_owned()
}

/// Generates unique anchor ids within one page.
#[derive(Debug, Default)]
pub struct AnchorSlugger {
    seen: HashMap<String, usize>,
}

impl AnchorSlugger {
    /// Slug for `text`, suffixed `-1`, `-2`, ... when already taken.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify_anchor(text);
        let base = if base.is_empty() { "heading".to_string() } else { base };

        let Some(mut n) = self.seen.get(&base).copied() else {
            self.seen.insert(base.clone(), 0);
            return base;
        };

        // `seen[base]` is the last suffix handed out for `base`
        let candidate = loop {
            n += 1;
            let candidate = format!("{base}-{n}");
            if !self.seen.contains_key(&candidate) {
                break candidate;
            }
        };
        self.seen.insert(base, n);
        self.seen.insert(candidate.clone(), 0);
        candidate
    }

    fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reserve_ids(node: &ContentNode, slugger: &mut AnchorSlugger) {
    match node {
        ContentNode::Text { .. } => {}
        ContentNode::Element(el) => {
            if el.heading_level().is_some() {
                if let Some(id) = el.id() {
                    slugger.reserve(id);
                }
            }
            el.children.iter().for_each(|c| reserve_ids(c, slugger));
        }
        ContentNode::Provider { children, .. } => {
            children.iter().for_each(|c| reserve_ids(c, slugger));
        }
    }
}

fn assign_ids(node: &mut ContentNode, slugger: &mut AnchorSlugger) {
    match node {
        ContentNode::Text { .. } => {}
        ContentNode::Element(el) => {
            if el.heading_level().is_some() && el.id().is_none() {
                let id = slugger.slug(&el.text_content());
                el.props.insert("id".into(), id.into());
            }
            el.children.iter_mut().for_each(|c| assign_ids(c, slugger));
        }
        ContentNode::Provider { children, .. } => {
            children.iter_mut().for_each(|c| assign_ids(c, slugger));
        }
    }
}

fn collect_headings(node: &ContentNode, min_level: u8, max_level: u8, out: &mut Vec<TocEntry>) {
    match node {
        ContentNode::Text { .. } => {}
        ContentNode::Element(el) => match el.heading_level() {
            Some(level) if (min_level..=max_level).contains(&level) => {
                out.push(TocEntry {
                    value: node.text_content().trim().to_string(),
                    id: el.id().unwrap_or_default().to_string(),
                    level,
                    children: vec![],
                });
            }
            // headings never contain headings
            Some(_) => {}
            None => el
                .children
                .iter()
                .for_each(|c| collect_headings(c, min_level, max_level, out)),
        },
        ContentNode::Provider { children, .. } => children
            .iter()
            .for_each(|c| collect_headings(c, min_level, max_level, out)),
    }
}

/// Nest a flat, document-ordered heading list by level.
fn nest_by_level(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut roots: Vec<TocEntry> = Vec::new();
    let mut open: Vec<TocEntry> = Vec::new();

    for entry in flat {
        while open.last().is_some_and(|top| top.level >= entry.level) {
            if let Some(done) = open.pop() {
                attach(&mut open, &mut roots, done);
            }
        }
        open.push(entry);
    }
    while let Some(done) = open.pop() {
        attach(&mut open, &mut roots, done);
    }

    roots
}

fn attach(open: &mut [TocEntry], roots: &mut Vec<TocEntry>, done: TocEntry) {
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use docrender_shared::ContentElement;

    fn heading(tag: &str, text: &str) -> ContentElement {
        ContentElement::new(tag).text(text)
    }

    fn glossary_page() -> ContentNode {
        ContentElement::new("wrapper")
            .child(heading("h1", "Business Glossary").prop("id", "business-glossary"))
            .child(heading("h2", "Setup"))
            .child(ContentElement::new("p").text("Install the plugin."))
            .child(heading("h2", "Config details"))
            .child(heading("h3", "Business Glossary File Format"))
            .child(heading("h2", "Questions"))
            .into()
    }

    #[test]
    fn extract_nests_by_level() {
        let toc = extract_toc(&glossary_page(), 2, 4);

        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0].value, "Setup");
        assert_eq!(toc[0].id, "setup");
        assert_eq!(toc[1].id, "config-details");
        assert_eq!(toc[1].children.len(), 1);
        assert_eq!(toc[1].children[0].id, "business-glossary-file-format");
        assert_eq!(toc[1].children[0].level, 3);
        assert!(toc[2].children.is_empty());
    }

    #[test]
    fn extract_respects_level_range() {
        let toc = extract_toc(&glossary_page(), 2, 2);
        assert_eq!(toc.len(), 3);
        assert!(toc.iter().all(|e| e.children.is_empty()));
    }

    #[test]
    fn skipped_levels_still_nest() {
        let content: ContentNode = ContentElement::new("wrapper")
            .child(heading("h2", "Theming"))
            .child(heading("h4", "Editing a theme"))
            .child(heading("h3", "Selecting"))
            .into();

        let toc = extract_toc(&content, 2, 4);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].children.len(), 2);
        assert_eq!(toc[0].children[0].level, 4);
        assert_eq!(toc[0].children[1].level, 3);
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let content: ContentNode = ContentElement::new("h2")
            .text("Using ")
            .child(ContentElement::new("inlineCode").text("datahub"))
            .into();

        let toc = extract_toc(&content, 2, 3);
        assert_eq!(toc[0].value, "Using datahub");
        assert_eq!(toc[0].id, "using-datahub");
    }

    #[test]
    fn slugify_anchor_handles_common_patterns() {
        assert_eq!(slugify_anchor("Quickstart recipe"), "quickstart-recipe");
        assert_eq!(slugify_anchor("  What's new?  "), "whats-new");
        assert_eq!(slugify_anchor("CI / CD"), "ci-cd");
        assert_eq!(slugify_anchor("snake_case ok"), "snake_case-ok");
    }

    #[test]
    fn slugger_deduplicates() {
        let mut slugger = AnchorSlugger::default();
        assert_eq!(slugger.slug("Example"), "example");
        assert_eq!(slugger.slug("Example"), "example-1");
        assert_eq!(slugger.slug("Example"), "example-2");
        assert_eq!(slugger.slug("!!!"), "heading");
    }

    #[test]
    fn slugger_skips_suffixes_already_taken() {
        let mut slugger = AnchorSlugger::default();
        assert_eq!(slugger.slug("Example 1"), "example-1");
        assert_eq!(slugger.slug("Example"), "example");
        assert_eq!(slugger.slug("Example"), "example-2");
        assert_eq!(slugger.slug("Example"), "example-3");
    }

    #[test]
    fn reserved_suffix_is_skipped() {
        let content: ContentNode = ContentElement::new("wrapper")
            .child(heading("h2", "Intro").prop("id", "setup-1"))
            .child(heading("h2", "Setup"))
            .child(heading("h2", "Setup"))
            .into();

        let toc = extract_toc(&content, 2, 3);
        let ids: Vec<&str> = toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["setup-1", "setup", "setup-2"]);
    }

    #[test]
    fn generated_ids_avoid_existing_ones() {
        let content: ContentNode = ContentElement::new("wrapper")
            .child(heading("h2", "Setup"))
            .child(heading("h2", "Other").prop("id", "setup"))
            .into();

        let with_ids = with_heading_ids(&content);
        let toc = extract_toc(&with_ids, 2, 3);
        assert_eq!(toc[0].id, "setup-1");
        assert_eq!(toc[1].id, "setup");
    }

    #[test]
    fn stored_toc_wins() {
        let page: PageRecord = serde_json::from_value(serde_json::json!({
            "id": "intro",
            "title": "Intro",
            "slug": "/intro",
            "permalink": "/docs/intro",
            "toc": [{ "value": "Stored", "id": "stored", "level": 2, "children": [] }],
            "content": { "type": "element", "tag": "h2", "children": [{ "type": "text", "value": "Live" }] }
        }))
        .expect("page");

        let toc = toc_for_page(&page, &TocConfig::default());
        assert_eq!(toc[0].value, "Stored");

        let mut fresh = page.clone();
        fresh.toc.clear();
        let toc = toc_for_page(&fresh, &TocConfig::default());
        assert_eq!(toc[0].value, "Live");
    }
}
