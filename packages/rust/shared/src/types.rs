//! Page records as produced by the upstream docs build.

use serde::{Deserialize, Serialize};

use crate::content::ContentNode;

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// A single heading entry in a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text.
    pub value: String,
    /// Anchor id within the page.
    pub id: String,
    /// Heading level (2 for `h2`, ...). Older records omit it.
    #[serde(default)]
    pub level: u8,
    /// Nested sub-headings.
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Total entries in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TocEntry::count).sum::<usize>()
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// A previous/next link to a sibling page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub permalink: String,
}

// ---------------------------------------------------------------------------
// FrontMatter
// ---------------------------------------------------------------------------

/// Frontmatter as authored at the top of the source Markdown file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_edit_url: Option<String>,
    /// Any other keys, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// One documentation page. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Page identifier, e.g. `datahub-web-react/README`.
    pub id: String,
    /// Identifier without the version prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unversioned_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Route slug, unique per site.
    pub slug: String,
    /// Fully-qualified route, e.g. `/docs/datahub-web-react`.
    pub permalink: String,
    /// Originating source file, e.g. `@site/genDocs/.../README.md`.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_dir_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub front_matter: FrontMatter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    /// Stored table of contents.
    #[serde(default)]
    pub toc: Vec<TocEntry>,
    /// Compiled content tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentNode>,
}

impl PageRecord {
    /// Label used in the sidebar: frontmatter `sidebar_label`, else the title.
    pub fn sidebar_label(&self) -> &str {
        self.front_matter
            .sidebar_label
            .as_deref()
            .unwrap_or(&self.title)
    }

    /// Navigation links present on this page.
    pub fn nav_links(&self) -> impl Iterator<Item = &NavLink> {
        self.previous.iter().chain(self.next.iter())
    }
}
