//! Loading page records and indexing them by slug.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use url::Url;

use docrender_shared::{DocRenderError, NavLink, PageRecord, Result};

/// Read every `*.json` file under `dir` (recursively) as a page record.
///
/// Files are read in sorted path order so repeated runs see the same order.
pub fn load_pages(dir: &Path) -> Result<Vec<PageRecord>> {
    load_pages_except(dir, None)
}

/// Like [`load_pages`], but never descends into `skip_dir`.
///
/// Used to keep a render output directory nested under `dir` from being read
/// back as page records.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_pages_except(dir: &Path, skip_dir: Option<&Path>) -> Result<Vec<PageRecord>> {
    let skip = skip_dir.and_then(|p| p.canonicalize().ok());
    let mut files = Vec::new();
    collect_json_files(dir, skip.as_deref(), &mut files)?;
    files.sort();

    let pages = files
        .iter()
        .map(|path| load_page(path))
        .collect::<Result<Vec<_>>>()?;

    info!(pages = pages.len(), "loaded page records");
    Ok(pages)
}

/// Read a single page record.
pub fn load_page(path: &Path) -> Result<PageRecord> {
    let raw = std::fs::read_to_string(path).map_err(|e| DocRenderError::io(path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| DocRenderError::parse(format!("{}: {e}", path.display())))
}

fn collect_json_files(dir: &Path, skip: Option<&Path>, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| DocRenderError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| DocRenderError::io(dir, e))?.path();
        if path.is_dir() {
            if skip.is_some_and(|skip| path.canonicalize().is_ok_and(|p| p == skip)) {
                debug!(dir = %path.display(), "skipping output directory");
                continue;
            }
            collect_json_files(&path, skip, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PageIndex
// ---------------------------------------------------------------------------

/// A navigation link whose target is not in the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    /// Page carrying the link.
    pub from: String,
    pub link: NavLink,
}

/// Pages of one site, with unique slugs and ids.
#[derive(Debug, Clone)]
pub struct PageIndex {
    pages: Vec<PageRecord>,
    by_slug: HashMap<String, usize>,
    by_permalink: HashMap<String, usize>,
}

impl PageIndex {
    /// Index `pages`, rejecting duplicate slugs, ids or permalinks, and malformed edit URLs.
    pub fn new(pages: Vec<PageRecord>) -> Result<Self> {
        let mut by_slug = HashMap::with_capacity(pages.len());
        let mut by_permalink = HashMap::with_capacity(pages.len());
        let mut ids: HashMap<&str, usize> = HashMap::with_capacity(pages.len());

        for (i, page) in pages.iter().enumerate() {
            if let Some(prev) = by_slug.insert(page.slug.clone(), i) {
                return Err(DocRenderError::validation(format!(
                    "duplicate slug {} (pages {} and {})",
                    page.slug, pages[prev].id, page.id
                )));
            }
            if ids.insert(page.id.as_str(), i).is_some() {
                return Err(DocRenderError::validation(format!(
                    "duplicate page id {}",
                    page.id
                )));
            }
            if let Some(edit_url) = &page.edit_url {
                Url::parse(edit_url).map_err(|e| {
                    DocRenderError::validation(format!(
                        "page {} has invalid editUrl {edit_url}: {e}",
                        page.id
                    ))
                })?;
            }
            if let Some(prev) = by_permalink.insert(page.permalink.clone(), i) {
                return Err(DocRenderError::validation(format!(
                    "duplicate permalink {} (pages {} and {})",
                    page.permalink, pages[prev].id, page.id
                )));
            }
        }

        debug!(pages = pages.len(), "page index built");
        Ok(Self {
            pages,
            by_slug,
            by_permalink,
        })
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&PageRecord> {
        self.by_slug.get(slug).map(|&i| &self.pages[i])
    }

    pub fn by_permalink(&self, permalink: &str) -> Option<&PageRecord> {
        self.by_permalink.get(permalink).map(|&i| &self.pages[i])
    }

    /// Previous/next links pointing outside the index.
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let dangling: Vec<DanglingLink> = self
            .pages
            .iter()
            .flat_map(|page| {
                page.nav_links()
                    .filter(|link| !self.by_permalink.contains_key(&link.permalink))
                    .map(|link| DanglingLink {
                        from: page.id.clone(),
                        link: link.clone(),
                    })
            })
            .collect();

        for d in &dangling {
            warn!(page = %d.from, target = %d.link.permalink, "navigation link has no target page");
        }
        dangling
    }
}

/// Map a permalink to a relative output directory: `/docs/a/b` → `docs/a/b`.
pub fn permalink_to_path(permalink: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for segment in permalink.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(DocRenderError::validation(format!(
                "permalink {permalink} escapes the output directory"
            )));
        }
        path.push(segment);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_page(id: &str, slug: &str) -> PageRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "slug": slug,
            "permalink": format!("/docs{slug}"),
        }))
        .expect("page")
    }

    #[test]
    fn index_lookups() {
        let index = PageIndex::new(vec![make_page("intro", "/intro"), make_page("faq", "/faq")])
            .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.by_slug("/faq").unwrap().id, "faq");
        assert_eq!(index.by_permalink("/docs/intro").unwrap().id, "intro");
        assert!(index.by_slug("/missing").is_none());
    }

    #[test]
    fn duplicate_slug_rejected() {
        let err = PageIndex::new(vec![make_page("a", "/same"), make_page("b", "/same")])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate slug /same"));
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = PageIndex::new(vec![make_page("a", "/one"), make_page("a", "/two")])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate page id a"));
    }

    #[test]
    fn duplicate_permalink_rejected() {
        let a = make_page("a", "/a");
        let mut b = make_page("b", "/b");
        b.permalink = a.permalink.clone();

        let err = PageIndex::new(vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("duplicate permalink /docs/a"));
    }

    #[test]
    fn invalid_edit_url_rejected() {
        let mut page = make_page("a", "/a");
        page.edit_url = Some("not a url".into());
        assert!(PageIndex::new(vec![page]).is_err());
    }

    #[test]
    fn dangling_links_reported() {
        let mut intro = make_page("intro", "/intro");
        intro.next = Some(NavLink {
            title: "FAQ".into(),
            permalink: "/docs/faq".into(),
        });
        intro.previous = Some(NavLink {
            title: "Gone".into(),
            permalink: "/docs/gone".into(),
        });
        let index = PageIndex::new(vec![intro, make_page("faq", "/faq")]).unwrap();

        let dangling = index.dangling_links();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].from, "intro");
        assert_eq!(dangling[0].link.permalink, "/docs/gone");
    }

    #[test]
    fn permalink_paths() {
        assert_eq!(
            permalink_to_path("/docs/datahub-web-react").unwrap(),
            PathBuf::from("docs").join("datahub-web-react")
        );
        assert_eq!(permalink_to_path("/").unwrap(), PathBuf::new());
        assert!(permalink_to_path("/docs/../etc").is_err());
    }

    #[test]
    fn load_pages_skips_output_dir() {
        let root = std::env::temp_dir().join(format!("docrender-site-test-{}", uuid::Uuid::now_v7()));
        let out = root.join("build");
        std::fs::create_dir_all(&out).unwrap();
        let page = serde_json::to_string(&make_page("intro", "/intro")).unwrap();
        std::fs::write(root.join("intro.json"), page).unwrap();
        std::fs::write(out.join("manifest.json"), r#"{"pages": []}"#).unwrap();

        assert!(load_pages(&root).is_err());
        let pages = load_pages_except(&root, Some(out.as_path())).expect("load pages");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, "intro");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn load_pages_reads_fixture_dir() {
        let pages = load_pages(Path::new("../../../fixtures/json")).expect("load fixtures");
        assert!(!pages.is_empty());
        assert!(pages.iter().any(|p| p.title == "Business Glossary"));
        PageIndex::new(pages).expect("fixture pages index cleanly");
    }
}
