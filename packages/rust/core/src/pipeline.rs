//! End-to-end `render` pipeline: page records → resolved output → HTML site.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use docrender_mdx::{ComponentScope, Components, OutputNode, render, with_heading_anchors};
use docrender_shared::{AppConfig, DocRenderError, PageRecord, Result, TocConfig, TocEntry};

use crate::layout::{document_html, page_document};
use crate::site::{PageIndex, permalink_to_path};
use crate::toc::{stored_or_extracted, with_heading_ids};

/// Configuration for the `render_site` pipeline.
#[derive(Debug, Clone)]
pub struct RenderSiteConfig {
    /// Output root directory.
    pub out_dir: PathBuf,
    /// Pages rendered in parallel.
    pub concurrency: usize,
    /// TOC extraction for pages without a stored TOC.
    pub toc: TocConfig,
    /// Tool version string written to the manifest.
    pub tool_version: String,
}

impl From<&AppConfig> for RenderSiteConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            out_dir: PathBuf::from(&config.defaults.out_dir),
            concurrency: config.defaults.concurrency as usize,
            toc: config.toc.clone(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the ambient component scope described by `config`.
pub fn ambient_scope(config: &AppConfig) -> Result<ComponentScope> {
    let mut components = Components::from_aliases(&config.components)?;
    if config.defaults.heading_anchors {
        components = with_heading_anchors(components);
    }
    debug!(bindings = components.len(), "ambient components ready");
    Ok(ComponentScope::new(components))
}

// ---------------------------------------------------------------------------
// Single page
// ---------------------------------------------------------------------------

/// One page rendered to a complete HTML document.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub id: String,
    pub permalink: String,
    pub title: String,
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Render one page. Fails only on an unresolved tag or a component error.
#[instrument(skip_all, fields(page = %page.id))]
pub fn render_page(
    page: &PageRecord,
    ambient: &ComponentScope,
    toc_config: &TocConfig,
) -> Result<RenderedPage> {
    let content = page.content.as_ref().map(with_heading_ids);

    let body = match &content {
        Some(content) => render(content, ambient, None)?,
        None => OutputNode::fragment(vec![]),
    };

    let toc = stored_or_extracted(&page.toc, content.as_ref(), toc_config);

    let html = document_html(&page_document(page, body, &toc));
    debug!(bytes = html.len(), "page rendered");

    Ok(RenderedPage {
        id: page.id.clone(),
        permalink: page.permalink.clone(),
        title: page.title.clone(),
        html,
        toc,
    })
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// A page written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub permalink: String,
    pub title: String,
    /// Output file, relative to the output root.
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// The `manifest.json` written at the output root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteManifest {
    pub build_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub pages: Vec<ManifestEntry>,
}

/// A page that could not be rendered.
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub id: String,
    pub permalink: String,
    pub error: String,
}

/// Result of the `render_site` pipeline.
#[derive(Debug)]
pub struct SiteReport {
    pub out_dir: PathBuf,
    pub manifest: SiteManifest,
    pub failed: Vec<PageFailure>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a page has been rendered and written.
    fn page_rendered(&self, permalink: &str, current: usize, total: usize);
    /// Called when a page fails to render.
    fn page_failed(&self, permalink: &str, error: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &SiteReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn page_rendered(&self, _permalink: &str, _current: usize, _total: usize) {}
    fn page_failed(&self, _permalink: &str, _error: &str) {}
    fn done(&self, _report: &SiteReport) {}
}

/// Render every page of `index` into `config.out_dir`.
///
/// Pages render on blocking workers, at most `config.concurrency` at a time,
/// all sharing `ambient`. A page that fails is listed in
/// [`SiteReport::failed`] and does not stop the others.
#[instrument(skip_all, fields(pages = index.len(), out_dir = %config.out_dir.display()))]
pub async fn render_site(
    index: Arc<PageIndex>,
    ambient: ComponentScope,
    config: &RenderSiteConfig,
    progress: &dyn ProgressReporter,
) -> Result<SiteReport> {
    let start = Instant::now();
    let total = index.len();

    std::fs::create_dir_all(&config.out_dir)
        .map_err(|e| DocRenderError::io(&config.out_dir, e))?;

    let dangling = index.dangling_links().len();
    info!(total, dangling, concurrency = config.concurrency, "rendering site");

    let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_pages = HashMap::with_capacity(total);

    for i in 0..total {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| DocRenderError::pipeline(format!("render pool closed: {e}")))?;
        let index = Arc::clone(&index);
        let ambient = ambient.clone();
        let out_dir = config.out_dir.clone();
        let toc_config = config.toc.clone();

        let handle = tasks.spawn_blocking(move || {
            let _permit = permit;
            let page = &index.pages()[i];
            render_page(page, &ambient, &toc_config)
                .and_then(|rendered| write_page(&out_dir, rendered))
        });
        task_pages.insert(handle.id(), i);
    }

    let mut entries = Vec::with_capacity(total);
    let mut tocs = BTreeMap::new();
    let mut failed = Vec::new();

    while let Some(joined) = tasks.join_next_with_id().await {
        let (task_id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(e) => (e.id(), Err(DocRenderError::pipeline(format!("render task failed: {e}")))),
        };
        let Some(page) = task_pages.get(&task_id).map(|&i| &index.pages()[i]) else {
            return Err(DocRenderError::pipeline("finished task has no page"));
        };

        match outcome {
            Ok((entry, toc)) => {
                progress.page_rendered(&entry.permalink, entries.len() + 1, total);
                tocs.insert(entry.permalink.clone(), toc);
                entries.push(entry);
            }
            Err(e) => {
                warn!(page = %page.id, error = %e, "page failed to render");
                progress.page_failed(&page.permalink, &e.to_string());
                failed.push(PageFailure {
                    id: page.id.clone(),
                    permalink: page.permalink.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    entries.sort_by(|a, b| a.permalink.cmp(&b.permalink));
    failed.sort_by(|a, b| a.permalink.cmp(&b.permalink));

    let manifest = SiteManifest {
        build_id: Uuid::now_v7(),
        generated_at: Utc::now(),
        tool_version: config.tool_version.clone(),
        pages: entries,
    };
    write_json(&config.out_dir.join("manifest.json"), &manifest)?;
    write_json(&config.out_dir.join("toc.json"), &tocs)?;

    let report = SiteReport {
        out_dir: config.out_dir.clone(),
        manifest,
        failed,
        elapsed: start.elapsed(),
    };

    info!(
        rendered = report.manifest.pages.len(),
        failed = report.failed.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "site render complete"
    );
    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_page(out_dir: &Path, page: RenderedPage) -> Result<(ManifestEntry, Vec<TocEntry>)> {
    let rel = permalink_to_path(&page.permalink)?.join("index.html");
    let target = out_dir.join(&rel);
    write_atomic(&target, page.html.as_bytes())?;

    let mut hasher = Sha256::new();
    hasher.update(page.html.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    let entry = ManifestEntry {
        id: page.id,
        permalink: page.permalink,
        title: page.title,
        path: rel.to_string_lossy().replace('\\', "/"),
        sha256,
        size_bytes: page.html.len(),
    };
    Ok((entry, page.toc))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DocRenderError::parse(format!("failed to serialize {}: {e}", path.display())))?;
    write_atomic(path, json.as_bytes())
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| DocRenderError::io(parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| DocRenderError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocRenderError::io(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use docrender_shared::{ContentElement, ContentNode};

    use crate::toc::toc_for_page;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docrender-pipeline-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_page(id: &str, content: ContentNode) -> PageRecord {
        let mut page: PageRecord = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": id,
            "slug": format!("/{id}"),
            "permalink": format!("/docs/{id}"),
        }))
        .expect("page");
        page.content = Some(content);
        page
    }

    fn make_config(out_dir: &Path) -> RenderSiteConfig {
        RenderSiteConfig {
            out_dir: out_dir.into(),
            concurrency: 2,
            toc: TocConfig::default(),
            tool_version: "0.1.0-test".into(),
        }
    }

    fn good_content() -> ContentNode {
        ContentElement::new("wrapper")
            .child(ContentElement::new("h2").text("Setup"))
            .child(
                ContentElement::new("p")
                    .text("Run ")
                    .child(ContentElement::new("inlineCode").text("datahub docker quickstart")),
            )
            .into()
    }

    #[test]
    fn render_page_fills_toc_and_anchors() {
        let ambient = ambient_scope(&AppConfig::default()).unwrap();
        let page = make_page("intro", good_content());

        let rendered = render_page(&page, &ambient, &TocConfig::default()).unwrap();
        assert_eq!(rendered.toc.len(), 1);
        assert_eq!(rendered.toc[0].id, "setup");
        assert!(rendered.html.contains("<code>datahub docker quickstart</code>"));
        assert!(rendered.html.contains("href=\"#setup\""));
    }

    #[test]
    fn config_aliases_reach_ambient_scope() {
        let mut config = AppConfig::default();
        config.components.insert("video".into(), "iframe".into());
        config.defaults.heading_anchors = false;

        let ambient = ambient_scope(&config).unwrap();
        let page = make_page("media", ContentElement::new("video").prop("src", "x.mp4").into());

        let rendered = render_page(&page, &ambient, &TocConfig::default()).unwrap();
        assert!(rendered.html.contains("<iframe src=\"x.mp4\"></iframe>"));
    }

    #[test]
    fn render_page_keeps_stored_toc() {
        let ambient = ambient_scope(&AppConfig::default()).unwrap();
        let mut page = make_page("intro", good_content());
        page.toc = vec![TocEntry {
            value: "Stored".into(),
            id: "stored".into(),
            level: 2,
            children: vec![],
        }];

        let rendered = render_page(&page, &ambient, &TocConfig::default()).unwrap();
        assert_eq!(rendered.toc, page.toc);
        assert_eq!(rendered.toc, toc_for_page(&page, &TocConfig::default()));
    }

    #[tokio::test]
    async fn failing_page_does_not_stop_others() {
        let tmp = temp_dir();
        let broken: ContentNode = ContentElement::new("wrapper")
            .child(ContentElement::new("video"))
            .into();
        let index = PageIndex::new(vec![
            make_page("intro", good_content()),
            make_page("broken", broken),
            make_page("faq", good_content()),
        ])
        .unwrap();
        let ambient = ambient_scope(&AppConfig::default()).unwrap();

        let report = render_site(Arc::new(index), ambient, &make_config(&tmp), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.manifest.pages.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "broken");
        assert!(report.failed[0].error.contains("unresolved content tag `wrapper.video`"));

        assert!(tmp.join("docs/intro/index.html").exists());
        assert!(tmp.join("docs/faq/index.html").exists());
        assert!(!tmp.join("docs/broken/index.html").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn writes_manifest_and_toc() {
        let tmp = temp_dir();
        let index = PageIndex::new(vec![make_page("intro", good_content())]).unwrap();
        let ambient = ambient_scope(&AppConfig::default()).unwrap();

        let report = render_site(Arc::new(index), ambient, &make_config(&tmp), &SilentProgress)
            .await
            .unwrap();

        let manifest: SiteManifest =
            serde_json::from_str(&std::fs::read_to_string(tmp.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest.pages.len(), 1);
        assert_eq!(manifest.pages[0].path, "docs/intro/index.html");
        assert_eq!(manifest.pages[0].sha256.len(), 64);
        assert_eq!(manifest.build_id, report.manifest.build_id);

        let tocs: BTreeMap<String, Vec<TocEntry>> =
            serde_json::from_str(&std::fs::read_to_string(tmp.join("toc.json")).unwrap()).unwrap();
        assert_eq!(tocs["/docs/intro"][0].value, "Setup");

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
