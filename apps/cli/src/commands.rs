//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docrender_core::pipeline::{
    ProgressReporter, RenderSiteConfig, SiteReport, ambient_scope, render_site,
};
use docrender_core::site::{PageIndex, load_page, load_pages_except};
use docrender_core::toc::toc_for_page;
use docrender_mdx::ResolvedFrom;
use docrender_shared::{AppConfig, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docrender: render compiled documentation pages to HTML.
#[derive(Parser)]
#[command(
    name = "docrender",
    version,
    about = "Render compiled documentation page records into a static HTML site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.docrender/docrender.toml).
    #[arg(long, global = true, env = "DOCRENDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render every page record under a directory to HTML.
    Render {
        /// Directory of page record JSON files.
        pages: PathBuf,

        /// Output directory (defaults to `defaults.out_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pages rendered in parallel (defaults to `defaults.concurrency`).
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Print the table of contents of one page as JSON.
    Toc {
        /// Page record JSON file.
        page: PathBuf,

        /// Shallowest heading level included.
        #[arg(long)]
        min_level: Option<u8>,

        /// Deepest heading level included.
        #[arg(long)]
        max_level: Option<u8>,
    },

    /// Show which renderer a content tag resolves to.
    Resolve {
        /// Content tag, e.g. `inlineCode`.
        tag: String,

        /// Enclosing tag used as the resolution scope.
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docrender=info",
        1 => "docrender=debug",
        _ => "docrender=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Render {
            pages,
            out,
            concurrency,
        } => cmd_render(config_path, &pages, out, concurrency).await,
        Command::Toc {
            page,
            min_level,
            max_level,
        } => cmd_toc(config_path, &page, min_level, max_level),
        Command::Resolve { tag, scope } => cmd_resolve(config_path, &tag, scope.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_render(
    config_path: Option<&Path>,
    pages_dir: &Path,
    out: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let mut site_config = RenderSiteConfig::from(&config);
    if let Some(out) = out {
        site_config.out_dir = out;
    }
    if let Some(concurrency) = concurrency {
        site_config.concurrency = concurrency;
    }

    let pages = load_pages_except(pages_dir, Some(site_config.out_dir.as_path()))?;
    if pages.is_empty() {
        return Err(eyre!("no page records found under '{}'", pages_dir.display()));
    }
    let index = Arc::new(PageIndex::new(pages)?);
    let ambient = ambient_scope(&config)?;

    info!(
        pages = index.len(),
        out = %site_config.out_dir.display(),
        "rendering documentation site"
    );

    let reporter = CliProgress::new(index.len());
    let report = render_site(index, ambient, &site_config, &reporter).await?;

    println!();
    println!("  Site rendered.");
    println!("  Pages:   {}", report.manifest.pages.len());
    println!("  Failed:  {}", report.failed.len());
    println!("  Output:  {}", report.out_dir.display());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if !report.failed.is_empty() {
        for failure in &report.failed {
            eprintln!("  {} ({}): {}", failure.permalink, failure.id, failure.error);
        }
        return Err(eyre!("{} page(s) failed to render", report.failed.len()));
    }

    Ok(())
}

fn cmd_toc(
    config_path: Option<&Path>,
    page_path: &Path,
    min_level: Option<u8>,
    max_level: Option<u8>,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let mut toc_config = config.toc;
    if let Some(min) = min_level {
        toc_config.min_heading_level = min;
    }
    if let Some(max) = max_level {
        toc_config.max_heading_level = max;
    }
    toc_config.validate()?;

    let page = load_page(page_path)?;
    let toc = toc_for_page(&page, &toc_config);
    println!("{}", serde_json::to_string_pretty(&toc)?);
    Ok(())
}

fn cmd_resolve(config_path: Option<&Path>, tag: &str, scope: Option<&str>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let ambient = ambient_scope(&config)?;

    let resolved = ambient.resolve_detailed(tag, scope)?;
    let rule = match resolved.from {
        ResolvedFrom::Scoped => "scoped mapping",
        ResolvedFrom::Bare => "mapping",
        ResolvedFrom::Default => "built-in default",
    };
    let shown = match scope {
        Some(scope) => format!("{scope}.{tag}"),
        None => tag.to_string(),
    };
    println!("{shown} -> {} ({rule})", resolved.renderer);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn page_rendered(&self, permalink: &str, _current: usize, _total: usize) {
        self.bar.inc(1);
        self.bar.set_message(permalink.to_string());
    }

    fn page_failed(&self, permalink: &str, _error: &str) {
        self.bar.inc(1);
        self.bar.println(format!("failed: {permalink}"));
    }

    fn done(&self, _report: &SiteReport) {
        self.bar.finish_and_clear();
    }
}
