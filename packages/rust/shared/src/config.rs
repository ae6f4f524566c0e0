//! Application configuration for docrender.
//!
//! User config lives at `~/.docrender/docrender.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocRenderError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docrender.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docrender";

// ---------------------------------------------------------------------------
// Config structs (matching docrender.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Table-of-contents extraction.
    #[serde(default)]
    pub toc: TocConfig,

    /// Ambient component aliases: `tag` or `scope.tag` → element name or `fragment`.
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default render output directory.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Pages rendered in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Render headings with a trailing `#` anchor link.
    #[serde(default = "default_true")]
    pub heading_anchors: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            concurrency: default_concurrency(),
            heading_anchors: true,
        }
    }
}

fn default_out_dir() -> String {
    "build".into()
}
fn default_concurrency() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

/// `[toc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// Shallowest heading level included.
    #[serde(default = "default_min_heading_level")]
    pub min_heading_level: u8,

    /// Deepest heading level included.
    #[serde(default = "default_max_heading_level")]
    pub max_heading_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_heading_level: default_min_heading_level(),
            max_heading_level: default_max_heading_level(),
        }
    }
}

fn default_min_heading_level() -> u8 {
    2
}
fn default_max_heading_level() -> u8 {
    4
}

impl TocConfig {
    /// Check the heading range is within `h2..=h6` and non-empty.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_heading_level, self.max_heading_level);
        if !(2..=6).contains(&min) || !(2..=6).contains(&max) || min > max {
            return Err(DocRenderError::config(format!(
                "toc heading levels must satisfy 2 <= min <= max <= 6 (got {min}..={max})"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docrender/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocRenderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docrender/docrender.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocRenderError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocRenderError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.toc.validate()?;

    tracing::debug!(?path, aliases = config.components.len(), "loaded config");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocRenderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let mut config = AppConfig::default();
    config
        .components
        .insert("inlineCode".into(), "code".into());
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocRenderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocRenderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
