//! Shared types, error model, and configuration for docrender.
//!
//! This crate is the foundation depended on by all other docrender crates.
//! It provides:
//! - [`DocRenderError`], the unified error type
//! - Page records ([`PageRecord`], [`TocEntry`], [`NavLink`], [`FrontMatter`])
//! - The compiled content tree ([`ContentNode`], [`ContentElement`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod content;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, TocConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use content::{ContentElement, ContentNode, Props};
pub use error::{DocRenderError, Result};
pub use types::{FrontMatter, NavLink, PageRecord, TocEntry};
