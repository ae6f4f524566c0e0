//! Error types for docrender.
//!
//! Library crates use [`DocRenderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docrender operations.
#[derive(Debug, thiserror::Error)]
pub enum DocRenderError {
    /// No renderer matched a content tag and no built-in default applies.
    ///
    /// Terminal for the render pass that raised it, and only that pass.
    #[error("unresolved content tag `{}`", qualified(.scope.as_deref(), .tag))]
    UnresolvedTag { tag: String, scope: Option<String> },

    /// A custom component refused to render its element.
    #[error("component `{component}` failed: {message}")]
    Component { component: String, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Page record or content tree could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate slug, bad heading level, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Worker pool failure while rendering a site.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocRenderError>;

fn qualified(scope: Option<&str>, tag: &str) -> String {
    match scope {
        Some(scope) => format!("{scope}.{tag}"),
        None => tag.to_string(),
    }
}

impl DocRenderError {
    /// Create an unresolved-tag error for `tag` looked up under `scope`.
    pub fn unresolved(tag: impl Into<String>, scope: Option<&str>) -> Self {
        Self::UnresolvedTag {
            tag: tag.into(),
            scope: scope.map(str::to_string),
        }
    }

    /// Create a component failure for the named component.
    pub fn component(component: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a pipeline error from any displayable message.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from tag resolution.
    pub fn is_unresolved_tag(&self) -> bool {
        matches!(self, Self::UnresolvedTag { .. })
    }
}
