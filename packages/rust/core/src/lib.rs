//! Site-level rendering for docrender.
//!
//! This crate ties page loading, TOC extraction, content rendering and page
//! layout into the end-to-end `render_site` workflow.

pub mod layout;
pub mod pipeline;
pub mod site;
pub mod toc;
