//! Content-component resolution and rendering for compiled MDX content.
//!
//! Given a page's [`ContentNode`](docrender_shared::ContentNode) tree and an
//! ambient [`ComponentScope`], [`render`] resolves every content tag to a
//! [`Renderer`] and produces a render-ready [`OutputNode`] tree, which
//! [`to_html`] serializes.

pub mod anchor;
pub mod components;
pub mod html;
pub mod output;
pub mod render;
pub mod resolve;

pub use anchor::{HeadingAnchor, with_heading_anchors};
pub use components::{Component, ComponentScope, Components, FRAGMENT_ALIAS, Overrides, Renderer};
pub use html::to_html;
pub use output::{Attrs, OutputNode};
pub use render::{props_to_attrs, render, render_children};
pub use resolve::{Resolved, ResolvedFrom, defaults, resolve, resolve_detailed};
