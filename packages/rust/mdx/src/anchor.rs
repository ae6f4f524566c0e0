//! Heading anchors: `<h2 id="x">Title<a class="hash-link" href="#x">#</a></h2>`.

use docrender_shared::{ContentElement, Result};

use crate::components::{Component, ComponentScope, Components, Renderer};
use crate::output::{Attrs, OutputNode};
use crate::render::props_to_attrs;

/// Heading tags that get an anchor link.
const ANCHORED_HEADINGS: &[&str] = &["h2", "h3", "h4", "h5", "h6"];

/// Renders a heading followed by a link to its own anchor.
///
/// Headings without an `id` render as plain headings.
#[derive(Debug, Default)]
pub struct HeadingAnchor;

impl Component for HeadingAnchor {
    fn name(&self) -> &str {
        "HeadingAnchor"
    }

    fn render(
        &self,
        element: &ContentElement,
        mut children: Vec<OutputNode>,
        _scope: &ComponentScope,
    ) -> Result<OutputNode> {
        let mut attrs = props_to_attrs(&element.props);

        if let Some(id) = element.id() {
            let class = match attrs.get("className") {
                Some(existing) => format!("{existing} anchor"),
                None => "anchor".to_string(),
            };
            attrs.insert("className".into(), class);

            let mut link = Attrs::new();
            link.insert("className".into(), "hash-link".into());
            link.insert("href".into(), format!("#{id}"));
            link.insert("title".into(), "Direct link to heading".into());
            children.push(OutputNode::element("a", link, vec![OutputNode::text("#")]));
        }

        Ok(OutputNode::element(element.tag.clone(), attrs, children))
    }
}

/// Bind [`HeadingAnchor`] to `h2`..`h6` unless `components` already maps them.
pub fn with_heading_anchors(mut components: Components) -> Components {
    let anchor = Renderer::component(HeadingAnchor);
    for tag in ANCHORED_HEADINGS {
        if !components.contains(tag) {
            components.insert(*tag, anchor.clone());
        }
    }
    components
}
