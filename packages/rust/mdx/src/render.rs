//! The render pass: content tree in, output tree out.

use tracing::{debug, instrument};

use docrender_shared::{ContentNode, Props, Result};

use crate::components::{ComponentScope, Components, Overrides};
use crate::output::{Attrs, OutputNode};

/// Render `content` with `ambient` as the inherited mapping and optional
/// `overrides` layered on top for this pass only.
///
/// Walks depth-first. The first unresolved tag aborts the pass with
/// [`DocRenderError::UnresolvedTag`](docrender_shared::DocRenderError::UnresolvedTag).
#[instrument(skip_all, fields(ambient = ambient.components().len()))]
pub fn render(
    content: &ContentNode,
    ambient: &ComponentScope,
    overrides: Option<&Overrides>,
) -> Result<OutputNode> {
    let scope = match overrides {
        Some(overrides) => ambient.nest(overrides),
        None => ambient.clone(),
    };
    let output = render_node(content, &scope)?;
    debug!("render pass complete");
    Ok(output)
}

/// Render a list of sibling nodes under `scope`.
pub fn render_children(children: &[ContentNode], scope: &ComponentScope) -> Result<Vec<OutputNode>> {
    children.iter().map(|c| render_node(c, scope)).collect()
}

fn render_node(node: &ContentNode, scope: &ComponentScope) -> Result<OutputNode> {
    match node {
        ContentNode::Text { value } => Ok(OutputNode::text(value.clone())),
        ContentNode::Element(element) => {
            let renderer = scope.resolve(&element.tag, element.parent_name.as_deref())?;
            let children = render_children(&element.children, scope)?;
            renderer.invoke(element, children, scope)
        }
        ContentNode::Provider {
            components,
            children,
        } => {
            let nested = scope.nest(&Overrides::Map(Components::from_aliases(components)?));
            Ok(OutputNode::fragment(render_children(children, &nested)?))
        }
    }
}

/// Convert authored props to output attributes.
///
/// `null` and `false` are dropped, `true` becomes an empty value, strings pass
/// through, anything else is written as compact JSON.
pub fn props_to_attrs(props: &Props) -> Attrs {
    props
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::Null | serde_json::Value::Bool(false) => return None,
                serde_json::Value::Bool(true) => String::new(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}
