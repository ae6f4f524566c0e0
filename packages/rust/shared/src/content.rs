//! Compiled page content: the tree a render pass walks.
//!
//! Trees arrive already compiled (one element per Markdown construct) and are
//! never mutated during rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Element attributes as authored, keyed by prop name.
pub type Props = BTreeMap<String, serde_json::Value>;

/// A node of compiled page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    /// Literal text.
    Text { value: String },
    /// A tagged element resolved through the component mapping.
    Element(ContentElement),
    /// Alias overrides (`tag` or `scope.tag` → alias) for a subtree.
    Provider {
        components: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<ContentNode>,
    },
}

/// A tagged element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentElement {
    /// Content tag, e.g. `p`, `inlineCode`, `Tabs`.
    pub tag: String,
    /// Tag of the enclosing element, used as the resolution scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } => out.push_str(value),
            Self::Element(el) => el.collect_text(out),
            Self::Provider { children, .. } => children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// The element payload, if this is an element node.
    pub fn as_element(&self) -> Option<&ContentElement> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl ContentElement {
    /// Start an element with no scope, props or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            parent_name: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Set a prop.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Append a child element, scoping it under this element's tag.
    pub fn child(mut self, mut child: ContentElement) -> Self {
        child.parent_name = Some(self.tag.clone());
        self.children.push(ContentNode::Element(child));
        self
    }

    /// Append a text child.
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.children.push(ContentNode::text(value));
        self
    }

    /// Append an arbitrary node unchanged.
    pub fn node(mut self, node: ContentNode) -> Self {
        self.children.push(node);
        self
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        self.children.iter().for_each(|c| c.collect_text(out));
    }

    /// The `id` prop as a string, if present.
    pub fn id(&self) -> Option<&str> {
        self.props.get("id").and_then(serde_json::Value::as_str)
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag.as_bytes() {
            [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
            _ => None,
        }
    }
}

impl From<ContentElement> for ContentNode {
    fn from(el: ContentElement) -> Self {
        Self::Element(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_parent_name() {
        let list = ContentElement::new("ul").child(ContentElement::new("li").text("one"));
        let li = list.children[0].as_element().unwrap();
        assert_eq!(li.parent_name.as_deref(), Some("ul"));
        assert_eq!(list.parent_name, None);
    }

    #[test]
    fn heading_level_only_for_headings() {
        assert_eq!(ContentElement::new("h3").heading_level(), Some(3));
        assert_eq!(ContentElement::new("h7").heading_level(), None);
        assert_eq!(ContentElement::new("hr").heading_level(), None);
        assert_eq!(ContentElement::new("p").heading_level(), None);
    }

    #[test]
    fn text_content_walks_descendants() {
        let node: ContentNode = ContentElement::new("h2")
            .text("Config ")
            .child(ContentElement::new("inlineCode").text("details"))
            .into();
        assert_eq!(node.text_content(), "Config details");
    }

    #[test]
    fn deserializes_compiled_json() {
        let json = r#"{
            "type": "element",
            "tag": "p",
            "children": [
                { "type": "text", "value": "Run " },
                { "type": "element", "tag": "inlineCode", "parentName": "p",
                  "children": [{ "type": "text", "value": "yarn start" }] }
            ]
        }"#;
        let node: ContentNode = serde_json::from_str(json).expect("parse content");
        let p = node.as_element().unwrap();
        assert_eq!(p.children.len(), 2);
        let code = p.children[1].as_element().unwrap();
        assert_eq!(code.parent_name.as_deref(), Some("p"));
        assert_eq!(node.text_content(), "Run yarn start");
    }
}
