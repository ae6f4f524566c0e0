//! Render-ready output tree.

use std::collections::BTreeMap;

use serde::Serialize;

/// Output attributes in stable (sorted) order.
pub type Attrs = BTreeMap<String, String>;

/// A fully resolved node, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputNode {
    Element {
        name: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attrs: Attrs,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<OutputNode>,
    },
    Text {
        value: String,
    },
    /// Children without an enclosing element.
    Fragment {
        children: Vec<OutputNode>,
    },
}

impl OutputNode {
    pub fn element(name: impl Into<String>, attrs: Attrs, children: Vec<OutputNode>) -> Self {
        Self::Element {
            name: name.into(),
            attrs,
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn fragment(children: Vec<OutputNode>) -> Self {
        Self::Fragment { children }
    }

    /// Element name, if this is an element.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Direct children (empty for text).
    pub fn children(&self) -> &[OutputNode] {
        match self {
            Self::Element { children, .. } | Self::Fragment { children } => children,
            Self::Text { .. } => &[],
        }
    }

    /// Depth-first count of elements named `name`.
    pub fn count_elements(&self, name: &str) -> usize {
        let own = usize::from(self.name() == Some(name));
        own + self
            .children()
            .iter()
            .map(|c| c.count_elements(name))
            .sum::<usize>()
    }
}
