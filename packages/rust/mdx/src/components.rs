//! Component mappings and the scopes that carry them through a render pass.
//!
//! A [`ComponentScope`] holds an immutable, `Arc`-shared [`Components`] map.
//! Nesting a scope with [`Overrides`] never touches the parent map: it either
//! reuses it (empty overrides) or builds a fresh merged map.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use docrender_shared::{ContentElement, DocRenderError, Result};

use crate::output::OutputNode;
use crate::render::props_to_attrs;
use crate::resolve::{self, Resolved};

/// Alias that renders children without an enclosing element.
pub const FRAGMENT_ALIAS: &str = "fragment";

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// A custom renderer supplied by the host.
pub trait Component: Send + Sync + fmt::Debug {
    /// Name shown in logs and errors.
    fn name(&self) -> &str;

    /// Produce output for `element`, whose children are already rendered.
    fn render(
        &self,
        element: &ContentElement,
        children: Vec<OutputNode>,
        scope: &ComponentScope,
    ) -> Result<OutputNode>;
}

/// What a content tag renders as.
#[derive(Clone, Debug)]
pub enum Renderer {
    /// A host element with this name; props become attributes.
    Element(String),
    /// Children only.
    Fragment,
    Component(Arc<dyn Component>),
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Fragment, Self::Fragment) => true,
            (Self::Component(a), Self::Component(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Renderer {
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element(name.into())
    }

    pub fn component(component: impl Component + 'static) -> Self {
        Self::Component(Arc::new(component))
    }

    /// Parse a config alias: `fragment`, or a host element name.
    pub fn from_alias(alias: &str) -> Result<Self> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(DocRenderError::config("component alias must not be empty"));
        }
        if alias == FRAGMENT_ALIAS {
            return Ok(Self::Fragment);
        }
        if !alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(DocRenderError::config(format!(
                "component alias `{alias}` is not a valid element name"
            )));
        }
        Ok(Self::Element(alias.to_string()))
    }

    pub(crate) fn invoke(
        &self,
        element: &ContentElement,
        children: Vec<OutputNode>,
        scope: &ComponentScope,
    ) -> Result<OutputNode> {
        match self {
            Self::Element(name) => Ok(OutputNode::element(
                name.clone(),
                props_to_attrs(&element.props),
                children,
            )),
            Self::Fragment => Ok(OutputNode::fragment(children)),
            Self::Component(component) => component.render(element, children, scope),
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(name) => write!(f, "<{name}>"),
            Self::Fragment => f.write_str(FRAGMENT_ALIAS),
            Self::Component(c) => write!(f, "component {}", c.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Tag (`tag` or `scope.tag`) → renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Components {
    entries: BTreeMap<String, Renderer>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, renderer: Renderer) -> Self {
        self.insert(key, renderer);
        self
    }

    /// Insert or replace a binding. Only possible before the map is shared.
    pub fn insert(&mut self, key: impl Into<String>, renderer: Renderer) {
        self.entries.insert(key.into(), renderer);
    }

    /// Build a map from config aliases.
    pub fn from_aliases(aliases: &BTreeMap<String, String>) -> Result<Self> {
        aliases
            .iter()
            .map(|(key, alias)| {
                Renderer::from_alias(alias)
                    .map(|r| (key.clone(), r))
                    .map_err(|e| DocRenderError::config(format!("components.{key}: {e}")))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(|entries| Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&Renderer> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// A new map with `local` layered over `self`. Neither input changes.
    pub fn merged(&self, local: &Components) -> Components {
        let mut entries = self.entries.clone();
        entries.extend(
            local
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Components { entries }
    }
}

impl FromIterator<(String, Renderer)> for Components {
    fn from_iter<I: IntoIterator<Item = (String, Renderer)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

type OverrideFn = dyn Fn(&Components) -> Components + Send + Sync;

/// Local overrides applied when nesting a scope.
#[derive(Clone)]
pub enum Overrides {
    /// Entries layered over the parent mapping.
    Map(Components),
    /// Computes the whole child mapping from the parent mapping.
    With(Arc<OverrideFn>),
}

impl Overrides {
    pub fn with_fn(f: impl Fn(&Components) -> Components + Send + Sync + 'static) -> Self {
        Self::With(Arc::new(f))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Map(m) if m.is_empty())
    }
}

impl From<Components> for Overrides {
    fn from(components: Components) -> Self {
        Self::Map(components)
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentScope
// ---------------------------------------------------------------------------

/// The ambient mapping in effect for a subtree.
#[derive(Clone, Debug, Default)]
pub struct ComponentScope {
    components: Arc<Components>,
}

impl ComponentScope {
    pub fn new(components: Components) -> Self {
        Self {
            components: Arc::new(components),
        }
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Whether both scopes point at the same mapping allocation.
    pub fn shares_mapping_with(&self, other: &ComponentScope) -> bool {
        Arc::ptr_eq(&self.components, &other.components)
    }

    /// Child scope with `overrides` applied. `self` is left untouched.
    pub fn nest(&self, overrides: &Overrides) -> ComponentScope {
        match overrides {
            Overrides::Map(local) if local.is_empty() => self.clone(),
            Overrides::Map(local) => Self::new(self.components.merged(local)),
            Overrides::With(f) => Self::new(f(&self.components)),
        }
    }

    /// Resolve `tag` under an optional `scope` prefix.
    pub fn resolve(&self, tag: &str, scope: Option<&str>) -> Result<&Renderer> {
        resolve::resolve(&self.components, tag, scope)
    }

    /// Like [`resolve`](Self::resolve), also reporting which rule matched.
    pub fn resolve_detailed(&self, tag: &str, scope: Option<&str>) -> Result<Resolved<'_>> {
        resolve::resolve_detailed(&self.components, tag, scope)
    }
}
