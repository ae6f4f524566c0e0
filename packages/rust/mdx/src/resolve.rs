//! Content-tag resolution.
//!
//! Order: `scope.tag` in the mapping, bare `tag` in the mapping, the built-in
//! defaults, then [`DocRenderError::UnresolvedTag`].

use std::sync::LazyLock;

use tracing::trace;

use docrender_shared::{DocRenderError, Result};

use crate::components::{Components, Renderer};

/// Host elements a Markdown compile emits; each renders as itself.
const HOST_ELEMENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "a", "em", "strong", "del", "code", "pre",
    "blockquote", "ul", "ol", "li", "hr", "br", "img", "table", "thead", "tbody", "tr", "th",
    "td", "sup", "sub", "section", "div", "span", "input", "details", "summary",
];

static DEFAULTS: LazyLock<Components> = LazyLock::new(|| {
    HOST_ELEMENTS
        .iter()
        .map(|tag| (tag.to_string(), Renderer::element(*tag)))
        .chain([
            ("inlineCode".to_string(), Renderer::element("code")),
            ("wrapper".to_string(), Renderer::Fragment),
        ])
        .collect()
});

/// The built-in fallback mapping.
pub fn defaults() -> &'static Components {
    &DEFAULTS
}

/// Which rule produced a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    /// `scope.tag` entry in the mapping.
    Scoped,
    /// Bare `tag` entry in the mapping.
    Bare,
    /// Built-in default.
    Default,
}

/// A resolved renderer plus the rule that matched.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub renderer: &'a Renderer,
    pub from: ResolvedFrom,
}

/// Resolve `tag` against `components`, falling back to the built-in defaults.
pub fn resolve<'a>(components: &'a Components, tag: &str, scope: Option<&str>) -> Result<&'a Renderer> {
    resolve_detailed(components, tag, scope).map(|r| r.renderer)
}

/// Like [`resolve`], also reporting which rule matched.
pub fn resolve_detailed<'a>(
    components: &'a Components,
    tag: &str,
    scope: Option<&str>,
) -> Result<Resolved<'a>> {
    if let Some(scope) = scope {
        if let Some(renderer) = components.get(&format!("{scope}.{tag}")) {
            trace!(tag, scope, "resolved scoped tag");
            return Ok(Resolved {
                renderer,
                from: ResolvedFrom::Scoped,
            });
        }
    }

    if let Some(renderer) = components.get(tag) {
        trace!(tag, "resolved tag");
        return Ok(Resolved {
            renderer,
            from: ResolvedFrom::Bare,
        });
    }

    if let Some(renderer) = DEFAULTS.get(tag) {
        return Ok(Resolved {
            renderer,
            from: ResolvedFrom::Default,
        });
    }

    Err(DocRenderError::unresolved(tag, scope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_tag_resolves_to_exact_renderer() {
        let r1 = Renderer::element("pre");
        let components = Components::new().with("code", r1.clone());

        assert_eq!(resolve(&components, "code", None).unwrap(), &r1);
        let err = resolve(&components, "video", None).unwrap_err();
        assert!(err.is_unresolved_tag());
    }

    #[test]
    fn scoped_entry_wins_over_bare_entry() {
        let components = Components::new()
            .with("li", Renderer::element("li"))
            .with("ol.li", Renderer::element("span"));

        let scoped = resolve_detailed(&components, "li", Some("ol")).unwrap();
        assert_eq!(scoped.renderer, &Renderer::element("span"));
        assert_eq!(scoped.from, ResolvedFrom::Scoped);

        let other = resolve_detailed(&components, "li", Some("ul")).unwrap();
        assert_eq!(other.renderer, &Renderer::element("li"));
        assert_eq!(other.from, ResolvedFrom::Bare);
    }

    #[test]
    fn defaults_cover_primitive_tags() {
        let empty = Components::new();

        let inline = resolve_detailed(&empty, "inlineCode", Some("p")).unwrap();
        assert_eq!(inline.renderer, &Renderer::element("code"));
        assert_eq!(inline.from, ResolvedFrom::Default);

        assert_eq!(resolve(&empty, "wrapper", None).unwrap(), &Renderer::Fragment);
        assert_eq!(resolve(&empty, "h3", None).unwrap(), &Renderer::element("h3"));
    }

    #[test]
    fn mapping_overrides_defaults() {
        let components = Components::new().with("inlineCode", Renderer::element("kbd"));
        assert_eq!(
            resolve(&components, "inlineCode", None).unwrap(),
            &Renderer::element("kbd")
        );
    }

    #[test]
    fn unknown_tags_fail_with_scope_in_error() {
        let empty = Components::new();
        for tag in ["video", "Tabs", "MDXLayout", "admonition"] {
            let err = resolve(&empty, tag, Some("p")).unwrap_err();
            match err {
                DocRenderError::UnresolvedTag { tag: t, scope } => {
                    assert_eq!(t, tag);
                    assert_eq!(scope.as_deref(), Some("p"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn resolution_is_order_independent() {
        let components = Components::new()
            .with("a", Renderer::element("x-link"))
            .with("code", Renderer::Fragment);

        let forward = (
            resolve(&components, "a", None).unwrap().clone(),
            resolve(&components, "code", None).unwrap().clone(),
        );
        let backward = {
            let code = resolve(&components, "code", None).unwrap().clone();
            let a = resolve(&components, "a", None).unwrap().clone();
            (a, code)
        };
        assert_eq!(forward, backward);
    }
}
