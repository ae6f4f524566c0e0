//! Page document layout around rendered content.

use docrender_mdx::{Attrs, OutputNode, to_html};
use docrender_shared::{NavLink, PageRecord, TocEntry};

/// Wrap a rendered `body` in a full HTML document for `page`.
///
/// Adds the title and description, the edit link, previous/next navigation
/// and the table of contents.
pub fn page_document(page: &PageRecord, body: OutputNode, toc: &[TocEntry]) -> OutputNode {
    let mut head = vec![
        el("meta", attrs(&[("charset", "utf-8")]), vec![]),
        el("title", Attrs::new(), vec![OutputNode::text(page.title.clone())]),
    ];
    if !page.description.is_empty() {
        head.push(el(
            "meta",
            attrs(&[("name", "description"), ("content", page.description.as_str())]),
            vec![],
        ));
    }

    let mut article = vec![body];
    if let Some(edit_url) = &page.edit_url {
        article.push(el(
            "footer",
            Attrs::new(),
            vec![el(
                "a",
                attrs(&[("className", "edit-link"), ("href", edit_url.as_str())]),
                vec![OutputNode::text("Edit this page")],
            )],
        ));
    }

    let mut main = vec![el("article", Attrs::new(), article)];
    if page.previous.is_some() || page.next.is_some() {
        let links = [("prev", &page.previous), ("next", &page.next)]
            .into_iter()
            .filter_map(|(rel, link)| link.as_ref().map(|l| nav_link(rel, l)))
            .collect();
        main.push(el("nav", attrs(&[("className", "pagination-nav")]), links));
    }
    if !toc.is_empty() {
        main.push(el(
            "nav",
            attrs(&[("className", "table-of-contents")]),
            vec![toc_list(toc)],
        ));
    }

    el(
        "html",
        attrs(&[("lang", "en")]),
        vec![
            el("head", Attrs::new(), head),
            el("body", Attrs::new(), vec![el("main", Attrs::new(), main)]),
        ],
    )
}

/// Serialize a document tree with its doctype.
pub fn document_html(document: &OutputNode) -> String {
    format!("<!DOCTYPE html>\n{}\n", to_html(document))
}

fn nav_link(rel: &str, link: &NavLink) -> OutputNode {
    el(
        "a",
        attrs(&[
            ("className", format!("pagination-nav__link {rel}").as_str()),
            ("href", link.permalink.as_str()),
            ("rel", rel),
        ]),
        vec![OutputNode::text(link.title.clone())],
    )
}

fn toc_list(entries: &[TocEntry]) -> OutputNode {
    let items = entries
        .iter()
        .map(|entry| {
            let mut children = vec![el(
                "a",
                attrs(&[("href", format!("#{}", entry.id).as_str())]),
                vec![OutputNode::text(entry.value.clone())],
            )];
            if !entry.children.is_empty() {
                children.push(toc_list(&entry.children));
            }
            el("li", Attrs::new(), children)
        })
        .collect();
    el("ul", Attrs::new(), items)
}

fn el(name: &str, attrs: Attrs, children: Vec<OutputNode>) -> OutputNode {
    OutputNode::element(name, attrs, children)
}

fn attrs(pairs: &[(&str, &str)]) -> Attrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
