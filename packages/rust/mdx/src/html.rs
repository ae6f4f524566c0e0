//! HTML serialization of output trees.

use htmlescape::encode_minimal;
use tracing::warn;

use crate::output::OutputNode;

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Serialize `node` to an HTML string.
pub fn to_html(node: &OutputNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &OutputNode, out: &mut String) {
    match node {
        OutputNode::Text { value } => out.push_str(&encode_minimal(value)),
        OutputNode::Fragment { children } => children.iter().for_each(|c| write_node(c, out)),
        OutputNode::Element {
            name,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                if !is_valid_attr_name(key) {
                    warn!(element = %name, attr = %key, "dropping attribute with invalid name");
                    continue;
                }
                out.push(' ');
                out.push_str(attr_name(key));
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&encode_minimal(value));
                    out.push('"');
                }
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name.as_str()) {
                return;
            }

            children.iter().for_each(|c| write_node(c, out));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Attribute names may not contain whitespace, controls, quotes, `<`, `>`, `/` or `=`.
fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

/// JSX-style prop names to their HTML attribute names.
fn attr_name(key: &str) -> &str {
    match key {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Attrs;

    #[test]
    fn escapes_text_and_attributes() {
        let mut attrs = Attrs::new();
        attrs.insert("title".into(), "a \"quoted\" title".into());
        let node = OutputNode::element("p", attrs, vec![OutputNode::text("1 < 2 & 3")]);

        assert_eq!(
            to_html(&node),
            "<p title=\"a &quot;quoted&quot; title\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn renames_jsx_props_and_handles_void_elements() {
        let mut attrs = Attrs::new();
        attrs.insert("className".into(), "hero".into());
        let mut img = Attrs::new();
        img.insert("src".into(), "logo.png".into());

        let node = OutputNode::element(
            "div",
            attrs,
            vec![OutputNode::element("img", img, vec![]), OutputNode::element("br", Attrs::new(), vec![])],
        );
        assert_eq!(to_html(&node), "<div class=\"hero\"><img src=\"logo.png\"><br></div>");
    }

    #[test]
    fn invalid_attribute_names_are_dropped() {
        let mut attrs = Attrs::new();
        attrs.insert("x><script>alert(1)</script><p y".into(), "z".into());
        attrs.insert("data-id".into(), "7".into());
        attrs.insert(String::new(), "empty".into());
        attrs.insert("a b".into(), "space".into());
        let node = OutputNode::element("p", attrs, vec![OutputNode::text("hi")]);

        assert_eq!(to_html(&node), "<p data-id=\"7\">hi</p>");
    }

    #[test]
    fn boolean_attributes_and_fragments() {
        let mut attrs = Attrs::new();
        attrs.insert("checked".into(), String::new());
        let node = OutputNode::fragment(vec![
            OutputNode::element("input", attrs, vec![]),
            OutputNode::text("done"),
        ]);
        assert_eq!(to_html(&node), "<input checked>done");
    }
}
