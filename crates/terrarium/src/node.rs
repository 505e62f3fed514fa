//! Renderable output tree
//!
//! A [`Node`] is what an edit cycle ultimately produces: a small element
//! tree with deterministic HTML serialization. Hosts build scope entries
//! from these (`Element::new("div").attr("id", "b")`) and the render
//! bridge serializes the winning node on each successful cycle.

use indexmap::IndexMap;

/// A renderable tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with a tag, attributes, and children
    Element(Element),

    /// A text run (escaped on serialization)
    Text(String),

    /// A sequence of nodes with no wrapper element
    Fragment(Vec<Node>),
}

/// An element node: tag, attributes in insertion order, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name, e.g. `div`
    pub tag: String,

    /// Attributes, serialized in insertion order
    pub attrs: IndexMap<String, String>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with the given tag and no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Add or replace an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Create an element node (shorthand for `Element::new(..).into()`).
    pub fn element(tag: impl Into<String>) -> Element {
        Element::new(tag)
    }

    /// Serialize this node to an HTML string.
    ///
    /// Serialization is deterministic: attributes appear in insertion
    /// order, text and attribute values are escaped, and childless
    /// elements self-close.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),

            Node::Fragment(children) => {
                for child in children {
                    child.write_html(out);
                }
            }

            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in &element.children {
                        child.write_html(out);
                    }
                    out.push_str("</");
                    out.push_str(&element.tag);
                    out.push('>');
                }
            }
        }
    }
}

/// Escape a text run for element content.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape an attribute value for double-quoted position.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_element_self_closes() {
        let node: Node = Element::new("div").attr("id", "b").into();
        assert_eq!(node.to_html(), r#"<div id="b"/>"#);
    }

    #[test]
    fn test_element_with_children() {
        let node: Node = Element::new("a")
            .attr("href", "/docs")
            .child(Node::text("Getting Started"))
            .into();
        assert_eq!(node.to_html(), r#"<a href="/docs">Getting Started</a>"#);
    }

    #[test]
    fn test_attrs_serialize_in_insertion_order() {
        let node: Node = Element::new("button")
            .attr("type", "submit")
            .attr("class", "primary")
            .into();
        assert_eq!(
            node.to_html(),
            r#"<button type="submit" class="primary"/>"#
        );
    }

    #[test]
    fn test_attr_replaces_existing_value_in_place() {
        let node: Node = Element::new("div")
            .attr("id", "a")
            .attr("class", "x")
            .attr("id", "b")
            .into();
        assert_eq!(node.to_html(), r#"<div id="b" class="x"/>"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let node = Node::text("a < b & c > d");
        assert_eq!(node.to_html(), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_attr_value_is_escaped() {
        let node: Node = Element::new("div").attr("title", r#"say "hi""#).into();
        assert_eq!(node.to_html(), r#"<div title="say &quot;hi&quot;"/>"#);
    }

    #[test]
    fn test_fragment_has_no_wrapper() {
        let node = Node::Fragment(vec![
            Element::new("span").child(Node::text("a")).into(),
            Element::new("span").child(Node::text("b")).into(),
        ]);
        assert_eq!(node.to_html(), "<span>a</span><span>b</span>");
    }

    #[test]
    fn test_nested_elements() {
        let node: Node = Element::new("ul")
            .child(Element::new("li").child(Node::text("one")))
            .child(Element::new("li").child(Node::text("two")))
            .into();
        assert_eq!(node.to_html(), "<ul><li>one</li><li>two</li></ul>");
    }
}
