//! Mutable document tree over a lenient HTML parse
//!
//! scraper hands back an immutable tree, so [`HtmlDocument`] copies the parse
//! into an owned arena whose attributes can be edited. Serialization goes back
//! through html5ever's serializer. The rewriter only talks to the
//! [`DocumentTree`] trait.

use html5ever::serialize::{SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, Namespace, QualName};
use scraper::{Html, Node};
use std::collections::HashMap;
use std::io;
use tracing::error;

/// Handle to a node inside a [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Traversal and attribute access needed by the markup rewriter
pub trait DocumentTree {
    fn root(&self) -> NodeId;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Lowercase tag name, `None` for non-element nodes
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Text of a text node, `None` for everything else
    fn text(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Replace an attribute value, adding the attribute if missing.
    /// No-op on non-element nodes.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: String);

    fn serialize(&self) -> String;

    /// All element nodes in document order
    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if self.tag_name(node).is_some() {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.text(current) {
                out.push_str(text);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Doctype(String),
    Comment(String),
    Text(String),
    ProcessingInstruction { target: String, data: String },
    Element {
        name: QualName,
        attrs: Vec<(QualName, String)>,
    },
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    children: Vec<NodeId>,
}

/// Owned, editable HTML document
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    nodes: Vec<NodeEntry>,
}

/// The parser eats one leading newline inside these
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

impl HtmlDocument {
    /// Parse a full document. Never fails: malformed markup is repaired the way
    /// browsers repair it.
    pub fn parse(content: &str) -> Self {
        let html = Html::parse_document(content);
        Self::from_html(&html)
    }

    fn from_html(html: &Html) -> Self {
        let mut doc = HtmlDocument { nodes: Vec::new() };
        let mut index = HashMap::new();

        for node in html.tree.root().descendants() {
            let data = match node.value() {
                Node::Document | Node::Fragment => NodeData::Document,
                Node::Doctype(doctype) => NodeData::Doctype(doctype.name().to_string()),
                Node::Comment(comment) => NodeData::Comment(comment.to_string()),
                Node::Text(text) => NodeData::Text(text.to_string()),
                Node::ProcessingInstruction(pi) => NodeData::ProcessingInstruction {
                    target: pi.target.to_string(),
                    data: pi.data.to_string(),
                },
                Node::Element(element) => NodeData::Element {
                    name: element.name.clone(),
                    attrs: element
                        .attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_string()))
                        .collect(),
                },
            };

            let id = NodeId(doc.nodes.len());
            doc.nodes.push(NodeEntry {
                data,
                children: Vec::new(),
            });
            index.insert(node.id(), id);

            // descendants() is pre-order, so the parent is already indexed
            if let Some(parent) = node.parent() {
                if let Some(&NodeId(p)) = index.get(&parent.id()) {
                    doc.nodes[p].children.push(id);
                }
            }
        }

        if doc.nodes.is_empty() {
            doc.nodes.push(NodeEntry {
                data: NodeData::Document,
                children: Vec::new(),
            });
        }

        doc
    }

    fn entry(&self, node: NodeId) -> &NodeEntry {
        &self.nodes[node.0]
    }

    fn serialize_node<S: Serializer>(&self, node: NodeId, serializer: &mut S) -> io::Result<()> {
        let entry = self.entry(node);
        match &entry.data {
            NodeData::Document => self.serialize_children(node, serializer),
            NodeData::Doctype(name) => serializer.write_doctype(name),
            NodeData::Comment(text) => serializer.write_comment(text),
            NodeData::Text(text) => serializer.write_text(text),
            NodeData::ProcessingInstruction { target, data } => {
                serializer.write_processing_instruction(target, data)
            }
            NodeData::Element { name, attrs } => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|(key, value)| (key, value.as_str())),
                )?;

                if is_html(name) && LEADING_NEWLINE_ELEMENTS.contains(&&*name.local) {
                    let starts_with_newline = entry
                        .children
                        .first()
                        .and_then(|&c| self.text(c))
                        .is_some_and(|t| t.starts_with('\n'));
                    if starts_with_newline {
                        serializer.write_text("\n")?;
                    }
                }

                self.serialize_children(node, serializer)?;
                serializer.end_elem(name.clone())
            }
        }
    }

    fn serialize_children<S: Serializer>(&self, node: NodeId, serializer: &mut S) -> io::Result<()> {
        for &child in &self.entry(node).children {
            self.serialize_node(child, serializer)?;
        }
        Ok(())
    }
}

impl html5ever::serialize::Serialize for HtmlDocument {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => self.serialize_node(self.root(), serializer),
            TraversalScope::ChildrenOnly(_) => self.serialize_children(self.root(), serializer),
        }
    }
}

fn is_html(name: &QualName) -> bool {
    &*name.ns == "http://www.w3.org/1999/xhtml"
}

/// Plain attribute lookups only see attributes without a namespace, so
/// `href` never matches `xlink:href`
fn is_plain_attribute(key: &QualName, name: &str) -> bool {
    key.ns.is_empty() && str::eq_ignore_ascii_case(&key.local, name)
}

impl DocumentTree for HtmlDocument {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.entry(node).children
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Element { name, .. } => Some(&*name.local),
            _ => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| is_plain_attribute(k, name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: String) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[node.0].data {
            match attrs.iter_mut().find(|(k, _)| is_plain_attribute(k, name)) {
                Some(slot) => slot.1 = value,
                None => attrs.push((
                    QualName::new(None, Namespace::from(""), LocalName::from(name)),
                    value,
                )),
            }
        }
    }

    fn serialize(&self) -> String {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            // scraper parses with scripting on, so <noscript> holds raw text
            scripting_enabled: true,
            traversal_scope: TraversalScope::IncludeNode,
            create_missing_parent: false,
        };
        if let Err(e) = html5ever::serialize(&mut buf, self, opts) {
            error!("Failed to serialize document: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_stable() {
        let html = r#"<!DOCTYPE html>
<html><head><title>A &amp; B</title>
<script>if (a < b && c) { run(); }</script></head>
<body><!-- note --><p class="x">1 &lt; 2</p><br><img src="a.png" alt="say &quot;hi&quot;">
<pre>
indented</pre></body></html>"#;

        let first = HtmlDocument::parse(html).serialize();
        let second = HtmlDocument::parse(&first).serialize();
        assert_eq!(first, second);
        assert!(first.starts_with("<!DOCTYPE html>"));
        assert!(first.contains("if (a < b && c)"));
        assert!(first.contains("1 &lt; 2"));
        assert!(first.contains("<br>"));
        assert!(!first.contains("</br>"));
        assert!(first.contains("say &quot;hi&quot;"));
    }

    #[test]
    fn test_svg_namespaced_attributes_survive() {
        let html = r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#icon"></use></svg>"##;
        let first = HtmlDocument::parse(html).serialize();

        assert!(first.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(first.contains(r##"<use xlink:href="#icon"></use>"##));
        assert_eq!(HtmlDocument::parse(&first).serialize(), first);
    }

    #[test]
    fn test_namespaced_attribute_is_not_a_plain_attribute() {
        let mut doc = HtmlDocument::parse(r##"<svg><use xlink:href="#icon"></use></svg>"##);
        let use_el = doc
            .elements()
            .into_iter()
            .find(|&n| doc.tag_name(n) == Some("use"))
            .unwrap();
        assert_eq!(doc.attribute(use_el, "href"), None);

        doc.set_attribute(use_el, "href", "plain".to_string());
        let out = doc.serialize();
        assert!(out.contains(r##"xlink:href="#icon""##));
        assert!(out.contains(r#" href="plain""#));
    }

    #[test]
    fn test_pre_with_blank_first_line_is_stable() {
        let first = HtmlDocument::parse("<pre>\n\nbody</pre>").serialize();
        assert!(first.contains("<pre>\n\nbody</pre>"));
        assert_eq!(HtmlDocument::parse(&first).serialize(), first);
    }

    #[test]
    fn test_malformed_markup_is_repaired() {
        let doc = HtmlDocument::parse("<div><p>unclosed <b>bold</div><a href=x>tail");
        let out = doc.serialize();
        assert!(out.contains("<html>"));
        assert!(out.contains("<body>"));
        assert!(out.contains("tail"));
    }

    #[test]
    fn test_set_attribute_and_traversal() {
        let mut doc = HtmlDocument::parse(r#"<a href="one">1</a><a>2</a><img src="i.png">"#);
        let anchors: Vec<NodeId> = doc
            .elements()
            .into_iter()
            .filter(|&n| doc.tag_name(n) == Some("a"))
            .collect();
        assert_eq!(anchors.len(), 2);
        assert_eq!(doc.attribute(anchors[0], "href"), Some("one"));
        assert_eq!(doc.attribute(anchors[1], "HREF"), None);

        doc.set_attribute(anchors[0], "href", "two".to_string());
        doc.set_attribute(anchors[1], "href", "three".to_string());
        assert_eq!(doc.attribute(anchors[0], "href"), Some("two"));
        assert_eq!(doc.text_content(anchors[1]), "2");

        let out = doc.serialize();
        assert!(out.contains(r#"<a href="two">1</a>"#));
        assert!(out.contains(r#"<a href="three">2</a>"#));
    }

    #[test]
    fn test_set_attribute_ignores_text_nodes() {
        let mut doc = HtmlDocument::parse("<p>hello</p>");
        let p = doc
            .elements()
            .into_iter()
            .find(|&n| doc.tag_name(n) == Some("p"))
            .unwrap();
        let text = doc.children(p)[0];
        doc.set_attribute(text, "href", "x".to_string());
        assert_eq!(doc.text(text), Some("hello"));
        assert_eq!(doc.attribute(text, "href"), None);
    }
}
