//! Markup serialization.

use phf::phf_set;

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

/// Elements that never have children or a closing tag.
static VOID_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr"
};

/// Check if element is void (self-closing)
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(tag)
}

impl<L> Document<L> {
    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.child_nodes(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(value) => escape_into(value, false, out),
            NodeKind::Comment(value) => {
                out.push_str("<!--");
                out.push_str(value);
                out.push_str("-->");
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_element(&el.tag) && node.children.is_empty() {
                    return;
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
