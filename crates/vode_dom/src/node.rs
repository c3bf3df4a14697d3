//! Document node definitions.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;
use smallvec::SmallVec;

/// Unique identifier for document nodes.
pub type NodeId = u64;

/// A node in the document arena.
#[derive(Debug, Clone)]
pub struct Node<L> {
    /// Unique node ID
    pub id: NodeId,
    /// Node type and content
    pub kind: NodeKind<L>,
    /// Parent node, `None` while detached
    pub parent: Option<NodeId>,
    /// Child node IDs, in document order
    pub children: SmallVec<[NodeId; 4]>,
}

impl<L> Node<L> {
    /// Create a detached node.
    pub fn new(id: NodeId, kind: NodeKind<L>) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// Whether this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Whether this is a comment node.
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment(_))
    }

    /// Element data, if this is an element.
    pub fn element(&self) -> Option<&ElementData<L>> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable element data, if this is an element.
    pub fn element_mut(&mut self) -> Option<&mut ElementData<L>> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }
}

/// Node type variants.
#[derive(Debug, Clone)]
pub enum NodeKind<L> {
    /// Element with attributes, properties and listeners
    Element(ElementData<L>),
    /// Text content
    Text(CompactString),
    /// Comment content
    Comment(CompactString),
}

/// Element-specific node data.
///
/// Inline style lives in the `style` attribute, the way a browser reflects
/// `element.style` into markup.
#[derive(Debug, Clone)]
pub struct ElementData<L> {
    /// Tag name as created
    pub tag: CompactString,
    /// XML namespace, `None` for plain HTML elements
    pub namespace: Option<CompactString>,
    /// Attributes in insertion order
    pub attributes: SmallVec<[(CompactString, CompactString); 4]>,
    /// Live properties (not reflected into markup)
    pub properties: FxHashMap<CompactString, Value>,
    /// Event listeners by event name (`click`, not `onclick`)
    pub listeners: FxHashMap<CompactString, L>,
}

impl<L> ElementData<L> {
    /// Create element data for a tag.
    pub fn new(tag: impl Into<CompactString>, namespace: Option<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            namespace,
            attributes: SmallVec::new(),
            properties: FxHashMap::default(),
            listeners: FxHashMap::default(),
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: CompactString) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.into(), value)),
        }
    }

    pub(crate) fn remove_attribute(&mut self, name: &str) -> bool {
        match self.attributes.iter().position(|(key, _)| key == name) {
            Some(pos) => {
                self.attributes.remove(pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new() {
        let node: Node<()> = Node::new(1, NodeKind::Text("hi".into()));
        assert_eq!(node.id, 1);
        assert!(node.is_text());
        assert!(node.parent.is_none());
        assert!(node.element().is_none());
    }

    #[test]
    fn test_attribute_order_is_kept() {
        let mut data: ElementData<()> = ElementData::new("a", None);
        data.set_attribute("href", "/".into());
        data.set_attribute("title", "home".into());
        data.set_attribute("href", "/index".into());
        let names: Vec<_> = data.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["href", "title"]);
        assert_eq!(data.attribute("href"), Some("/index"));
        assert!(data.remove_attribute("title"));
        assert!(!data.remove_attribute("title"));
    }
}
