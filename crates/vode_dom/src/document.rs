//! Document arena management.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::css::{parse_declarations, serialize_declarations, set_declaration};
use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Node, NodeId, NodeKind};
use crate::stats::MutationStats;

/// A live document: every node ever created, keyed by id.
///
/// Nodes start detached. A node removed from its parent stays in the arena
/// (its id stays valid) until [`Document::drop_subtree`] discards it.
#[derive(Debug)]
pub struct Document<L> {
    /// All nodes by ID
    nodes: FxHashMap<NodeId, Node<L>>,
    /// Next available node ID
    next_id: NodeId,
    /// Write counters
    stats: MutationStats,
}

impl<L> Document<L> {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            next_id: 1,
            stats: MutationStats::default(),
        }
    }

    fn alloc(&mut self, kind: NodeKind<L>) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        self.stats.created += 1;
        id
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag, None)))
    }

    /// Create a detached element in an XML namespace.
    pub fn create_element_ns(&mut self, namespace: &str, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag, Some(namespace.into()))))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, value: &str) -> NodeId {
        self.alloc(NodeKind::Text(value.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, value: &str) -> NodeId {
        self.alloc(NodeKind::Comment(value.into()))
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node<L>> {
        self.nodes.get(&id)
    }

    /// Whether the node is still part of the arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node<L>> {
        self.nodes.get(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node<L>> {
        self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData<L>> {
        self.node_mut(id)?
            .element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Children of a node (empty for unknown nodes).
    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child at a position.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.child_nodes(parent).get(index).copied()
    }

    /// Position of a node among its parent's children.
    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.child_nodes(parent).iter().position(|&id| id == child)
    }

    /// Tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(Node::element)
            .map(|el| el.tag.as_str())
    }

    /// Namespace of an element.
    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(Node::element)
            .and_then(|el| el.namespace.as_deref())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(child)?;
        if !self.node(parent)?.is_element() {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(child));
        }
        Ok(())
    }

    /// Unlink a node from its parent. Returns whether it had one.
    fn detach(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            if let Some(pos) = node.children.iter().position(|&id| id == child) {
                node.children.remove(pos);
            }
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        true
    }

    /// Append a node as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.stats.inserted += 1;
        Ok(())
    }

    /// Insert a node before `reference`, which must be a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()> {
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let node = self.node_mut(parent)?;
        let pos = node
            .children
            .iter()
            .position(|&id| id == reference)
            .unwrap_or(node.children.len());
        node.children.insert(pos, child);
        self.node_mut(child)?.parent = Some(parent);
        self.stats.inserted += 1;
        Ok(())
    }

    /// Insert a node before whatever occupies `index`, or append when nothing does.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        match self.child_at(parent, index) {
            Some(reference) => self.insert_before(parent, child, reference),
            None => self.append_child(parent, child),
        }
    }

    /// Put `new` where `old` is. A detached `old` is left alone.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> DomResult<()> {
        self.node(old)?;
        self.node(new)?;
        if old == new {
            return Ok(());
        }
        let Some(parent) = self.parent(old) else {
            return Ok(());
        };
        if self.is_inclusive_ancestor(new, parent) {
            return Err(DomError::HierarchyRequest(new));
        }
        self.detach(new);
        let node = self.node_mut(parent)?;
        let pos = node
            .children
            .iter()
            .position(|&id| id == old)
            .ok_or(DomError::NotAChild { parent, child: old })?;
        node.children[pos] = new;
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        self.stats.replaced += 1;
        Ok(())
    }

    /// Detach a node from its parent. The subtree stays in the arena.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        self.node(id)?;
        if self.detach(id) {
            self.stats.removed += 1;
        }
        Ok(())
    }

    /// Detach a node and discard it together with all its descendants.
    pub fn drop_subtree(&mut self, id: NodeId) {
        if self.detach(id) {
            self.stats.removed += 1;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Content of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Text(value) | NodeKind::Comment(value) => Some(value.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(slot) => *slot = value.into(),
            _ => return Err(DomError::NotAText(id)),
        }
        self.stats.text_writes += 1;
        Ok(())
    }

    /// Attribute value of an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(&id)?.element()?.attribute(name)
    }

    /// All attributes of an element, in insertion order.
    pub fn attributes(&self, id: NodeId) -> &[(CompactString, CompactString)] {
        self.nodes
            .get(&id)
            .and_then(Node::element)
            .map(|el| el.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an element carries any attribute.
    pub fn has_attributes(&self, id: NodeId) -> bool {
        !self.attributes(id).is_empty()
    }

    /// Set an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attribute(name, value.into());
        self.stats.attribute_writes += 1;
        Ok(())
    }

    /// Remove an attribute. Removing a missing attribute is not a write.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        if self.element_mut(id)?.remove_attribute(name) {
            self.stats.attribute_writes += 1;
        }
        Ok(())
    }

    /// Live property of an element.
    pub fn property(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.nodes.get(&id)?.element()?.properties.get(name)
    }

    /// Set a live property.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) -> DomResult<()> {
        self.element_mut(id)?.properties.insert(name.into(), value);
        self.stats.property_writes += 1;
        Ok(())
    }

    /// Inline style in `cssText` form (empty when there is none).
    pub fn css_text(&self, id: NodeId) -> String {
        self.attribute(id, "style")
            .map(|text| serialize_declarations(&parse_declarations(text)))
            .unwrap_or_default()
    }

    /// Replace the whole inline style.
    pub fn set_css_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let text = serialize_declarations(&parse_declarations(text));
        let el = self.element_mut(id)?;
        if text.is_empty() {
            el.remove_attribute("style");
        } else {
            el.set_attribute("style", text.into());
        }
        self.stats.style_writes += 1;
        Ok(())
    }

    /// One inline style declaration (kebab-case property name).
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<CompactString> {
        let decls = parse_declarations(self.attribute(id, "style")?);
        decls
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Set one inline style declaration; `None` or an empty value clears it.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: Option<&str>) -> DomResult<()> {
        let el = self.element_mut(id)?;
        let mut decls = parse_declarations(el.attribute("style").unwrap_or_default());
        if set_declaration(&mut decls, name, value) {
            if decls.is_empty() {
                el.remove_attribute("style");
            } else {
                el.set_attribute("style", serialize_declarations(&decls).into());
            }
        }
        self.stats.style_writes += 1;
        Ok(())
    }

    /// Listener registered for an event name.
    pub fn listener(&self, id: NodeId, event: &str) -> Option<&L> {
        self.nodes.get(&id)?.element()?.listeners.get(event)
    }

    /// Set (or with `None`, clear) the listener for an event name.
    pub fn set_listener(&mut self, id: NodeId, event: &str, listener: Option<L>) -> DomResult<()> {
        let el = self.element_mut(id)?;
        match listener {
            Some(listener) => {
                el.listeners.insert(event.into(), listener);
            }
            None => {
                el.listeners.remove(event);
            }
        }
        self.stats.listener_writes += 1;
        Ok(())
    }

    /// Names of all events with a registered listener, sorted.
    pub fn listener_names(&self, id: NodeId) -> Vec<CompactString> {
        let mut names: Vec<_> = self
            .nodes
            .get(&id)
            .and_then(Node::element)
            .map(|el| el.listeners.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Write counters since creation or the last reset.
    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    /// Reset the write counters.
    pub fn reset_stats(&mut self) {
        self.stats = MutationStats::default();
    }
}

impl<L> Default for Document<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document<()> {
        Document::new()
    }

    #[test]
    fn test_append_and_index() {
        let mut doc = doc();
        let root = doc.create_element("div");
        let a = doc.create_text("a");
        let b = doc.create_element("span");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        assert_eq!(doc.child_nodes(root), &[a, b]);
        assert_eq!(doc.index_of(b), Some(1));
        assert_eq!(doc.parent(a), Some(root));
        assert_eq!(doc.stats().inserted, 2);
    }

    #[test]
    fn test_insert_child_appends_past_end() {
        let mut doc = doc();
        let root = doc.create_element("ul");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        doc.insert_child(root, 5, second).unwrap();
        doc.insert_child(root, 0, first).unwrap();
        assert_eq!(doc.child_nodes(root), &[first, second]);
    }

    #[test]
    fn test_replace_with() {
        let mut doc = doc();
        let root = doc.create_element("div");
        let old = doc.create_element("p");
        let new = doc.create_text("x");
        doc.append_child(root, old).unwrap();
        doc.replace_with(old, new).unwrap();

        assert_eq!(doc.child_nodes(root), &[new]);
        assert_eq!(doc.parent(old), None);
        assert!(doc.contains(old));
        assert_eq!(doc.stats().replaced, 1);
    }

    #[test]
    fn test_hierarchy_request() {
        let mut doc = doc();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest(outer))
        );
    }

    #[test]
    fn test_text_into_text_is_rejected() {
        let mut doc = doc();
        let text = doc.create_text("t");
        let child = doc.create_text("c");
        assert_eq!(doc.append_child(text, child), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn test_drop_subtree() {
        let mut doc = doc();
        let root = doc.create_element("div");
        let child = doc.create_element("p");
        let leaf = doc.create_text("leaf");
        doc.append_child(root, child).unwrap();
        doc.append_child(child, leaf).unwrap();

        doc.drop_subtree(child);
        assert!(doc.child_nodes(root).is_empty());
        assert!(!doc.contains(child));
        assert!(!doc.contains(leaf));
        assert!(doc.contains(root));
    }

    #[test]
    fn test_style_reflects_into_attribute() {
        let mut doc = doc();
        let el = doc.create_element("div");
        doc.set_css_text(el, "color:red").unwrap();
        doc.set_style_property(el, "font-size", Some("12px")).unwrap();
        assert_eq!(doc.attribute(el, "style"), Some("color: red; font-size: 12px;"));

        doc.set_style_property(el, "color", None).unwrap();
        assert_eq!(doc.css_text(el), "font-size: 12px;");
        assert_eq!(doc.style_property(el, "font-size").as_deref(), Some("12px"));

        doc.set_css_text(el, "").unwrap();
        assert!(!doc.has_attributes(el));
    }

    #[test]
    fn test_listeners() {
        let mut doc = doc();
        let el = doc.create_element("button");
        doc.set_listener(el, "click", Some(())).unwrap();
        doc.set_listener(el, "blur", Some(())).unwrap();
        assert_eq!(doc.listener_names(el), vec!["blur", "click"]);
        doc.set_listener(el, "click", None).unwrap();
        assert!(doc.listener(el, "click").is_none());
        assert_eq!(doc.stats().listener_writes, 3);
    }

    #[test]
    fn test_set_text_on_element_fails() {
        let mut doc = doc();
        let el = doc.create_element("div");
        assert_eq!(doc.set_text(el, "x"), Err(DomError::NotAText(el)));
        assert_eq!(doc.set_text(99, "x"), Err(DomError::NodeNotFound(99)));
    }
}
