//! Hydration: reading a vode back from live nodes.

use compact_str::CompactString;
use serde_json::Value;
use vode_dom::{Document, NodeId, NodeKind};

use crate::attached::{AttachedElement, AttachedVode};
use crate::props::{Prop, Props};
use crate::vode::{Element, PropsSlot, Vode};

/// Describe a live subtree as a vode.
///
/// Comments and whitespace-only text are skipped. Tags are lowercased and
/// attributes become string properties.
pub fn hydrate<L>(doc: &Document<L>, node: NodeId) -> Option<Vode> {
    match &doc.get(node)?.kind {
        NodeKind::Text(value) if !value.trim().is_empty() => Some(Vode::Text(value.clone())),
        NodeKind::Text(_) | NodeKind::Comment(_) => None,
        NodeKind::Element(_) => {
            let mut element = Element::new(lowercase_tag(doc, node));
            if let Some(props) = attribute_props(doc, node) {
                element.props = Some(PropsSlot::Plain(props));
            }
            element.children = doc
                .child_nodes(node)
                .iter()
                .filter_map(|&child| hydrate(doc, child))
                .collect();
            Some(Vode::Element(element))
        }
    }
}

/// Build the render baseline for a live subtree.
///
/// Like [`hydrate`], but the skipped nodes are also removed from the
/// document, so live child positions line up with the attached children.
pub fn hydrate_for_render<L>(doc: &mut Document<L>, node: NodeId) -> Option<AttachedVode> {
    match &doc.get(node)?.kind {
        NodeKind::Text(value) if !value.trim().is_empty() => return Some(AttachedVode::text(node)),
        NodeKind::Text(_) | NodeKind::Comment(_) => return None,
        NodeKind::Element(_) => {}
    }

    let tag = lowercase_tag(doc, node);
    let props = attribute_props(doc, node);

    let mut children = Vec::new();
    let mut skipped = Vec::new();
    for child in doc.child_nodes(node).to_vec() {
        match hydrate_for_render(doc, child) {
            Some(attached) => children.push(Some(attached)),
            None => skipped.push(child),
        }
    }
    for child in skipped {
        doc.drop_subtree(child);
    }

    Some(AttachedVode::element(
        node,
        AttachedElement {
            tag,
            props,
            props_memo: None,
            children,
        },
    ))
}

fn lowercase_tag<L>(doc: &Document<L>, node: NodeId) -> CompactString {
    doc.tag(node)
        .map(|tag| CompactString::from(tag.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn attribute_props<L>(doc: &Document<L>, node: NodeId) -> Option<Props> {
    if !doc.has_attributes(node) {
        return None;
    }
    Some(
        doc.attributes(node)
            .iter()
            .map(|(name, value)| (name.clone(), Prop::Value(Value::String(value.to_string()))))
            .collect(),
    )
}
