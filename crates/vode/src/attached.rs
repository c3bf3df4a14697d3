//! Attached trees: what was rendered, and where it lives.
//!
//! An [`AttachedVode`] mirrors the rendered [`Vode`](crate::Vode) position
//! by position and records the live node each part produced. It is the
//! baseline the next render diffs against.

use compact_str::CompactString;
use vode_dom::NodeId;

use crate::memo::MemoKey;
use crate::props::Props;

/// A rendered fragment and its live node.
#[derive(Debug, Clone)]
pub struct AttachedVode {
    /// The live node
    pub node: NodeId,
    /// Key of the memoized component that produced this fragment
    pub memo: Option<MemoKey>,
    pub kind: AttachedKind,
}

#[derive(Debug, Clone)]
pub enum AttachedKind {
    Text,
    Element(AttachedElement),
}

/// A rendered element.
#[derive(Debug, Clone)]
pub struct AttachedElement {
    pub tag: CompactString,
    /// Properties as applied to the live node
    pub props: Option<Props>,
    /// Key of the memoized property map, if any
    pub props_memo: Option<MemoKey>,
    /// One slot per child of the rendered vode; `None` where nothing was rendered
    pub children: Vec<Option<AttachedVode>>,
}

impl AttachedVode {
    pub fn text(node: NodeId) -> Self {
        Self {
            node,
            memo: None,
            kind: AttachedKind::Text,
        }
    }

    pub fn element(node: NodeId, element: AttachedElement) -> Self {
        Self {
            node,
            memo: None,
            kind: AttachedKind::Element(element),
        }
    }

    pub(crate) fn with_memo(mut self, memo: Option<MemoKey>) -> Self {
        self.memo = memo;
        self
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, AttachedKind::Text)
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            AttachedKind::Element(element) => Some(&element.tag),
            AttachedKind::Text => None,
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match &self.kind {
            AttachedKind::Element(element) => element.props.as_ref(),
            AttachedKind::Text => None,
        }
    }

    pub fn children(&self) -> &[Option<AttachedVode>] {
        match &self.kind {
            AttachedKind::Element(element) => &element.children,
            AttachedKind::Text => &[],
        }
    }

    /// The attached child at a vode child position.
    pub fn child(&self, index: usize) -> Option<&AttachedVode> {
        self.children().get(index)?.as_ref()
    }

    /// Visit this fragment and every attached descendant, parents first.
    pub fn walk(&self, f: &mut impl FnMut(&AttachedVode)) {
        f(self);
        for child in self.children().iter().flatten() {
            child.walk(f);
        }
    }
}
