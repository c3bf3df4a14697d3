//! Positional reconciliation of a vode against its attached baseline.

use compact_str::CompactString;
use vode_dom::NodeId;

use crate::attached::{AttachedElement, AttachedKind, AttachedVode};
use crate::dispatch::Dispatch;
use crate::error::{Result, VodeError};
use crate::hydrate::hydrate_for_render;
use crate::memo::{remember, same_key, Remembered};
use crate::props::{Catch, Props, ON_MOUNT, ON_UNMOUNT};
use crate::vode::{Element, PropsSlot, Vode};
use crate::{LiveDocument, State};

/// One render pass over a live document.
///
/// Hooks and listeners never touch the state from inside a pass: whatever
/// they return is queued on the dispatch channel.
pub(crate) struct Renderer<'a> {
    pub(super) doc: &'a mut LiveDocument,
    state: &'a State,
    dispatch: &'a Dispatch,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(doc: &'a mut LiveDocument, state: &'a State, dispatch: &'a Dispatch) -> Self {
        Self { doc, state, dispatch }
    }

    /// Reconcile the child at live position `index` of `parent`.
    ///
    /// `old` is what was rendered there last time, `new` what should be
    /// there now. Returns the new baseline, or `None` when nothing is
    /// rendered.
    pub(crate) fn render(
        &mut self,
        parent: NodeId,
        index: usize,
        old: Option<AttachedVode>,
        mut new: Vode,
        xmlns: Option<&str>,
    ) -> Result<Option<AttachedVode>> {
        let Some(catch) = self.catch_of(&mut new, old.as_ref()) else {
            return self.render_vode(parent, index, old, new, xmlns);
        };

        let old_node = old.as_ref().map(|old| old.node);
        let occupant = self.doc.child_at(parent, index);
        match self.render_vode(parent, index, old, new, xmlns) {
            Err(err) if err.is_recoverable() => {
                tracing::warn!(error = %err, "render failed, rendering catch fallback");
                let fallback = catch.resolve(self.state, &err);
                let live = match old_node {
                    Some(node) if self.doc.parent(node) == Some(parent) => Some(node),
                    _ => self.doc.child_at(parent, index).filter(|&node| Some(node) != occupant),
                };
                let baseline = match live {
                    Some(node) => {
                        let baseline = hydrate_for_render(self.doc, node);
                        if baseline.is_none() {
                            self.doc.drop_subtree(node);
                        }
                        baseline
                    }
                    None => None,
                };
                self.render(parent, index, baseline, fallback, xmlns)
            }
            result => result,
        }
    }

    /// The `catch` fallback of an element's property map.
    ///
    /// Memoized props keep the fallback of the previous render while their
    /// key holds; otherwise the producer runs here, once for the whole pass.
    fn catch_of(&self, new: &mut Vode, old: Option<&AttachedVode>) -> Option<Catch> {
        let Vode::Element(element) = new else {
            return None;
        };
        match element.props.as_mut()? {
            PropsSlot::Plain(props) => props.catch_prop().cloned(),
            PropsSlot::Memo(memo) => match old.map(|old| &old.kind) {
                Some(AttachedKind::Element(previous))
                    if previous.tag == element.tag
                        && previous.props_memo.as_ref().is_some_and(|key| same_key(key, &memo.key)) =>
                {
                    previous.props.as_ref()?.catch_prop().cloned()
                }
                _ => memo.resolve_now(self.state).catch_prop().cloned(),
            },
        }
    }

    fn render_vode(
        &mut self,
        parent: NodeId,
        index: usize,
        old: Option<AttachedVode>,
        new: Vode,
        xmlns: Option<&str>,
    ) -> Result<Option<AttachedVode>> {
        let (new, memo) = match remember(self.state, new, old.as_ref())? {
            Remembered::Past => return Ok(old),
            Remembered::Fresh { vode, key } => (vode, key),
        };

        let attached = match new {
            Vode::Nothing => {
                if let Some(old) = old {
                    self.unmount(old);
                }
                return Ok(None);
            }
            Vode::Text(text) => self.render_text(parent, index, old, &text)?,
            Vode::Element(element) => match old {
                Some(AttachedVode {
                    node,
                    kind: AttachedKind::Element(previous),
                    ..
                }) if previous.tag == element.tag => self.update_element(node, previous, element, xmlns)?,
                old => self.create_element(parent, index, old, element, xmlns)?,
            },
            invalid @ (Vode::Invalid(_) | Vode::Component(_)) => {
                return match old {
                    Some(old) => {
                        tracing::debug!(node = old.node, "invalid vode, keeping previous render");
                        Ok(Some(old))
                    }
                    None => Err(VodeError::invalid_vode(&invalid.to_json())),
                };
            }
        };

        Ok(Some(attached.with_memo(memo)))
    }

    fn render_text(
        &mut self,
        parent: NodeId,
        index: usize,
        old: Option<AttachedVode>,
        text: &str,
    ) -> Result<AttachedVode> {
        match old {
            Some(old) if old.is_text() => {
                if self.doc.text(old.node) != Some(text) {
                    self.doc.set_text(old.node, text)?;
                }
                Ok(old)
            }
            old => {
                let node = self.doc.create_text(text);
                self.attach(parent, index, old, node)?;
                Ok(AttachedVode::text(node))
            }
        }
    }

    fn create_element(
        &mut self,
        parent: NodeId,
        index: usize,
        old: Option<AttachedVode>,
        element: Element,
        xmlns: Option<&str>,
    ) -> Result<AttachedVode> {
        let Element { tag, props, children } = element;
        let (props, props_memo) = match props {
            Some(slot) => {
                let (props, key) = slot.resolve(self.state);
                (Some(props), key)
            }
            None => (None, None),
        };

        let namespace = child_namespace(props.as_ref(), xmlns);
        let node = match namespace.as_deref() {
            Some(ns) => self.doc.create_element_ns(ns, &tag),
            None => self.doc.create_element(&tag),
        };
        tracing::trace!(node, tag = %tag, "create element");

        let props = self.patch_properties(node, None, props)?;
        self.attach(parent, index, old, node)?;

        let mut attached_children = Vec::with_capacity(children.len());
        let mut live = 0;
        for child in children {
            let attached = self.render(node, live, None, child, namespace.as_deref())?;
            if attached.is_some() {
                live += 1;
            }
            attached_children.push(attached);
        }

        self.fire_hook(props.as_ref(), ON_MOUNT, node);
        Ok(AttachedVode::element(
            node,
            AttachedElement {
                tag,
                props,
                props_memo,
                children: attached_children,
            },
        ))
    }

    fn update_element(
        &mut self,
        node: NodeId,
        previous: AttachedElement,
        element: Element,
        xmlns: Option<&str>,
    ) -> Result<AttachedVode> {
        let AttachedElement {
            tag,
            props: old_props,
            props_memo: old_memo,
            children: old_children,
        } = previous;

        let (props, props_memo) = match element.props {
            Some(PropsSlot::Memo(memo)) if old_memo.as_ref().is_some_and(|key| same_key(key, &memo.key)) => {
                (old_props, old_memo)
            }
            Some(PropsSlot::Memo(memo)) => {
                let key = memo.key.clone();
                let props = memo.into_props(self.state);
                (self.patch_properties(node, old_props.as_ref(), Some(props))?, Some(key))
            }
            Some(PropsSlot::Plain(props)) => (self.patch_properties(node, old_props.as_ref(), Some(props))?, None),
            None => (self.patch_properties(node, old_props.as_ref(), None)?, None),
        };

        let namespace = child_namespace(props.as_ref(), xmlns);
        let mut old_children = old_children.into_iter();
        let mut children = Vec::with_capacity(element.children.len());
        let mut live = 0;
        for child in element.children {
            let old_child = old_children.next().flatten();
            let attached = self.render(node, live, old_child, child, namespace.as_deref())?;
            if attached.is_some() {
                live += 1;
            }
            children.push(attached);
        }

        for stale in old_children.flatten() {
            tracing::trace!(node = stale.node, "truncate child");
            self.unmount(stale);
        }

        Ok(AttachedVode::element(
            node,
            AttachedElement {
                tag,
                props,
                props_memo,
                children,
            },
        ))
    }

    /// Put a fresh node in place of `old`, or at `index` when there is none.
    fn attach(&mut self, parent: NodeId, index: usize, old: Option<AttachedVode>, node: NodeId) -> Result<()> {
        match old {
            Some(old) => {
                tracing::trace!(old = old.node, new = node, "replace node");
                self.fire_hook(old.props(), ON_UNMOUNT, old.node);
                self.doc.replace_with(old.node, node)?;
                self.doc.drop_subtree(old.node);
            }
            None => self.doc.insert_child(parent, index, node)?,
        }
        Ok(())
    }

    /// Drop a rendered fragment. `onUnmount` fires on its root only.
    fn unmount(&mut self, old: AttachedVode) {
        tracing::trace!(node = old.node, "unmount");
        self.fire_hook(old.props(), ON_UNMOUNT, old.node);
        self.doc.drop_subtree(old.node);
    }

    fn fire_hook(&self, props: Option<&Props>, key: &str, node: NodeId) {
        if let Some(hook) = props.and_then(|props| props.hook(key)) {
            self.dispatch.patch(hook.call(self.state, node));
        }
    }
}

/// Namespace for an element and its descendants: its own `xmlns` prop, or
/// the inherited one.
fn child_namespace(props: Option<&Props>, inherited: Option<&str>) -> Option<CompactString> {
    props
        .and_then(|props| props.get_str("xmlns"))
        .or(inherited)
        .map(CompactString::from)
}
