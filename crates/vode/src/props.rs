//! Element property maps.

use std::fmt;
use std::rc::Rc;

use compact_str::{format_compact, CompactString};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use vode_dom::NodeId;

use crate::error::VodeError;
use crate::patch::Patch;
use crate::vode::Vode;
use crate::State;

/// Reserved key of the hook fired after an element was attached.
pub const ON_MOUNT: &str = "onMount";
/// Reserved key of the hook fired before an element is detached.
pub const ON_UNMOUNT: &str = "onUnmount";
/// Reserved key of the error-recovery fallback.
pub const CATCH: &str = "catch";

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name without the `on` prefix (`click`)
    pub name: CompactString,
    /// Node the event fired on
    pub target: NodeId,
    /// Free-form payload (input value, key, coordinates, ...)
    pub detail: Value,
}

impl Event {
    /// Create an event without payload.
    pub fn new(name: impl Into<CompactString>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            detail: Value::Null,
        }
    }

    /// Attach a payload.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Event listener: computes a patch from the state and the event.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&State, &Event) -> Patch>);

impl Handler {
    /// Wrap a listener function.
    pub fn new(f: impl Fn(&State, &Event) -> Patch + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A listener that submits the same literal patch on every firing.
    pub fn literal(patch: Value) -> Self {
        Self::new(move |_, _| Patch::from(patch.clone()))
    }

    /// Run the listener.
    pub fn call(&self, state: &State, event: &Event) -> Patch {
        (self.0)(state, event)
    }

    /// Same underlying function.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Lifecycle hook: receives the live node it is attached to.
#[derive(Clone)]
pub struct Hook(Rc<dyn Fn(&State, NodeId) -> Patch>);

impl Hook {
    /// Wrap a hook function.
    pub fn new(f: impl Fn(&State, NodeId) -> Patch + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Run the hook.
    pub fn call(&self, state: &State, node: NodeId) -> Patch {
        (self.0)(state, node)
    }

    /// Same underlying function.
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

/// Fallback rendered in place of a subtree whose render failed.
#[derive(Clone)]
pub enum Catch {
    /// Fixed replacement tree
    Vode(Rc<Vode>),
    /// Replacement computed from the state and the failure
    With(Rc<dyn Fn(&State, &VodeError) -> Vode>),
}

impl Catch {
    /// Produce the replacement tree.
    pub fn resolve(&self, state: &State, error: &VodeError) -> Vode {
        match self {
            Catch::Vode(vode) => vode.as_ref().clone(),
            Catch::With(f) => f(state, error),
        }
    }

    fn ptr_eq(&self, other: &Catch) -> bool {
        match (self, other) {
            (Catch::Vode(a), Catch::Vode(b)) => Rc::ptr_eq(a, b),
            (Catch::With(a), Catch::With(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Catch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Catch::Vode(vode) => f.debug_tuple("Catch::Vode").field(vode).finish(),
            Catch::With(_) => f.write_str("Catch::With(..)"),
        }
    }
}

/// A single property value.
#[derive(Debug, Clone)]
pub enum Prop {
    /// Plain data: attribute values, class/style maps, literal event patches
    Value(Value),
    /// `on<event>` listener function
    Handler(Handler),
    /// `onMount` / `onUnmount`
    Hook(Hook),
    /// `catch`
    Catch(Catch),
}

impl Prop {
    /// Identity check used to skip unchanged properties: data compares by
    /// value, functions by pointer.
    pub fn same(&self, other: &Prop) -> bool {
        match (self, other) {
            (Prop::Value(a), Prop::Value(b)) => a == b,
            (Prop::Handler(a), Prop::Handler(b)) => a.ptr_eq(b),
            (Prop::Hook(a), Prop::Hook(b)) => a.ptr_eq(b),
            (Prop::Catch(a), Prop::Catch(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// The data value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Prop::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::Value(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Value(Value::String(value.to_owned()))
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Value(Value::String(value))
    }
}

impl From<bool> for Prop {
    fn from(value: bool) -> Self {
        Prop::Value(Value::Bool(value))
    }
}

impl From<i64> for Prop {
    fn from(value: i64) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<Handler> for Prop {
    fn from(handler: Handler) -> Self {
        Prop::Handler(handler)
    }
}

impl From<Hook> for Prop {
    fn from(hook: Hook) -> Self {
        Prop::Hook(hook)
    }
}

impl From<Catch> for Prop {
    fn from(catch: Catch) -> Self {
        Prop::Catch(catch)
    }
}

/// Ordered property map of one element.
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: IndexMap<CompactString, Prop>,
}

impl Props {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::insert`].
    pub fn with(mut self, key: impl Into<CompactString>, value: impl Into<Prop>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add an `on<event>` listener function.
    ///
    /// Listeners compare by pointer. A closure built anew on every render
    /// never matches the previous one, so each render rewrites the live
    /// listener. Build the handler once and pass clones through
    /// [`Props::with`] to keep re-renders write-free.
    pub fn on(self, event: &str, f: impl Fn(&State, &Event) -> Patch + 'static) -> Self {
        self.with(format_compact!("on{event}"), Handler::new(f))
    }

    /// Add an `on<event>` listener that submits a literal patch.
    pub fn on_patch(self, event: &str, patch: Value) -> Self {
        self.with(format_compact!("on{event}"), patch)
    }

    /// Add the `onMount` hook.
    pub fn on_mount(self, f: impl Fn(&State, NodeId) -> Patch + 'static) -> Self {
        self.with(ON_MOUNT, Hook::new(f))
    }

    /// Add the `onUnmount` hook. It fires when this element is the root of a
    /// removed or replaced fragment, not when an ancestor goes away.
    pub fn on_unmount(self, f: impl Fn(&State, NodeId) -> Patch + 'static) -> Self {
        self.with(ON_UNMOUNT, Hook::new(f))
    }

    /// Add a fixed `catch` fallback.
    pub fn catch(self, fallback: impl Into<Vode>) -> Self {
        self.with(CATCH, Catch::Vode(Rc::new(fallback.into())))
    }

    /// Add a computed `catch` fallback.
    pub fn catch_with(self, f: impl Fn(&State, &VodeError) -> Vode + 'static) -> Self {
        self.with(CATCH, Catch::With(Rc::new(f)))
    }

    /// Insert or replace a property, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<CompactString>, value: impl Into<Prop>) -> Option<Prop> {
        self.entries.insert(key.into(), value.into())
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.entries.get(key)
    }

    /// Look up a data property.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(Prop::as_value)
    }

    /// Look up a string data property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_value(key).and_then(Value::as_str)
    }

    /// Look up a lifecycle hook.
    pub fn hook(&self, key: &str) -> Option<&Hook> {
        match self.get(key)? {
            Prop::Hook(hook) => Some(hook),
            _ => None,
        }
    }

    /// The `catch` fallback, if any.
    pub fn catch_prop(&self) -> Option<&Catch> {
        match self.get(CATCH)? {
            Prop::Catch(catch) => Some(catch),
            _ => None,
        }
    }

    /// Whether a property is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a property, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.entries.shift_remove(key)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(CompactString::as_str)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a JSON object; every entry becomes a data property.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(k, v)| (CompactString::from(k.as_str()), Prop::Value(v.clone())))
                .collect(),
        }
    }

    /// Data properties as a JSON object; functions are left out.
    pub fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_value().map(|v| (k.to_string(), v.clone())))
            .collect()
    }
}

impl<K: Into<CompactString>, V: Into<Prop>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
