//! The tree model.
//!
//! A [`Vode`] describes one UI fragment. Its shape is decided once, when the
//! value is built (or parsed from JSON by [`Vode::from_json`]), and never
//! re-derived from positions afterwards.

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::memo::{memo_key, MemoKey};
use crate::props::Props;
use crate::State;

/// Structural classification of a [`Vode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Renders nothing (`null`, booleans, numbers)
    NoRender,
    /// Text content
    Text,
    /// `[tag]`
    TagOnly,
    /// `[tag, props, child...]`
    TagProps,
    /// `[tag, child...]`
    TagChildren,
    /// Function of the state producing a vode
    Component,
    /// Not a valid tree value
    Invalid,
}

/// A UI fragment.
#[derive(Debug, Clone, Default)]
pub enum Vode {
    /// The no-render sentinel
    #[default]
    Nothing,
    /// A text node
    Text(CompactString),
    /// An element
    Element(Element),
    /// A component, resolved during render
    Component(Component),
    /// An unclassifiable value, kept for error reporting
    Invalid(Value),
}

impl Vode {
    /// Start building an element.
    pub fn element(tag: impl Into<CompactString>) -> Element {
        Element::new(tag)
    }

    /// A text node.
    pub fn text(text: impl Into<CompactString>) -> Self {
        Vode::Text(text.into())
    }

    /// A component: invoked with the state on every render.
    pub fn component(f: impl Fn(&State) -> Vode + 'static) -> Self {
        Vode::Component(Component::new(f))
    }

    /// A component that can fail. A failure is recovered by the nearest
    /// enclosing `catch` prop.
    pub fn try_component(f: impl Fn(&State) -> Result<Vode> + 'static) -> Self {
        Vode::Component(Component::fallible(f))
    }

    /// Classify a plain JSON tree.
    ///
    /// Strings are text, `null`/booleans/numbers render nothing, and arrays
    /// starting with a string are elements. Slot 1 of an element is its
    /// property map iff it is a JSON object; every later slot is a child.
    /// Anything else is [`Vode::Invalid`].
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Vode::Text(text.into()),
            Value::Null | Value::Bool(_) | Value::Number(_) => Vode::Nothing,
            Value::Array(items) if matches!(items.first(), Some(Value::String(_))) => {
                let mut slots = items.into_iter();
                let Some(Value::String(tag)) = slots.next() else {
                    return Vode::Nothing;
                };
                let mut element = Element::new(tag);
                let mut slots = slots.peekable();
                if let Some(Value::Object(_)) = slots.peek() {
                    if let Some(Value::Object(props)) = slots.next() {
                        element.props = Some(PropsSlot::Plain(Props::from_json(&props)));
                    }
                }
                element.children = slots.map(Vode::from_json).collect();
                Vode::Element(element)
            }
            other => Vode::Invalid(other),
        }
    }

    /// Plain JSON form. Components become `null`, memoized props `{}`, and
    /// function-valued props are left out.
    pub fn to_json(&self) -> Value {
        match self {
            Vode::Nothing | Vode::Component(_) => Value::Null,
            Vode::Text(text) => Value::String(text.to_string()),
            Vode::Invalid(value) => value.clone(),
            Vode::Element(element) => {
                let mut slots = Vec::with_capacity(element.slot_count());
                slots.push(Value::String(element.tag.to_string()));
                match &element.props {
                    Some(PropsSlot::Plain(props)) => slots.push(Value::Object(props.to_json())),
                    Some(PropsSlot::Memo(_)) => slots.push(Value::Object(Map::new())),
                    None => {}
                }
                slots.extend(element.children.iter().map(Vode::to_json));
                Value::Array(slots)
            }
        }
    }

    /// Structural classification.
    pub fn shape(&self) -> Shape {
        match self {
            Vode::Nothing => Shape::NoRender,
            Vode::Text(_) => Shape::Text,
            Vode::Component(_) => Shape::Component,
            Vode::Invalid(_) => Shape::Invalid,
            Vode::Element(element) if element.props.is_some() => Shape::TagProps,
            Vode::Element(element) if !element.children.is_empty() => Shape::TagChildren,
            Vode::Element(_) => Shape::TagOnly,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Vode::Text(_))
    }

    #[inline]
    pub fn is_element_shaped(&self) -> bool {
        matches!(self, Vode::Element(_))
    }

    #[inline]
    pub fn is_no_render(&self) -> bool {
        matches!(self, Vode::Nothing)
    }

    /// Whether slot 1 is a property map.
    #[inline]
    pub fn has_props(&self) -> bool {
        matches!(self, Vode::Element(Element { props: Some(_), .. }))
    }

    /// Slot index at which children start: 2 with props, 1 without, `None`
    /// when this is not an element.
    pub fn children_start(&self) -> Option<usize> {
        match self {
            Vode::Element(element) => Some(element.children_start()),
            _ => None,
        }
    }

    /// Number of children (0 for non-elements).
    pub fn child_count(&self) -> usize {
        self.children().map_or(0, <[Vode]>::len)
    }

    /// Number of slots of the array form.
    pub fn slot_count(&self) -> usize {
        match self {
            Vode::Element(element) => element.slot_count(),
            _ => 0,
        }
    }

    /// Element tag, or `#text` for text.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Vode::Element(element) => Some(&element.tag),
            Vode::Text(_) => Some("#text"),
            _ => None,
        }
    }

    pub fn props(&self) -> Option<&PropsSlot> {
        match self {
            Vode::Element(element) => element.props.as_ref(),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Vode]> {
        match self {
            Vode::Element(element) => Some(&element.children),
            _ => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Vode> {
        self.children()?.get(index)
    }

}

impl From<Element> for Vode {
    fn from(element: Element) -> Self {
        Vode::Element(element)
    }
}

impl From<Component> for Vode {
    fn from(component: Component) -> Self {
        Vode::Component(component)
    }
}

impl From<&str> for Vode {
    fn from(text: &str) -> Self {
        Vode::Text(text.into())
    }
}

impl From<String> for Vode {
    fn from(text: String) -> Self {
        Vode::Text(text.into())
    }
}

impl From<CompactString> for Vode {
    fn from(text: CompactString) -> Self {
        Vode::Text(text)
    }
}

impl<T: Into<Vode>> From<Option<T>> for Vode {
    fn from(value: Option<T>) -> Self {
        value.map_or(Vode::Nothing, Into::into)
    }
}

/// An element: tag, optional property map, children.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: CompactString,
    pub props: Option<PropsSlot>,
    pub children: Vec<Vode>,
}

impl Element {
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            props: None,
            children: Vec::new(),
        }
    }

    /// Set the property map.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Some(PropsSlot::Plain(props));
        self
    }

    /// Set a memoized property map: `f` only runs when `key` differs from
    /// the key of the previous render at the same position.
    pub fn with_memo_props<I, V>(mut self, key: I, f: impl Fn(&State) -> Props + 'static) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.props = Some(PropsSlot::Memo(MemoProps {
            key: memo_key(key),
            f: Rc::new(f),
            resolved: None,
        }));
        self
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<Vode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append children.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn children_start(&self) -> usize {
        if self.props.is_some() {
            2
        } else {
            1
        }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.children_start() + self.children.len()
    }
}

/// Slot 1 of an element.
#[derive(Debug, Clone)]
pub enum PropsSlot {
    Plain(Props),
    Memo(MemoProps),
}

impl PropsSlot {
    /// The property map and its memo key.
    pub(crate) fn resolve(self, state: &State) -> (Props, Option<MemoKey>) {
        match self {
            PropsSlot::Plain(props) => (props, None),
            PropsSlot::Memo(memo) => {
                let key = memo.key.clone();
                (memo.into_props(state), Some(key))
            }
        }
    }
}

/// A property map producer stamped with a memo key.
#[derive(Clone)]
pub struct MemoProps {
    pub key: MemoKey,
    f: Rc<dyn Fn(&State) -> Props>,
    resolved: Option<Props>,
}

impl MemoProps {
    pub fn resolve(&self, state: &State) -> Props {
        match &self.resolved {
            Some(props) => props.clone(),
            None => (self.f)(state),
        }
    }

    /// Run the producer once; the render pass that owns this slot reuses
    /// the result.
    pub(crate) fn resolve_now(&mut self, state: &State) -> &Props {
        let f = &self.f;
        self.resolved.get_or_insert_with(|| f(state))
    }

    pub(crate) fn into_props(self, state: &State) -> Props {
        match self.resolved {
            Some(props) => props,
            None => (self.f)(state),
        }
    }
}

impl fmt::Debug for MemoProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoProps")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A function of the state producing a child, optionally memoized.
#[derive(Clone)]
pub struct Component {
    key: Option<MemoKey>,
    f: Rc<dyn Fn(&State) -> Result<Vode>>,
}

impl Component {
    pub fn new(f: impl Fn(&State) -> Vode + 'static) -> Self {
        Self::fallible(move |state| Ok(f(state)))
    }

    pub fn fallible(f: impl Fn(&State) -> Result<Vode> + 'static) -> Self {
        Self {
            key: None,
            f: Rc::new(f),
        }
    }

    /// Stamp with a memo key.
    pub fn with_key(mut self, key: MemoKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn key(&self) -> Option<&MemoKey> {
        self.key.as_ref()
    }

    pub fn call(&self, state: &State) -> Result<Vode> {
        (self.f)(state)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
