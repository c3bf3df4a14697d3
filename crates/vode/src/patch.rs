//! Patch values: state transition requests.

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{LocalBoxStream, Stream, StreamExt};
use serde_json::{Map, Value};

use crate::dispatch::Yielder;
use crate::State;

/// A request to change the state.
///
/// | variant  | handling                                                        |
/// |----------|-----------------------------------------------------------------|
/// | `Ignore` | dropped                                                         |
/// | `Render` | deep-merged into the lane's queue, then rendered                |
/// | `Action` | invoked with the current state, its result resubmitted          |
/// | `Future` | awaited, its output resubmitted                                 |
/// | `Stream` | every item resubmitted in order                                 |
/// | `Task`   | emitted patches resubmitted in order, then the return value     |
/// | `Batch`  | non-empty: each item goes to the animated lane (when available) |
/// |          | empty: flush signal, see [`Patch::flush`]                       |
#[derive(Default)]
pub enum Patch {
    /// Nothing to do
    #[default]
    Ignore,
    /// Partial state, merged with deletion semantics
    Render(Map<String, Value>),
    /// Deferred computation on the current state
    Action(Box<dyn FnOnce(&State) -> Patch>),
    /// A patch that becomes available later
    Future(LocalBoxFuture<'static, Patch>),
    /// A sequence of patches that become available over time
    Stream(LocalBoxStream<'static, Patch>),
    /// A cooperative task that emits patches and returns a final one
    Task(Box<dyn FnOnce(Yielder) -> LocalBoxFuture<'static, Patch>>),
    /// Several patches submitted one by one
    Batch(Vec<Patch>),
}

impl Patch {
    /// Render patch from a JSON value; non-objects are ignored.
    pub fn render(value: Value) -> Self {
        match value {
            Value::Object(map) => Patch::Render(map),
            _ => Patch::Ignore,
        }
    }

    /// Patch computed from the state at submission time.
    pub fn action(f: impl FnOnce(&State) -> Patch + 'static) -> Self {
        Patch::Action(Box::new(f))
    }

    /// Patch produced by a future.
    pub fn future(fut: impl Future<Output = Patch> + 'static) -> Self {
        Patch::Future(fut.boxed_local())
    }

    /// Patches produced by a stream.
    pub fn stream(stream: impl Stream<Item = Patch> + 'static) -> Self {
        Patch::Stream(stream.boxed_local())
    }

    /// Cooperative task: `f` receives a [`Yielder`] to emit intermediate
    /// patches; its output is submitted last.
    pub fn task<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Yielder) -> Fut + 'static,
        Fut: Future<Output = Patch> + 'static,
    {
        Patch::Task(Box::new(move |yielder| f(yielder).boxed_local()))
    }

    /// Batch of patches.
    pub fn batch(patches: impl IntoIterator<Item = Patch>) -> Self {
        Patch::Batch(patches.into_iter().collect())
    }

    /// The flush signal: skip the running transition, move everything queued
    /// for the animated lane to the immediate lane and render it right away.
    pub fn flush() -> Self {
        Patch::Batch(Vec::new())
    }

    /// Whether this patch is dropped on submission.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Patch::Ignore)
    }
}

impl From<Value> for Patch {
    /// Objects become render patches, arrays batches, everything else is ignored.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Patch::Render(map),
            Value::Array(items) => Patch::Batch(items.into_iter().map(Patch::from).collect()),
            _ => Patch::Ignore,
        }
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        Patch::Render(map)
    }
}

impl<T: Into<Patch>> From<Option<T>> for Patch {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Ignore, Into::into)
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Ignore => f.write_str("Ignore"),
            Patch::Render(map) => f.debug_tuple("Render").field(map).finish(),
            Patch::Action(_) => f.write_str("Action(..)"),
            Patch::Future(_) => f.write_str("Future(..)"),
            Patch::Stream(_) => f.write_str("Stream(..)"),
            Patch::Task(_) => f.write_str("Task(..)"),
            Patch::Batch(items) => f.debug_tuple("Batch").field(items).finish(),
        }
    }
}
