//! vode - a virtual-tree renderer with a two-lane state-patch scheduler.
//!
//! A view function turns a JSON state into a tree of [`Vode`] values; the
//! engine reconciles that tree against a live [`vode_dom::Document`],
//! mutating only what changed. State changes are submitted as [`Patch`]
//! values and rendered on an immediate (sync) or animated (async) lane.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                          App                             │
//! │     (mount, patch, dispatch_event, frame, defuse)        │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌───────────────────────┐    ┌───────────────────────────┐
//! │       Scheduler       │    │         Dispatch          │
//! │ (sync/async queues,   │◀───│ (mpsc channel, effects on │
//! │  merge, transitions)  │    │  a LocalPool)             │
//! └───────────────────────┘    └───────────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Renderer                          │
//! │        (remember, reconcile, patch properties)           │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌───────────────────────┐    ┌───────────────────────────┐
//! │   Vode / Attached     │    │     vode_dom::Document    │
//! │   (tree model, memo)  │    │  (live nodes, hydration)  │
//! └───────────────────────┘    └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use vode::{App, LiveDocument, Vode};
//!
//! let mut doc = LiveDocument::new();
//! let body = doc.create_element("body");
//! let container = doc.create_element("div");
//! doc.append_child(body, container).unwrap();
//!
//! let mut app = App::mount(doc, container, json!({"count": 0}), |state| {
//!     Vode::element("div")
//!         .child(Vode::element("span").child(state["count"].to_string()))
//!         .into()
//! }, [])
//! .unwrap();
//!
//! app.patch(json!({"count": 1})).unwrap();
//! app.run_until_stalled().unwrap();
//! assert_eq!(app.document().outer_html(app.container()), "<div><span>1</span></div>");
//! ```

mod app;
mod attached;
mod dispatch;
mod error;
pub mod helpers;
mod hydrate;
mod memo;
mod merge;
mod options;
mod patch;
mod props;
mod render;
mod scheduler;
mod vode;

pub use app::App;
pub use attached::{AttachedElement, AttachedKind, AttachedVode};
pub use dispatch::{Dispatch, Lane, Yielder};
pub use error::{Result, VodeError};
pub use hydrate::{hydrate, hydrate_for_render};
pub use memo::{memo, memo_key, same_key, MemoKey};
pub use options::AppOptions;
pub use patch::Patch;
pub use props::{Catch, Event, Handler, Hook, Prop, Props, CATCH, ON_MOUNT, ON_UNMOUNT};
pub use scheduler::{Stats, Transition};
pub use vode::{Component, Element, MemoProps, PropsSlot, Shape, Vode};

/// Application state: a JSON object.
pub type State = serde_json::Value;

/// The live document type the engine renders into.
pub type LiveDocument = vode_dom::Document<Handler>;
