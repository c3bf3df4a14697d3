//! vode_dom - the live document tree.
//!
//! An arena of element, text and comment nodes that the vode reconciler
//! mutates. It stands in for the platform document: a backend paints or
//! forwards it, tests inspect it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Document<L>                   │
//! │   FxHashMap<NodeId, Node<L>> + MutationStats  │
//! └──────────────────────────────────────────────┘
//!        │                 │                │
//!        ▼                 ▼                ▼
//! ┌─────────────┐  ┌──────────────┐  ┌────────────┐
//! │    node     │  │     css      │  │    html    │
//! │ (kinds,     │  │ (style decl. │  │ (outer /   │
//! │  element)   │  │  parse/emit) │  │  inner)    │
//! └─────────────┘  └──────────────┘  └────────────┘
//! ```
//!
//! The listener payload `L` is opaque to this crate, so the engine decides
//! what an event listener is.

pub mod css;
mod document;
mod error;
mod html;
mod node;
mod stats;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use html::is_void_element;
pub use node::{ElementData, Node, NodeId, NodeKind};
pub use stats::MutationStats;
