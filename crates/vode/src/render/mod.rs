//! The reconciler.
//!
//! - Positional child diffing with tag matching
//! - Property, style, class and listener patching
//! - `catch` recovery of failed subtrees

mod properties;
mod reconcile;

pub(crate) use reconcile::Renderer;
