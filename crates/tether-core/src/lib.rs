#![forbid(unsafe_code)]

//! Bidirectional model ⇄ interface value synchronization.
//!
//! One authoritative [`ModelValue`] (or [`ModelSignal`]) lives per name; any
//! number of interface nodes observe and mutate it with no direct reference
//! to the model or to each other. All traffic flows through process-wide,
//! name-keyed weak-callback registries (the manifolds), so tearing a node
//! down is enough to silence it.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_core::ModelValue;
//!
//! let model = ModelValue::create("doc.green", 95).unwrap();
//! let panel = model.interface_node();
//! let dialog = model.interface_node();
//!
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! let _connection = dialog.connect(move |value| sink.set(*value));
//!
//! panel.set(200);
//! assert_eq!(model.get(), 200);
//! assert_eq!(seen.get(), 200);
//! ```
//!
//! # Architecture
//!
//! - [`Tube`]: node identity — a name plus a model/interface role. Model
//!   names are singletons while alive.
//! - Manifolds (internal): two singleton registries per node kind, one for
//!   each side. Subscribers are held weakly; nodes disconnect explicitly on
//!   drop and dead handles are pruned lazily during publish.
//! - [`ModelValue`] / [`InterfaceValue`] and friends: synchronized state with
//!   per-node application callbacks and optional self-healing filters.
//! - [`ValueContext`] / [`MultipleValueContext`]: commit-or-rollback grouping
//!   of mutations into a single notification pass.
//!
//! Everything is single-threaded and synchronous; callbacks run re-entrantly
//! on the calling stack and may themselves connect, disconnect, or publish.

mod callbacks;
mod context;
mod error;
mod manifold;
mod signal;
mod tube;
mod value;

pub use callbacks::Connection;
pub use context::{BatchNode, MultipleValueContext, ValueContext};
pub use error::NodeError;
pub use signal::{InterfaceSignal, ModelSignal};
pub use tube::{NodeRole, Tube};
pub use value::{
    FilteredInterfaceValue, FilteredModelValue, FilteredReadOnlyValue, InterfaceValue, ModelValue,
    ReadOnlyValue,
};
