#![forbid(unsafe_code)]

//! Node identity and lifecycle.
//!
//! A [`Tube`] links one model node to any number of interface nodes through a
//! shared name. The model end of a tube is a singleton: at most one live model
//! tube may exist per name, tracked in a thread-local set of live names.
//!
//! # Invariants
//!
//! 1. At most one live [`NodeRole::Model`] tube exists per name; a second
//!    creation fails with [`NodeError::ModelNameTaken`].
//! 2. Dropping a model tube releases its name; dropping an interface tube
//!    never touches the live-name set.
//! 3. Tubes are not `Clone` and not `Copy`. Duplicating a node is rejected at
//!    compile time; the sanctioned derivation is an explicit interface-node
//!    constructor on the model.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashSet;
use tracing::warn;

use crate::error::NodeError;

thread_local! {
    static LIVE_MODEL_NAMES: RefCell<AHashSet<String>> = RefCell::new(AHashSet::new());
}

/// Which end of a tube a node occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The unique, authoritative end. Owns the value and the name.
    Model,
    /// A derived observer/mutator proxy. Does not own the name.
    Interface,
}

/// Identity of a synchronized node: a name plus a [`NodeRole`].
///
/// Every value and signal node embeds a `Tube`. The tube's name is the topic
/// the node publishes and subscribes under.
pub struct Tube {
    name: Rc<str>,
    role: NodeRole,
}

impl Tube {
    /// Claim `name` for a new model node.
    pub(crate) fn model(name: impl Into<String>) -> Result<Self, NodeError> {
        let name = name.into();
        let claimed =
            LIVE_MODEL_NAMES.with(|names| names.borrow_mut().insert(name.clone()));

        if !claimed {
            return Err(NodeError::ModelNameTaken(name));
        }

        Ok(Self {
            name: Rc::from(name),
            role: NodeRole::Model,
        })
    }

    /// Derive an interface tube for an existing model name.
    pub(crate) fn interface(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            role: NodeRole::Interface,
        }
    }

    /// The node name (the pub/sub topic).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the name, for handlers that outlive a borrow.
    pub(crate) fn name_handle(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    /// Which end of the tube this is.
    #[must_use]
    pub fn role(&self) -> NodeRole {
        self.role
    }
}

impl Drop for Tube {
    fn drop(&mut self) {
        if self.role != NodeRole::Model {
            return;
        }
        let released =
            LIVE_MODEL_NAMES.with(|names| names.borrow_mut().remove(self.name.as_ref()));
        if !released {
            warn!(name = %self.name, "unknown model node released");
        }
    }
}

impl std::fmt::Debug for Tube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tube")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

impl std::fmt::Display for Tube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whether a model node with `name` is currently alive.
#[cfg(test)]
pub(crate) fn model_name_is_live(name: &str) -> bool {
    LIVE_MODEL_NAMES.with(|names| names.borrow().contains(name))
}
