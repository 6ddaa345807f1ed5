#![forbid(unsafe_code)]

//! Aggregate change notification over several model values.
//!
//! A [`Group`] invokes one callback whenever any watched model value changes
//! (that is, whenever an interface write reaches the model — a model's own
//! `set` does not loop back through its callbacks). Connections are held
//! RAII-style: dropping the group disconnects everything.

use std::rc::Rc;

use tether_core::{Connection, ModelValue};

/// One callback fanned in from any number of watched model values.
pub struct Group {
    notify: Rc<dyn Fn()>,
    connections: Vec<Connection>,
}

impl Group {
    /// Create a group around `callback`.
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            notify: Rc::new(callback),
            connections: Vec::new(),
        }
    }

    /// Watch `node`; any change to it triggers the group callback.
    pub fn watch<T: Clone + 'static>(&mut self, node: &ModelValue<T>) {
        let notify = Rc::clone(&self.notify);
        self.connections.push(node.connect(move |_| notify()));
    }

    /// Number of watched nodes.
    #[must_use]
    pub fn watched(&self) -> usize {
        self.connections.len()
    }

    /// Stop watching everything; the group can be reused.
    pub fn clear(&mut self) {
        self.connections.clear();
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("watched", &self.connections.len())
            .finish()
    }
}
