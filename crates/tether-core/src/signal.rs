#![forbid(unsafe_code)]

//! Stateless signal nodes.
//!
//! A signal is published without a payload: useful for "something happened"
//! notifications such as a button press or a menu selection. Wiring mirrors
//! the value nodes — model side, interface side, one-hop echo from the model
//! so sibling interfaces hear each other — minus the stored value.
//!
//! The interface node that originated an emit does not hear its own echo.

use std::cell::Cell;
use std::rc::Rc;

use crate::callbacks::{CallbackList, Connection};
use crate::error::NodeError;
use crate::manifold::with_signal_manifolds;
use crate::tube::{NodeRole, Tube};

// ---------------------------------------------------------------------------
// ModelSignal
// ---------------------------------------------------------------------------

struct ModelSignalState {
    callbacks: CallbackList<()>,
}

/// The unique, authoritative end of a named signal.
pub struct ModelSignal {
    tube: Tube,
    state: Rc<ModelSignalState>,
    handler: Rc<dyn Fn(&())>,
}

impl ModelSignal {
    /// Create the model signal for `name`, claiming the name process-wide.
    pub fn create(name: impl Into<String>) -> Result<Self, NodeError> {
        let tube = Tube::model(name)?;
        let state = Rc::new(ModelSignalState {
            callbacks: CallbackList::new(),
        });

        let handler: Rc<dyn Fn(&())> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |_: &()| {
                state.callbacks.invoke(&());
                // Echo so sibling interfaces hear interface-originated emits.
                with_signal_manifolds(|pair| {
                    pair.side(NodeRole::Interface).publish(&name, &());
                });
            })
        };

        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Model).subscribe(tube.name(), &handler);
        });

        Ok(Self {
            tube,
            state,
            handler,
        })
    }

    /// The node name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.tube.name()
    }

    /// The node identity.
    #[must_use]
    pub fn tube(&self) -> &Tube {
        &self.tube
    }

    /// Notify every interface node.
    pub fn emit(&self) {
        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Interface).publish(self.tube.name(), &());
        });
    }

    /// Attach an application callback, invoked when an interface emits.
    pub fn connect(&self, callback: impl Fn() + 'static) -> Connection {
        self.state.callbacks.connect(move |_: &()| callback())
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }

    /// Derive an interface signal.
    #[must_use]
    pub fn interface_node(&self) -> InterfaceSignal {
        InterfaceSignal::attach(self.tube.name())
    }
}

impl Drop for ModelSignal {
    fn drop(&mut self) {
        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Model).unsubscribe(&self.handler);
        });
    }
}

impl std::fmt::Debug for ModelSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSignal")
            .field("name", &self.tube.name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InterfaceSignal
// ---------------------------------------------------------------------------

struct InterfaceSignalState {
    callbacks: CallbackList<()>,
    emitting: Cell<bool>,
}

/// A derived emitter/observer for a model signal.
pub struct InterfaceSignal {
    tube: Tube,
    state: Rc<InterfaceSignalState>,
    handler: Rc<dyn Fn(&())>,
}

impl InterfaceSignal {
    pub(crate) fn attach(name: &str) -> Self {
        let tube = Tube::interface(name);
        let state = Rc::new(InterfaceSignalState {
            callbacks: CallbackList::new(),
            emitting: Cell::new(false),
        });

        let handler: Rc<dyn Fn(&())> = {
            let state = Rc::clone(&state);
            Rc::new(move |_: &()| {
                if !state.emitting.get() {
                    state.callbacks.invoke(&());
                }
            })
        };

        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Interface)
                .subscribe(tube.name(), &handler);
        });

        Self {
            tube,
            state,
            handler,
        }
    }

    /// The node name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.tube.name()
    }

    /// The node identity.
    #[must_use]
    pub fn tube(&self) -> &Tube {
        &self.tube
    }

    /// Notify the model, which echoes to sibling interfaces.
    pub fn emit(&self) {
        self.state.emitting.set(true);
        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Model).publish(self.tube.name(), &());
        });
        self.state.emitting.set(false);
    }

    /// Attach an application callback, invoked when the signal fires.
    pub fn connect(&self, callback: impl Fn() + 'static) -> Connection {
        self.state.callbacks.connect(move |_: &()| callback())
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }
}

impl Drop for InterfaceSignal {
    fn drop(&mut self) {
        with_signal_manifolds(|pair| {
            pair.side(NodeRole::Interface).unsubscribe(&self.handler);
        });
    }
}

impl std::fmt::Debug for InterfaceSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceSignal")
            .field("name", &self.tube.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn model_emit_reaches_interfaces() {
        let model = ModelSignal::create("signal.basic").unwrap();
        let interface = model.interface_node();

        let fired = Rc::new(Cell::new(false));
        let _c = {
            let fired = Rc::clone(&fired);
            interface.connect(move || fired.set(true))
        };

        model.emit();
        assert!(fired.get());
    }

    #[test]
    fn interface_emit_reaches_model_and_siblings_not_itself() {
        let model = ModelSignal::create("signal.echo").unwrap();
        let first = model.interface_node();
        let second = model.interface_node();

        let model_count = Rc::new(Cell::new(0));
        let first_count = Rc::new(Cell::new(0));
        let second_count = Rc::new(Cell::new(0));

        let _cm = {
            let count = Rc::clone(&model_count);
            model.connect(move || count.set(count.get() + 1))
        };
        let _c1 = {
            let count = Rc::clone(&first_count);
            first.connect(move || count.set(count.get() + 1))
        };
        let _c2 = {
            let count = Rc::clone(&second_count);
            second.connect(move || count.set(count.get() + 1))
        };

        first.emit();
        assert_eq!(model_count.get(), 1);
        assert_eq!(second_count.get(), 1);
        assert_eq!(first_count.get(), 0, "no self-echo for the originator");
    }

    #[test]
    fn duplicate_model_signal_name_fails() {
        let _model = ModelSignal::create("signal.dup").unwrap();
        assert!(matches!(
            ModelSignal::create("signal.dup"),
            Err(NodeError::ModelNameTaken(_))
        ));
    }

    #[test]
    fn disconnect_all_silences_a_node() {
        let model = ModelSignal::create("signal.teardown").unwrap();
        let interface = model.interface_node();

        let count = Rc::new(Cell::new(0));
        let _c = {
            let count = Rc::clone(&count);
            interface.connect(move || count.set(count.get() + 1))
        };

        interface.disconnect_all();
        model.emit();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn signal_names_are_separate_from_other_signals() {
        let alpha = ModelSignal::create("signal.alpha").unwrap();
        let beta = ModelSignal::create("signal.beta").unwrap();

        let alpha_iface = alpha.interface_node();
        let count = Rc::new(Cell::new(0));
        let _c = {
            let count = Rc::clone(&count);
            alpha_iface.connect(move || count.set(count.get() + 1))
        };

        beta.emit();
        assert_eq!(count.get(), 0);
        alpha.emit();
        assert_eq!(count.get(), 1);
    }
}
