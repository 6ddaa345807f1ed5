#![forbid(unsafe_code)]

//! Synchronized value nodes.
//!
//! A [`ModelValue`] is the unique, authoritative holder of a named value. Any
//! number of [`InterfaceValue`]s (or the read-only/filtered variants) observe
//! and mutate it without holding a reference to the model or to each other;
//! all traffic flows through the process-wide value manifolds.
//!
//! # Wiring
//!
//! - A model node subscribes on the model-side manifold and publishes to the
//!   interface side. Its local callbacks fire when an interface write arrives.
//! - An interface node subscribes on the interface side and publishes to the
//!   model side. Its local callbacks fire when the model (re)publishes.
//! - When an interface write reaches the model, the model republishes one hop
//!   to the interface side so sibling interfaces converge. Interface nodes
//!   never republish; that would echo forever.
//!
//! # Invariants
//!
//! 1. An interface node's cached value is written only by its subscription
//!    handler; `set` publishes and lets the republish drive the write.
//! 2. The interface node that originated a write does not observe its own
//!    change through its local callbacks (no self-echo), though its cache
//!    still converges.
//! 3. A filter whose owning `Rc` was dropped self-heals to the identity
//!    filter at the next use.
//! 4. No internal borrow is held while user callbacks run; re-entrant `set`,
//!    `connect`, and `disconnect` from inside a callback are safe.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::callbacks::{CallbackList, Connection};
use crate::context::BatchNode;
use crate::error::NodeError;
use crate::manifold::{Payload, with_value_manifolds};
use crate::tube::{NodeRole, Tube};

// ---------------------------------------------------------------------------
// Filter slots
// ---------------------------------------------------------------------------

/// A weakly-held unary filter with identity fallback.
///
/// At most one filter occupies a slot. The caller owns the `Rc`; once it is
/// dropped, the slot heals back to the identity filter on next use.
pub(crate) struct FilterSlot<T> {
    slot: RefCell<Option<Weak<dyn Fn(&T) -> T>>>,
}

impl<T: Clone + 'static> FilterSlot<T> {
    fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    fn attach(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        *self.slot.borrow_mut() = Some(Rc::downgrade(filter));
    }

    fn apply(&self, value: &T) -> T {
        let filter = {
            let mut slot = self.slot.borrow_mut();
            let upgraded = slot.as_ref().and_then(Weak::upgrade);
            if slot.is_some() && upgraded.is_none() {
                debug!("filter dropped; restoring identity");
                *slot = None;
            }
            upgraded
        };

        match filter {
            Some(filter) => filter(value),
            None => value.clone(),
        }
    }
}

fn downcast<'a, T: 'static>(name: &str, payload: &'a Payload) -> Option<&'a T> {
    let value = payload.downcast_ref::<T>();
    if value.is_none() {
        warn!(
            name,
            expected = std::any::type_name::<T>(),
            "payload type mismatch; subscriber skipped"
        );
    }
    value
}

// ---------------------------------------------------------------------------
// ModelValue
// ---------------------------------------------------------------------------

struct ModelState<T: 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
}

/// The unique, authoritative node for a named value.
pub struct ModelValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<ModelState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> ModelValue<T> {
    /// Create the model node for `name`, claiming the name process-wide.
    pub fn create(name: impl Into<String>, initial: T) -> Result<Self, NodeError> {
        let tube = Tube::model(name)?;
        let state = Rc::new(ModelState {
            value: RefCell::new(initial),
            callbacks: CallbackList::new(),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                *state.value.borrow_mut() = value.clone();
                state.callbacks.invoke(value);
                // Sibling interfaces converge through this single hop.
                with_value_manifolds(|pair| {
                    pair.side(NodeRole::Interface).publish(&name, payload);
                });
            })
        };

        with_value_manifolds(|pair| {
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

    /// Current value, cloned out.
    #[must_use]
    pub fn get(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Read the current value in place. The borrow is held for the duration
    /// of `f`; do not mutate this node from inside.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.value.borrow())
    }

    /// Store `value` and publish it to every interface node.
    pub fn set(&self, value: T) {
        *self.state.value.borrow_mut() = value.clone();
        let payload: Payload = Rc::new(value);
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface)
                .publish(self.tube.name(), &payload);
        });
    }

    /// Attach an application callback, invoked when an interface write
    /// arrives at this model.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Attach a caller-owned shared callback by identity.
    pub fn connect_shared(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.connect_shared(callback);
    }

    /// Remove a shared callback by identity.
    pub fn disconnect(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.disconnect(callback);
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }

    /// Derive a read-write interface node mirroring the current value.
    #[must_use]
    pub fn interface_node(&self) -> InterfaceValue<T> {
        InterfaceValue::attach(self.tube.name(), self.get())
    }

    /// Derive a read-only interface node.
    #[must_use]
    pub fn read_only_node(&self) -> ReadOnlyValue<T> {
        ReadOnlyValue::attach(self.tube.name(), self.get())
    }

    /// Derive a filtered read-write interface node.
    #[must_use]
    pub fn filtered_node(&self) -> FilteredInterfaceValue<T> {
        FilteredInterfaceValue::attach(self.tube.name(), self.get())
    }

    /// Derive a filtered read-only interface node.
    #[must_use]
    pub fn filtered_read_only_node(&self) -> FilteredReadOnlyValue<T> {
        FilteredReadOnlyValue::attach(self.tube.name(), self.get())
    }
}

impl<T: Clone + 'static> BatchNode<T> for ModelValue<T> {
    fn node_name(&self) -> &str {
        self.tube.name()
    }

    fn peek(&self) -> T {
        self.get()
    }

    fn set_without_notify(&self, value: T) {
        *self.state.value.borrow_mut() = value;
    }

    fn notify(&self) {
        let payload: Payload = Rc::new(self.get());
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface)
                .publish(self.tube.name(), &payload);
        });
    }
}

impl<T: Clone + 'static> Drop for ModelValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Model).unsubscribe(&self.handler);
        });
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for ModelValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelValue")
            .field("name", &self.tube.name())
            .field("value", &*self.state.value.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FilteredModelValue
// ---------------------------------------------------------------------------

struct FilteredModelState<T: Clone + 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
    filter_on_set: FilterSlot<T>,
}

/// A model node whose writes pass through an attachable set-filter.
///
/// The filter applies to `set`, to silent batch writes, and to incoming
/// interface writes. `set_unfiltered` bypasses it.
pub struct FilteredModelValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<FilteredModelState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> FilteredModelValue<T> {
    /// Create the model node for `name`. The initial value is not filtered.
    pub fn create(name: impl Into<String>, initial: T) -> Result<Self, NodeError> {
        let tube = Tube::model(name)?;
        let state = Rc::new(FilteredModelState {
            value: RefCell::new(initial),
            callbacks: CallbackList::new(),
            filter_on_set: FilterSlot::new(),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                let filtered = state.filter_on_set.apply(value);
                *state.value.borrow_mut() = filtered.clone();
                state.callbacks.invoke(&filtered);
                let republished: Payload = Rc::new(filtered);
                with_value_manifolds(|pair| {
                    pair.side(NodeRole::Interface).publish(&name, &republished);
                });
            })
        };

        with_value_manifolds(|pair| {
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

    /// Current value, cloned out.
    #[must_use]
    pub fn get(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Store the filtered input and publish it to every interface node.
    pub fn set(&self, value: T) {
        let filtered = self.state.filter_on_set.apply(&value);
        self.publish_stored(filtered);
    }

    /// Store and publish `value`, bypassing the set-filter.
    pub fn set_unfiltered(&self, value: T) {
        self.publish_stored(value);
    }

    fn publish_stored(&self, value: T) {
        *self.state.value.borrow_mut() = value.clone();
        let payload: Payload = Rc::new(value);
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface)
                .publish(self.tube.name(), &payload);
        });
    }

    /// Attach the set-filter. The slot holds the filter weakly; dropping the
    /// caller's `Rc` restores the identity filter.
    pub fn attach_filter_on_set(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.state.filter_on_set.attach(filter);
    }

    /// Attach an application callback.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Attach a caller-owned shared callback by identity.
    pub fn connect_shared(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.connect_shared(callback);
    }

    /// Remove a shared callback by identity.
    pub fn disconnect(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.disconnect(callback);
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }

    /// Derive a read-write interface node mirroring the current value.
    #[must_use]
    pub fn interface_node(&self) -> InterfaceValue<T> {
        InterfaceValue::attach(self.tube.name(), self.get())
    }

    /// Derive a read-only interface node.
    #[must_use]
    pub fn read_only_node(&self) -> ReadOnlyValue<T> {
        ReadOnlyValue::attach(self.tube.name(), self.get())
    }

    /// Derive a filtered read-write interface node.
    #[must_use]
    pub fn filtered_node(&self) -> FilteredInterfaceValue<T> {
        FilteredInterfaceValue::attach(self.tube.name(), self.get())
    }
}

impl<T: Clone + 'static> BatchNode<T> for FilteredModelValue<T> {
    fn node_name(&self) -> &str {
        self.tube.name()
    }

    fn peek(&self) -> T {
        self.get()
    }

    fn set_without_notify(&self, value: T) {
        let filtered = self.state.filter_on_set.apply(&value);
        *self.state.value.borrow_mut() = filtered;
    }

    fn notify(&self) {
        let payload: Payload = Rc::new(self.get());
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface)
                .publish(self.tube.name(), &payload);
        });
    }
}

impl<T: Clone + 'static> Drop for FilteredModelValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Model).unsubscribe(&self.handler);
        });
    }
}

// ---------------------------------------------------------------------------
// InterfaceValue
// ---------------------------------------------------------------------------

struct InterfaceState<T: 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
    writing: Cell<bool>,
}

/// A read-write proxy for a model value.
///
/// Holds no reference to the model; the subscription handler performs the
/// only cache write. If the model dies, the cache stays at the last
/// synchronized value and writes reach nobody.
pub struct InterfaceValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<InterfaceState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> InterfaceValue<T> {
    pub(crate) fn attach(name: &str, current: T) -> Self {
        let tube = Tube::interface(name);
        let state = Rc::new(InterfaceState {
            value: RefCell::new(current),
            callbacks: CallbackList::new(),
            writing: Cell::new(false),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                *state.value.borrow_mut() = value.clone();
                if !state.writing.get() {
                    state.callbacks.invoke(value);
                }
            })
        };

        with_value_manifolds(|pair| {
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

    /// Last synchronized value, cloned out.
    #[must_use]
    pub fn get(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Publish `value` to the model.
    ///
    /// The model's republish converges this node's cache; local callbacks are
    /// suppressed for the originating write.
    pub fn set(&self, value: T) {
        self.state.writing.set(true);
        let payload: Payload = Rc::new(value);
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Model)
                .publish(self.tube.name(), &payload);
        });
        self.state.writing.set(false);
    }

    /// Attach an application callback, invoked when the model publishes.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Attach a caller-owned shared callback by identity.
    pub fn connect_shared(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.connect_shared(callback);
    }

    /// Remove a shared callback by identity.
    pub fn disconnect(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.disconnect(callback);
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }
}

impl<T: Clone + 'static> Drop for InterfaceValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface).unsubscribe(&self.handler);
        });
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for InterfaceValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceValue")
            .field("name", &self.tube.name())
            .field("value", &*self.state.value.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ReadOnlyValue
// ---------------------------------------------------------------------------

struct ReadOnlyState<T: 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
}

/// A read-only observer for a model value.
pub struct ReadOnlyValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<ReadOnlyState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> ReadOnlyValue<T> {
    pub(crate) fn attach(name: &str, current: T) -> Self {
        let tube = Tube::interface(name);
        let state = Rc::new(ReadOnlyState {
            value: RefCell::new(current),
            callbacks: CallbackList::new(),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                *state.value.borrow_mut() = value.clone();
                state.callbacks.invoke(value);
            })
        };

        with_value_manifolds(|pair| {
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

    /// Last synchronized value, cloned out.
    #[must_use]
    pub fn get(&self) -> T {
        self.state.value.borrow().clone()
    }

    /// Attach an application callback, invoked when the model publishes.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }
}

impl<T: Clone + 'static> Drop for ReadOnlyValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface).unsubscribe(&self.handler);
        });
    }
}

// ---------------------------------------------------------------------------
// FilteredReadOnlyValue
// ---------------------------------------------------------------------------

struct FilteredReadOnlyState<T: Clone + 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
    filter_on_get: FilterSlot<T>,
}

/// A read-only observer whose reads pass through an attachable get-filter.
pub struct FilteredReadOnlyValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<FilteredReadOnlyState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> FilteredReadOnlyValue<T> {
    pub(crate) fn attach(name: &str, current: T) -> Self {
        let tube = Tube::interface(name);
        let state = Rc::new(FilteredReadOnlyState {
            value: RefCell::new(current),
            callbacks: CallbackList::new(),
            filter_on_get: FilterSlot::new(),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                *state.value.borrow_mut() = value.clone();
                state.callbacks.invoke(&state.filter_on_get.apply(value));
            })
        };

        with_value_manifolds(|pair| {
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

    /// Last synchronized value, routed through the get-filter.
    #[must_use]
    pub fn get(&self) -> T {
        let raw = self.state.value.borrow().clone();
        self.state.filter_on_get.apply(&raw)
    }

    /// Attach the get-filter. Held weakly; dropping the caller's `Rc`
    /// restores the identity filter.
    pub fn attach_filter_on_get(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.state.filter_on_get.attach(filter);
    }

    /// Attach an application callback; it observes get-filtered values.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }
}

impl<T: Clone + 'static> Drop for FilteredReadOnlyValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface).unsubscribe(&self.handler);
        });
    }
}

// ---------------------------------------------------------------------------
// FilteredInterfaceValue
// ---------------------------------------------------------------------------

struct FilteredInterfaceState<T: Clone + 'static> {
    value: RefCell<T>,
    callbacks: CallbackList<T>,
    writing: Cell<bool>,
    filter_on_get: FilterSlot<T>,
    filter_on_set: FilterSlot<T>,
}

/// A read-write interface node with attachable get/set filters.
///
/// The cache stores the raw model-side value; `get` and local callbacks see
/// it through the get-filter, and `set` routes its input through the
/// set-filter before publishing.
pub struct FilteredInterfaceValue<T: Clone + 'static> {
    tube: Tube,
    state: Rc<FilteredInterfaceState<T>>,
    handler: Rc<dyn Fn(&Payload)>,
}

impl<T: Clone + 'static> FilteredInterfaceValue<T> {
    pub(crate) fn attach(name: &str, current: T) -> Self {
        let tube = Tube::interface(name);
        let state = Rc::new(FilteredInterfaceState {
            value: RefCell::new(current),
            callbacks: CallbackList::new(),
            writing: Cell::new(false),
            filter_on_get: FilterSlot::new(),
            filter_on_set: FilterSlot::new(),
        });

        let handler: Rc<dyn Fn(&Payload)> = {
            let state = Rc::clone(&state);
            let name = tube.name_handle();
            Rc::new(move |payload: &Payload| {
                let Some(value) = downcast::<T>(&name, payload) else {
                    return;
                };
                *state.value.borrow_mut() = value.clone();
                if !state.writing.get() {
                    state.callbacks.invoke(&state.filter_on_get.apply(value));
                }
            })
        };

        with_value_manifolds(|pair| {
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

    /// Last synchronized value, routed through the get-filter.
    #[must_use]
    pub fn get(&self) -> T {
        let raw = self.state.value.borrow().clone();
        self.state.filter_on_get.apply(&raw)
    }

    /// Publish the set-filtered input to the model.
    pub fn set(&self, value: T) {
        let filtered = self.state.filter_on_set.apply(&value);
        self.state.writing.set(true);
        let payload: Payload = Rc::new(filtered);
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Model)
                .publish(self.tube.name(), &payload);
        });
        self.state.writing.set(false);
    }

    /// Attach the get-filter. Held weakly; dropping the caller's `Rc`
    /// restores the identity filter.
    pub fn attach_filter_on_get(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.state.filter_on_get.attach(filter);
    }

    /// Attach the set-filter. Held weakly; dropping the caller's `Rc`
    /// restores the identity filter.
    pub fn attach_filter_on_set(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.state.filter_on_set.attach(filter);
    }

    /// Attach an application callback; it observes get-filtered values.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.state.callbacks.connect(callback)
    }

    /// Attach a caller-owned shared callback by identity.
    pub fn connect_shared(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.connect_shared(callback);
    }

    /// Remove a shared callback by identity.
    pub fn disconnect(&self, callback: &Rc<dyn Fn(&T)>) {
        self.state.callbacks.disconnect(callback);
    }

    /// Remove every application callback attached to this node.
    pub fn disconnect_all(&self) {
        self.state.callbacks.clear();
    }
}

impl<T: Clone + 'static> Drop for FilteredInterfaceValue<T> {
    fn drop(&mut self) {
        with_value_manifolds(|pair| {
            pair.side(NodeRole::Interface).unsubscribe(&self.handler);
        });
    }
}
