#![forbid(unsafe_code)]

//! A clamped numeric value with publishing bounds.
//!
//! A [`RangeModel`] bundles three model nodes under one dotted prefix:
//! `<name>.value`, `<name>.minimum`, and `<name>.maximum`. Writes to the
//! value clamp into the bounds; moving a bound re-clamps the value before
//! the bound publishes, so observers never see a value outside the bounds
//! they were last told about.

use std::rc::Rc;

use tether_core::{
    BatchNode, Connection, FilteredInterfaceValue, FilteredReadOnlyValue, ModelValue, NodeError,
    ValueContext,
};

fn clamp<T: PartialOrd + Clone>(value: T, minimum: &T, maximum: &T) -> T {
    if value < *minimum {
        minimum.clone()
    } else if value > *maximum {
        maximum.clone()
    } else {
        value
    }
}

/// The authoritative end of a bounded value.
///
/// Created with coincident bounds (`minimum == maximum == value`); widen
/// them with [`set_minimum`](Self::set_minimum) /
/// [`set_maximum`](Self::set_maximum) to make the range useful.
pub struct RangeModel<T: PartialOrd + Clone + 'static> {
    /// The clamped value node.
    pub value: ModelValue<T>,
    /// The lower bound node.
    pub minimum: ModelValue<T>,
    /// The upper bound node.
    pub maximum: ModelValue<T>,
}

impl<T: PartialOrd + Clone + 'static> RangeModel<T> {
    /// Create the three model nodes under the dotted prefix `name`.
    pub fn create(name: impl Into<String>, value: T) -> Result<Self, NodeError> {
        let name = name.into();
        Ok(Self {
            value: ModelValue::create(format!("{name}.value"), value.clone())?,
            minimum: ModelValue::create(format!("{name}.minimum"), value.clone())?,
            maximum: ModelValue::create(format!("{name}.maximum"), value)?,
        })
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Store and publish `value`, clamped into the current bounds.
    pub fn set(&self, value: T) {
        let clamped = clamp(value, &self.minimum.get(), &self.maximum.get());
        self.value.set(clamped);
    }

    /// Lower the floor (capped at the current maximum), re-clamping the
    /// value first so the bound publishes against a consistent value.
    pub fn set_minimum(&self, minimum: T) {
        let minimum = if minimum > self.maximum.get() {
            self.maximum.get()
        } else {
            minimum
        };

        let ctx = ValueContext::new(&self.minimum);
        ctx.set(minimum.clone());
        if self.value.get() < minimum {
            self.value.set(minimum);
        }
        ctx.commit();
    }

    /// Raise the ceiling (floored at the current minimum), re-clamping the
    /// value first so the bound publishes against a consistent value.
    pub fn set_maximum(&self, maximum: T) {
        let maximum = if maximum < self.minimum.get() {
            self.minimum.get()
        } else {
            maximum
        };

        let ctx = ValueContext::new(&self.maximum);
        ctx.set(maximum.clone());
        if self.value.get() > maximum {
            self.value.set(maximum);
        }
        ctx.commit();
    }

    /// Attach an application callback on the value node.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        self.value.connect(callback)
    }

    /// Remove every application callback from the value node.
    pub fn disconnect_all(&self) {
        self.value.disconnect_all();
    }

    /// Derive the interface family: a filterable value plus read-only bounds.
    #[must_use]
    pub fn interface(&self) -> RangeInterface<T> {
        RangeInterface {
            value: self.value.filtered_node(),
            minimum: self.minimum.filtered_read_only_node(),
            maximum: self.maximum.filtered_read_only_node(),
        }
    }
}

impl<T: PartialOrd + Clone + 'static> BatchNode<T> for RangeModel<T> {
    fn node_name(&self) -> &str {
        self.value.name()
    }

    fn peek(&self) -> T {
        self.value.get()
    }

    fn set_without_notify(&self, value: T) {
        let clamped = clamp(value, &self.minimum.get(), &self.maximum.get());
        BatchNode::set_without_notify(&self.value, clamped);
    }

    fn notify(&self) {
        BatchNode::notify(&self.value);
    }
}

/// The proxy family of a [`RangeModel`]: writable value, read-only bounds.
pub struct RangeInterface<T: Clone + 'static> {
    /// Writable, filterable value node.
    pub value: FilteredInterfaceValue<T>,
    /// Read-only lower bound.
    pub minimum: FilteredReadOnlyValue<T>,
    /// Read-only upper bound.
    pub maximum: FilteredReadOnlyValue<T>,
}

impl<T: Clone + 'static> RangeInterface<T> {
    /// Current value through the get-filter.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Publish a new value to the model.
    pub fn set(&self, value: T) {
        self.value.set(value);
    }

    /// Attach one get-filter across the value and both bounds, so displayed
    /// units stay consistent.
    pub fn attach_filter_on_get(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.value.attach_filter_on_get(filter);
        self.minimum.attach_filter_on_get(filter);
        self.maximum.attach_filter_on_get(filter);
    }

    /// Attach the set-filter on the writable value.
    pub fn attach_filter_on_set(&self, filter: &Rc<dyn Fn(&T) -> T>) {
        self.value.attach_filter_on_set(filter);
    }
}
