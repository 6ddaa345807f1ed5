#![forbid(unsafe_code)]

//! A tracked selection over a published list of choices.
//!
//! A [`ChooserModel`] bundles two model nodes: `<name>.selection` (an index)
//! and `<name>.choices` (the list). The selected *value* is derived; writing
//! a value that is not among the choices appends it rather than failing, so
//! a stale interface can never wedge the model.

use tether_core::{
    BatchNode, Connection, InterfaceValue, ModelValue, NodeError, ReadOnlyValue, ValueContext,
};
use tracing::warn;

/// The authoritative end of a choice list with a tracked selection.
pub struct ChooserModel<T: PartialEq + Clone + 'static> {
    /// Index into the choices list.
    pub selection: ModelValue<usize>,
    /// The available choices.
    pub choices: ModelValue<Vec<T>>,
}

impl<T: PartialEq + Clone + 'static> ChooserModel<T> {
    /// Create with `value` as the only choice.
    pub fn create(name: impl Into<String>, value: T) -> Result<Self, NodeError> {
        Self::create_with_choices(name, value, Vec::new())
    }

    /// Create with an explicit choice list. A `value` missing from the list
    /// is appended (with a warning) rather than rejected.
    pub fn create_with_choices(
        name: impl Into<String>,
        value: T,
        mut choices: Vec<T>,
    ) -> Result<Self, NodeError> {
        let name = name.into();
        let selection = match choices.iter().position(|choice| *choice == value) {
            Some(index) => index,
            None => {
                if !choices.is_empty() {
                    warn!(name = %name, "initial value missing from choices; appending");
                }
                choices.push(value);
                choices.len() - 1
            }
        };

        Ok(Self {
            selection: ModelValue::create(format!("{name}.selection"), selection)?,
            choices: ModelValue::create(format!("{name}.choices"), choices)?,
        })
    }

    /// The currently selected choice.
    #[must_use]
    pub fn get(&self) -> T {
        self.choices.with(|choices| choices[self.selection.get()].clone())
    }

    /// Select `value`, appending it to the choices if absent, and publish.
    pub fn set(&self, value: T) {
        BatchNode::set_without_notify(self, value);
        BatchNode::notify(self);
    }

    /// Replace the choice list, keeping the selection on the current value
    /// where possible (falling back to the first entry).
    pub fn set_choices(&self, choices: Vec<T>) {
        let current = self.get();
        let ctx = ValueContext::new(&self.selection);
        match choices.iter().position(|choice| *choice == current) {
            Some(index) => ctx.set(index),
            None => ctx.set(0),
        }
        self.choices.set(choices);
        ctx.commit();
    }

    /// Attach an application callback on the selection node.
    pub fn connect(&self, callback: impl Fn(&usize) + 'static) -> Connection {
        self.selection.connect(callback)
    }

    /// Remove every application callback from the selection node.
    pub fn disconnect_all(&self) {
        self.selection.disconnect_all();
    }

    /// Derive the interface family: writable selection, read-only choices.
    #[must_use]
    pub fn interface(&self) -> ChooserInterface<T> {
        ChooserInterface {
            selection: self.selection.interface_node(),
            choices: self.choices.read_only_node(),
        }
    }
}

impl<T: PartialEq + Clone + 'static> BatchNode<T> for ChooserModel<T> {
    fn node_name(&self) -> &str {
        self.selection.name()
    }

    fn peek(&self) -> T {
        self.get()
    }

    fn set_without_notify(&self, value: T) {
        let existing = self
            .choices
            .with(|choices| choices.iter().position(|choice| *choice == value));
        match existing {
            Some(index) => BatchNode::set_without_notify(&self.selection, index),
            None => {
                warn!(
                    name = self.selection.name(),
                    "value missing from choices; appending"
                );
                let mut choices = self.choices.get();
                choices.push(value);
                let index = choices.len() - 1;
                BatchNode::set_without_notify(&self.choices, choices);
                BatchNode::set_without_notify(&self.selection, index);
            }
        }
    }

    fn notify(&self) {
        BatchNode::notify(&self.selection);
        BatchNode::notify(&self.choices);
    }
}

/// The proxy family of a [`ChooserModel`].
pub struct ChooserInterface<T: PartialEq + Clone + 'static> {
    /// Writable selection index.
    pub selection: InterfaceValue<usize>,
    /// Read-only view of the choices.
    pub choices: ReadOnlyValue<Vec<T>>,
}

impl<T: PartialEq + Clone + 'static> ChooserInterface<T> {
    /// The currently selected choice.
    #[must_use]
    pub fn get(&self) -> T {
        let choices = self.choices.get();
        choices[self.selection.get()].clone()
    }

    /// Select by index.
    pub fn select(&self, index: usize) {
        self.selection.set(index);
    }

    /// Attach an application callback on the selection node.
    pub fn connect(&self, callback: impl Fn(&usize) + 'static) -> Connection {
        self.selection.connect(callback)
    }

    /// Remove every application callback from the selection node.
    pub fn disconnect_all(&self) {
        self.selection.disconnect_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn single_value_seeds_the_choice_list() {
        let chooser = ChooserModel::create("chooser.seed", "red").unwrap();
        assert_eq!(chooser.get(), "red");
        assert_eq!(chooser.choices.get(), vec!["red"]);
    }

    #[test]
    fn explicit_choices_track_the_initial_selection() {
        let chooser =
            ChooserModel::create_with_choices("chooser.explicit", 20, vec![10, 20, 30]).unwrap();
        assert_eq!(chooser.selection.get(), 1);
        assert_eq!(chooser.get(), 20);
    }

    #[test]
    fn setting_an_unknown_value_appends_it() {
        let chooser =
            ChooserModel::create_with_choices("chooser.append", 1, vec![1, 2]).unwrap();
        chooser.set(5);
        assert_eq!(chooser.get(), 5);
        assert_eq!(chooser.choices.get(), vec![1, 2, 5]);
    }

    #[test]
    fn set_choices_keeps_the_current_value_selected() {
        let chooser =
            ChooserModel::create_with_choices("chooser.keep", "b", vec!["a", "b", "c"]).unwrap();
        chooser.set_choices(vec!["z", "b", "y"]);
        assert_eq!(chooser.get(), "b");
        assert_eq!(chooser.selection.get(), 1);
    }

    #[test]
    fn set_choices_falls_back_to_the_first_entry() {
        let chooser =
            ChooserModel::create_with_choices("chooser.fallback", "b", vec!["a", "b"]).unwrap();
        chooser.set_choices(vec!["x", "y"]);
        assert_eq!(chooser.get(), "x");
        assert_eq!(chooser.selection.get(), 0);
    }

    #[test]
    fn interface_selects_by_index_and_observes() {
        let chooser =
            ChooserModel::create_with_choices("chooser.iface", 10, vec![10, 20, 30]).unwrap();
        let interface = chooser.interface();

        let seen = Rc::new(Cell::new(usize::MAX));
        let other = chooser.interface();
        let _c = {
            let seen = Rc::clone(&seen);
            other.connect(move |index| seen.set(*index))
        };

        interface.select(2);
        assert_eq!(chooser.get(), 30);
        assert_eq!(interface.get(), 30);
        assert_eq!(seen.get(), 2);
    }
}
