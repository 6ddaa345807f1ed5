#![forbid(unsafe_code)]

//! Per-node application callback lists.
//!
//! The manifold connects *roles*; a [`CallbackList`] connects the application
//! callbacks attached to one node via `connect`. Entries are weak: the
//! returned [`Connection`] guard owns the callback, so dropping the guard
//! disconnects before the next notification pass. Shared callbacks may also
//! be registered by identity and removed explicitly, or pruned automatically
//! once their owner drops the `Rc`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::manifold::{CallbackId, callback_id};

type Entries<T> = Rc<RefCell<Vec<(CallbackId, Weak<dyn Fn(&T)>)>>>;

/// Keeps a `connect`-registered callback alive.
///
/// Dropping the `Connection` disconnects the callback; it will not be invoked
/// by any later notification.
#[must_use = "dropping this guard disconnects the callback"]
pub struct Connection {
    _callback: Rc<dyn std::any::Any>,
    detach: Box<dyn Fn()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        (self.detach)();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish()
    }
}

/// The ordered set of application callbacks attached to one node.
pub(crate) struct CallbackList<T: 'static> {
    entries: Entries<T>,
}

impl<T: 'static> CallbackList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Attach `callback`, returning the guard that owns it.
    pub(crate) fn connect(&self, callback: impl Fn(&T) + 'static) -> Connection {
        let callback: Rc<dyn Fn(&T)> = Rc::new(callback);
        let id = callback_id(&callback);
        self.entries
            .borrow_mut()
            .push((id, Rc::downgrade(&callback)));

        let entries = Rc::downgrade(&self.entries);
        Connection {
            _callback: Rc::new(callback),
            detach: Box::new(move || {
                if let Some(entries) = entries.upgrade() {
                    entries.borrow_mut().retain(|(other, _)| *other != id);
                }
            }),
        }
    }

    /// Attach a caller-owned shared callback by identity.
    ///
    /// The entry lives as long as the caller keeps the `Rc`; once the owner
    /// drops it, the entry is pruned during the next notification.
    pub(crate) fn connect_shared(&self, callback: &Rc<dyn Fn(&T)>) {
        let id = callback_id(callback);
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|(other, _)| *other == id) {
            return;
        }
        entries.push((id, Rc::downgrade(callback)));
    }

    /// Remove a shared callback by identity.
    pub(crate) fn disconnect(&self, callback: &Rc<dyn Fn(&T)>) {
        let id = callback_id(callback);
        self.entries
            .borrow_mut()
            .retain(|(other, _)| *other != id);
    }

    /// Remove every attached callback.
    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Invoke every live callback with `value`, pruning dead entries.
    pub(crate) fn invoke(&self, value: &T) {
        let snapshot: Vec<(CallbackId, Weak<dyn Fn(&T)>)> =
            self.entries.borrow().clone();

        let mut dead = Vec::new();
        for (id, weak) in snapshot {
            match weak.upgrade() {
                Some(callback) => callback(value),
                None => dead.push(id),
            }
        }

        if !dead.is_empty() {
            debug!(count = dead.len(), "pruning dead node callbacks");
            self.entries
                .borrow_mut()
                .retain(|(id, _)| !dead.contains(id));
        }
    }

    /// Number of registered entries (live or not yet pruned).
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn connect_invokes_until_guard_drops() {
        let list: CallbackList<i32> = CallbackList::new();
        let seen = Rc::new(Cell::new(0));

        let guard = {
            let seen = Rc::clone(&seen);
            list.connect(move |value| seen.set(*value))
        };

        list.invoke(&42);
        assert_eq!(seen.get(), 42);

        drop(guard);
        list.invoke(&7);
        assert_eq!(seen.get(), 42, "disconnected callback must stay silent");
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn shared_callback_is_pruned_when_owner_drops() {
        let list: CallbackList<i32> = CallbackList::new();
        let seen = Rc::new(Cell::new(0));

        {
            let seen = Rc::clone(&seen);
            let shared: Rc<dyn Fn(&i32)> = Rc::new(move |value| seen.set(*value));
            list.connect_shared(&shared);
            list.invoke(&5);
            assert_eq!(list.len(), 1);
        }

        list.invoke(&9);
        assert_eq!(seen.get(), 5, "dead shared callback must not fire");
        assert_eq!(list.len(), 0, "dead entry pruned after invocation");
    }

    #[test]
    fn shared_callback_registers_once() {
        let list: CallbackList<i32> = CallbackList::new();
        let count = Rc::new(Cell::new(0));

        let shared: Rc<dyn Fn(&i32)> = {
            let count = Rc::clone(&count);
            Rc::new(move |_| count.set(count.get() + 1))
        };
        list.connect_shared(&shared);
        list.connect_shared(&shared);

        list.invoke(&0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn disconnect_removes_by_identity() {
        let list: CallbackList<i32> = CallbackList::new();
        let count = Rc::new(Cell::new(0));

        let shared: Rc<dyn Fn(&i32)> = {
            let count = Rc::clone(&count);
            Rc::new(move |_| count.set(count.get() + 1))
        };
        list.connect_shared(&shared);
        list.disconnect(&shared);

        list.invoke(&0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn callback_may_disconnect_itself_mid_invoke() {
        let list = Rc::new(CallbackList::<i32>::new());
        let count = Rc::new(Cell::new(0));

        let guard: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));
        let connection = {
            let count = Rc::clone(&count);
            let guard = Rc::clone(&guard);
            list.connect(move |_| {
                count.set(count.get() + 1);
                guard.borrow_mut().take();
            })
        };
        *guard.borrow_mut() = Some(connection);

        list.invoke(&0);
        list.invoke(&0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clear_detaches_everything() {
        let list: CallbackList<i32> = CallbackList::new();
        let count = Rc::new(Cell::new(0));

        let shared: Rc<dyn Fn(&i32)> = {
            let count = Rc::clone(&count);
            Rc::new(move |_| count.set(count.get() + 1))
        };
        list.connect_shared(&shared);
        list.clear();

        list.invoke(&0);
        assert_eq!(count.get(), 0);
    }
}
