#![forbid(unsafe_code)]

//! The manifold: a name-keyed, weak-callback pub/sub registry.
//!
//! A [`Manifold`] holds a many-to-many table between topics (node names) and
//! subscriber callbacks. Subscribers are stored behind [`Weak`] handles; the
//! node that subscribes owns the strong [`Rc`] of its handler and disconnects
//! explicitly on drop. Lazy pruning during [`Manifold::publish`] is the
//! backstop for handles whose owner skipped explicit disconnection.
//!
//! Two thread-local singleton pairs connect the model side to the interface
//! side: one pair for value traffic (type-erased [`Payload`]s) and one for
//! signal traffic (no payload). Every node of a given kind talks to the same
//! pair.
//!
//! # Invariants
//!
//! 1. The topic→subscribers and subscriber→topics maps are mutual inverses at
//!    all times.
//! 2. Removing the last subscriber of a topic removes the topic entry
//!    entirely; no empty-set entries linger.
//! 3. A callback's identity is the pointer of its `Rc` referent, so the same
//!    shared callback subscribed under several topics collapses to a single
//!    subscriber entry.
//! 4. `publish` snapshots the subscriber set before invoking anything, so a
//!    callback may subscribe, unsubscribe (even itself), or publish
//!    re-entrantly without poisoning the iteration.
//! 5. Forgetting a subscriber twice is a no-op.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

use crate::tube::NodeRole;

/// Type-erased value payload published through the value manifolds.
///
/// Shared so that one publish fans out to any number of subscribers without
/// cloning the underlying value per subscriber.
pub(crate) type Payload = Rc<dyn Any>;

/// Identity of a subscribed callback, derived from its `Rc` referent pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CallbackId(usize);

/// The identity key for a shared callback.
pub(crate) fn callback_id<A>(callback: &Rc<dyn Fn(&A)>) -> CallbackId {
    CallbackId(Rc::as_ptr(callback) as *const () as usize)
}

struct Subscriber<A: ?Sized + 'static> {
    callback: Weak<dyn Fn(&A)>,
    topics: AHashSet<String>,
}

struct ManifoldState<A: 'static> {
    subscribers_by_topic: AHashMap<String, Vec<CallbackId>>,
    subscribers: AHashMap<CallbackId, Subscriber<A>>,
}

/// A name-keyed weak-callback registry over payloads of type `A`.
pub(crate) struct Manifold<A: 'static> {
    state: RefCell<ManifoldState<A>>,
}

impl<A: 'static> Manifold<A> {
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(ManifoldState {
                subscribers_by_topic: AHashMap::new(),
                subscribers: AHashMap::new(),
            }),
        }
    }

    /// Register `callback` under `topic`, reusing the subscriber entry when
    /// the callback is already known.
    pub(crate) fn subscribe(&self, topic: &str, callback: &Rc<dyn Fn(&A)>) {
        let id = callback_id(callback);
        let mut state = self.state.borrow_mut();
        let ManifoldState {
            subscribers_by_topic,
            subscribers,
        } = &mut *state;

        let subscriber = subscribers.entry(id).or_insert_with(|| Subscriber {
            callback: Rc::downgrade(callback),
            topics: AHashSet::new(),
        });

        if subscriber.topics.insert(topic.to_string()) {
            subscribers_by_topic
                .entry(topic.to_string())
                .or_default()
                .push(id);
            trace!(topic, ?id, "manifold subscribe");
        }
    }

    /// Remove every registration of `callback`.
    pub(crate) fn unsubscribe(&self, callback: &Rc<dyn Fn(&A)>) {
        self.forget(callback_id(callback));
    }

    /// Remove every registration of the subscriber with `id`. Idempotent.
    pub(crate) fn forget(&self, id: CallbackId) {
        let mut state = self.state.borrow_mut();
        let Some(subscriber) = state.subscribers.remove(&id) else {
            return;
        };

        for topic in &subscriber.topics {
            if let Some(ids) = state.subscribers_by_topic.get_mut(topic) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    state.subscribers_by_topic.remove(topic);
                }
            }
        }
        trace!(?id, "manifold forget");
    }

    /// Remove every callback registered under `topic`.
    pub(crate) fn unsubscribe_topic(&self, topic: &str) {
        let mut state = self.state.borrow_mut();
        let Some(ids) = state.subscribers_by_topic.remove(topic) else {
            return;
        };

        for id in ids {
            if let Some(subscriber) = state.subscribers.get_mut(&id) {
                subscriber.topics.remove(topic);
                if subscriber.topics.is_empty() {
                    state.subscribers.remove(&id);
                }
            }
        }
    }

    /// Invoke every live subscriber of `topic`, synchronously, on the calling
    /// thread.
    ///
    /// The subscriber set is snapshotted before iteration; dead handles are
    /// never invoked and are pruned once the pass completes.
    pub(crate) fn publish(&self, topic: &str, payload: &A) {
        let snapshot: Vec<(CallbackId, Weak<dyn Fn(&A)>)> = {
            let state = self.state.borrow();
            let Some(ids) = state.subscribers_by_topic.get(topic) else {
                return;
            };
            ids.iter()
                .filter_map(|id| {
                    state
                        .subscribers
                        .get(id)
                        .map(|subscriber| (*id, subscriber.callback.clone()))
                })
                .collect()
        };

        trace!(topic, subscribers = snapshot.len(), "manifold publish");

        let mut dead = Vec::new();
        for (id, weak) in snapshot {
            match weak.upgrade() {
                Some(callback) => callback(payload),
                None => dead.push(id),
            }
        }

        for id in dead {
            debug!(topic, ?id, "pruning dead subscriber");
            self.forget(id);
        }
    }

    /// Whether `topic` has at least one subscriber entry.
    #[cfg(test)]
    pub(crate) fn has_topic(&self, topic: &str) -> bool {
        self.state.borrow().subscribers_by_topic.contains_key(topic)
    }

    /// Number of topics with live entries.
    #[cfg(test)]
    pub(crate) fn topic_count(&self) -> usize {
        self.state.borrow().subscribers_by_topic.len()
    }

    /// Number of registered subscribers.
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }
}

// ---------------------------------------------------------------------------
// Singleton pairs
// ---------------------------------------------------------------------------

/// The model-side and interface-side manifolds for one node kind.
pub(crate) struct ManifoldPair<A: 'static> {
    model: Manifold<A>,
    interface: Manifold<A>,
}

impl<A: 'static> ManifoldPair<A> {
    fn new() -> Self {
        Self {
            model: Manifold::new(),
            interface: Manifold::new(),
        }
    }

    /// The manifold serving one side of the pair.
    ///
    /// A node subscribes on the side matching its own role and publishes to
    /// the opposite side.
    pub(crate) fn side(&self, role: NodeRole) -> &Manifold<A> {
        match role {
            NodeRole::Model => &self.model,
            NodeRole::Interface => &self.interface,
        }
    }
}

thread_local! {
    static VALUE_MANIFOLDS: ManifoldPair<Payload> = ManifoldPair::new();
    static SIGNAL_MANIFOLDS: ManifoldPair<()> = ManifoldPair::new();
}

/// Run `f` against the process-wide value manifold pair.
pub(crate) fn with_value_manifolds<R>(f: impl FnOnce(&ManifoldPair<Payload>) -> R) -> R {
    VALUE_MANIFOLDS.with(f)
}

/// Run `f` against the process-wide signal manifold pair.
pub(crate) fn with_signal_manifolds<R>(f: impl FnOnce(&ManifoldPair<()>) -> R) -> R {
    SIGNAL_MANIFOLDS.with(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter_callback(count: &Rc<Cell<usize>>) -> Rc<dyn Fn(&u32)> {
        let count = Rc::clone(count);
        Rc::new(move |_: &u32| count.set(count.get() + 1))
    }

    #[test]
    fn publish_reaches_each_subscriber_once() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));
        let callback = counter_callback(&count);

        manifold.subscribe("topic", &callback);
        manifold.publish("topic", &7);
        assert_eq!(count.get(), 1);

        manifold.publish("other", &7);
        assert_eq!(count.get(), 1, "unrelated topics must not dispatch");
    }

    #[test]
    fn same_callback_under_two_topics_is_one_subscriber() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));
        let callback = counter_callback(&count);

        manifold.subscribe("a", &callback);
        manifold.subscribe("b", &callback);
        assert_eq!(manifold.subscriber_count(), 1);
        assert_eq!(manifold.topic_count(), 2);

        manifold.unsubscribe(&callback);
        assert_eq!(manifold.subscriber_count(), 0);
        assert_eq!(manifold.topic_count(), 0, "no empty topic entries");
    }

    #[test]
    fn duplicate_subscribe_is_collapsed() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));
        let callback = counter_callback(&count);

        manifold.subscribe("topic", &callback);
        manifold.subscribe("topic", &callback);
        manifold.publish("topic", &1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dead_subscriber_is_never_invoked_and_gets_pruned() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));

        let live = counter_callback(&count);
        manifold.subscribe("topic", &live);

        {
            let short_lived = counter_callback(&count);
            manifold.subscribe("topic", &short_lived);
        }

        manifold.publish("topic", &1);
        assert_eq!(count.get(), 1, "only the live callback fires");
        assert_eq!(manifold.subscriber_count(), 1, "dead entry pruned");
    }

    #[test]
    fn forget_is_idempotent() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));
        let callback = counter_callback(&count);

        manifold.subscribe("topic", &callback);
        let id = callback_id(&callback);
        manifold.forget(id);
        manifold.forget(id);
        assert_eq!(manifold.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_topic_clears_every_registration() {
        let manifold: Manifold<u32> = Manifold::new();
        let count = Rc::new(Cell::new(0));
        let first = counter_callback(&count);
        let second = counter_callback(&count);

        manifold.subscribe("topic", &first);
        manifold.subscribe("topic", &second);
        manifold.subscribe("kept", &second);

        manifold.unsubscribe_topic("topic");
        assert!(!manifold.has_topic("topic"));
        assert_eq!(
            manifold.subscriber_count(),
            1,
            "subscriber with no remaining topics is dropped"
        );

        manifold.publish("topic", &1);
        assert_eq!(count.get(), 0);
        manifold.publish("kept", &1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself_during_publish() {
        let manifold: Rc<Manifold<u32>> = Rc::new(Manifold::new());
        let count = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Rc<dyn Fn(&u32)>>>> = Rc::new(RefCell::new(None));
        let callback: Rc<dyn Fn(&u32)> = {
            let manifold = Rc::clone(&manifold);
            let count = Rc::clone(&count);
            let slot = Rc::clone(&slot);
            Rc::new(move |_: &u32| {
                count.set(count.get() + 1);
                if let Some(this) = slot.borrow().as_ref() {
                    manifold.unsubscribe(this);
                }
            })
        };
        *slot.borrow_mut() = Some(Rc::clone(&callback));

        manifold.subscribe("topic", &callback);
        manifold.publish("topic", &1);
        assert_eq!(count.get(), 1);

        manifold.publish("topic", &1);
        assert_eq!(count.get(), 1, "self-unsubscribed callback stays silent");
    }

    #[test]
    fn callback_may_subscribe_another_during_publish() {
        let manifold: Rc<Manifold<u32>> = Rc::new(Manifold::new());
        let count = Rc::new(Cell::new(0));
        let late = counter_callback(&count);

        let recruiting: Rc<dyn Fn(&u32)> = {
            let manifold = Rc::clone(&manifold);
            let late = Rc::clone(&late);
            Rc::new(move |_: &u32| manifold.subscribe("topic", &late))
        };

        manifold.subscribe("topic", &recruiting);
        manifold.publish("topic", &1);
        assert_eq!(count.get(), 0, "late subscriber misses the current pass");

        manifold.publish("topic", &1);
        assert_eq!(count.get(), 1, "late subscriber sees the next pass");
    }
}
