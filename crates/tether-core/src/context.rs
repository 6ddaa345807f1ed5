#![forbid(unsafe_code)]

//! Transactional batch contexts.
//!
//! A context groups silent mutations and turns them into one notification
//! pass on [`commit`](ValueContext::commit). Dropping a context without
//! committing rolls every touched node back to its pre-transaction value and
//! suppresses notification entirely; the caller's error propagates through
//! ordinary `Result` flow.
//!
//! # Invariants
//!
//! 1. No node notifies while a context is open; `commit` notifies each
//!    distinct touched node exactly once.
//! 2. Rollback restores each node to its *first* recorded value, however many
//!    times it was touched.
//! 3. Rollback never notifies.

use ahash::AHashSet;
use tracing::debug;

/// The contract batch contexts drive nodes through.
///
/// Implemented by the model-side node types. The silent-write and notify
/// operations exist for contexts; application code should prefer `set`.
pub trait BatchNode<T> {
    /// The node name (used to deduplicate notification).
    fn node_name(&self) -> &str;

    /// Current value, cloned out.
    fn peek(&self) -> T;

    /// Store without publishing.
    fn set_without_notify(&self, value: T);

    /// Publish the currently stored value.
    fn notify(&self);
}

// ---------------------------------------------------------------------------
// ValueContext
// ---------------------------------------------------------------------------

/// A transaction over a single node.
///
/// ```
/// use tether_core::{ModelValue, ValueContext};
///
/// let node = ModelValue::create("ctx.doc", 1).unwrap();
/// let ctx = ValueContext::new(&node);
/// ctx.set(2);
/// ctx.commit(); // one notification
/// assert_eq!(node.get(), 2);
/// ```
#[must_use = "dropping an uncommitted context rolls the node back"]
pub struct ValueContext<'a, T: Clone, N: BatchNode<T>> {
    node: &'a N,
    original: T,
    committed: bool,
}

impl<'a, T: Clone, N: BatchNode<T>> ValueContext<'a, T, N> {
    /// Open a transaction, snapshotting the node's current value.
    pub fn new(node: &'a N) -> Self {
        Self {
            node,
            original: node.peek(),
            committed: false,
        }
    }

    /// Store `value` silently.
    pub fn set(&self, value: T) {
        self.node.set_without_notify(value);
    }

    /// Close the transaction and notify once.
    pub fn commit(mut self) {
        self.committed = true;
        self.node.notify();
    }
}

impl<T: Clone, N: BatchNode<T>> Drop for ValueContext<'_, T, N> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(node = self.node.node_name(), "rolling back value context");
            self.node.set_without_notify(self.original.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// MultipleValueContext
// ---------------------------------------------------------------------------

struct BatchEntry<'a> {
    name: String,
    rollback: Box<dyn Fn() + 'a>,
    notify: Box<dyn Fn() + 'a>,
}

/// A transaction over any number of heterogeneous nodes.
///
/// Every `set` appends a snapshot entry, so one node may be touched several
/// times; rollback applies snapshots in reverse so the first recorded value
/// wins.
#[must_use = "dropping an uncommitted context rolls every touched node back"]
#[derive(Default)]
pub struct MultipleValueContext<'a> {
    entries: Vec<BatchEntry<'a>>,
    committed: bool,
}

impl<'a> MultipleValueContext<'a> {
    /// Open an empty transaction.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            committed: false,
        }
    }

    /// Snapshot `node` and store `value` silently.
    pub fn set<T: Clone + 'a, N: BatchNode<T>>(&mut self, node: &'a N, value: T) {
        let original = node.peek();
        self.entries.push(BatchEntry {
            name: node.node_name().to_string(),
            rollback: Box::new(move || node.set_without_notify(original.clone())),
            notify: Box::new(move || node.notify()),
        });
        node.set_without_notify(value);
    }

    /// Number of recorded snapshot entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no node has been touched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Close the transaction, notifying each distinct node exactly once in
    /// first-touch order.
    pub fn commit(mut self) {
        self.committed = true;
        let mut seen: AHashSet<&str> = AHashSet::new();
        for entry in &self.entries {
            if seen.insert(entry.name.as_str()) {
                (entry.notify)();
            }
        }
    }
}

impl Drop for MultipleValueContext<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(
                touched = self.entries.len(),
                "rolling back multiple value context"
            );
            for entry in self.entries.iter().rev() {
                (entry.rollback)();
            }
        }
    }
}
