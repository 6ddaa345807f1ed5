#![forbid(unsafe_code)]

//! The process-wide derived-class registry.
//!
//! Every node family generated by [`transform!`](crate::transform) registers
//! itself here on first construction, keyed by `(series kind, qualified
//! schema name)`. The registry is append-only — entries are never evicted —
//! and registration is idempotent, so nesting one schema inside many others
//! reuses the single derived family rather than growing the table.
//!
//! # Invariants
//!
//! 1. A `(series, schema)` key maps to at most one derived type for the life
//!    of the process; re-registration with a different type keeps the first
//!    entry and logs a warning.
//! 2. Generic schema instantiations register under their full type name, so
//!    each instantiation is its own key.

use std::any::TypeId;
use std::cell::RefCell;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::series::SeriesKind;

/// The kind of one schema field, as declared in `transform!`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A synchronized value leaf.
    Value,
    /// A stateless signal leaf (absent from the plain schema struct).
    Signal,
    /// A previously transformed schema, reused as a nested family. Carries
    /// the nested schema's qualified name.
    Nested(&'static str),
}

/// One field of a transformed schema, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field name; leaf nodes are named `"<owner>.<field>"`.
    pub name: &'static str,
    /// How the field maps onto the derived family.
    pub kind: FieldKind,
}

/// Registry entry describing one derived node family.
#[derive(Clone, Debug)]
pub struct DerivedClass {
    /// Which family this entry describes.
    pub series: SeriesKind,
    /// Qualified name of the schema the family was derived from.
    pub schema: &'static str,
    /// Type identity of the derived family.
    pub derived: TypeId,
    /// Qualified name of the derived family.
    pub derived_name: &'static str,
    /// The schema's field list, in declaration order.
    pub fields: Vec<FieldSpec>,
}

thread_local! {
    static REGISTRY: RefCell<AHashMap<(SeriesKind, &'static str), DerivedClass>> =
        RefCell::new(AHashMap::new());
}

/// Record a derived family. Idempotent; the first registration wins.
pub fn register(class: DerivedClass) {
    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let key = (class.series, class.schema);
        match registry.get(&key) {
            Some(existing) => {
                if existing.derived != class.derived {
                    warn!(
                        schema = class.schema,
                        series = %class.series,
                        first = existing.derived_name,
                        ignored = class.derived_name,
                        "conflicting re-registration ignored"
                    );
                }
            }
            None => {
                debug!(
                    schema = class.schema,
                    series = %class.series,
                    derived = class.derived_name,
                    "registered derived class"
                );
                registry.insert(key, class);
            }
        }
    });
}

/// Look up the derived family registered for a schema, if any.
#[must_use]
pub fn derived_for(series: SeriesKind, schema: &str) -> Option<DerivedClass> {
    REGISTRY.with(|registry| {
        registry
            .borrow()
            .iter()
            .find(|((kind, name), _)| *kind == series && *name == schema)
            .map(|(_, class)| class.clone())
    })
}

/// Whether a schema has been transformed under `series`.
#[must_use]
pub fn is_transformed(series: SeriesKind, schema: &str) -> bool {
    derived_for(series, schema).is_some()
}

/// Number of registered derived families.
#[must_use]
pub fn registered_count() -> usize {
    REGISTRY.with(|registry| registry.borrow().len())
}
