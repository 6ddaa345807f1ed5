#![forbid(unsafe_code)]

//! Structural transforms over plain schemas.
//!
//! Given a plain data struct, [`transform!`] derives a family of
//! synchronized nodes — one node per field, wired into the pub/sub substrate
//! of `tether-core` under dotted names. The family is generic over a
//! [`Series`](series::Series): instantiated with
//! [`ModelSeries`](series::ModelSeries) it is the authoritative node set,
//! instantiated with [`InterfaceSeries`](series::InterfaceSeries) it is the
//! mirrored proxy set, and the two cannot drift apart because they are one
//! template.
//!
//! Derived families register themselves in a process-wide
//! [`registry`](registry) keyed by `(series, qualified schema name)`, which
//! is how nested schemas reuse the single family derived for their member
//! schema.
//!
//! # Example
//!
//! ```
//! use tether_transform::transform;
//!
//! transform! {
//!     pub struct Gains => GainsNodes {
//!         theta: value f64 = 1.0,
//!         phi: value f64,
//!     }
//! }
//!
//! let model = GainsNodes::with_defaults("gains").unwrap();
//! let panel = model.interface();
//!
//! panel.theta.set(2.5);
//! assert_eq!(model.theta.get(), 2.5);
//!
//! let snapshot = model.snapshot();
//! assert_eq!(snapshot, Gains { theta: 2.5, phi: 0.0 });
//!
//! model.load(&Gains { theta: 9.0, phi: 1.0 });
//! assert_eq!(panel.theta.get(), 9.0);
//! ```

pub mod registry;
pub mod schema;
pub mod series;

pub use schema::{Schema, SchemaValue};
pub use series::{FilteredSeries, InterfaceSeries, ModelSeries, Series, SeriesKind};
pub use tether_core::{MultipleValueContext, NodeError, ValueContext};

#[doc(hidden)]
pub mod __private {
    pub use tether_core::{ModelSignal, ModelValue};
}
