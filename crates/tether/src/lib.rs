#![forbid(unsafe_code)]

//! Umbrella crate re-exporting the Tether public surface.
//!
//! - `tether-core`: tubes, manifolds, synchronized value/signal nodes, batch
//!   contexts.
//! - `tether-transform`: the [`transform!`] macro, series markers, and the
//!   derived-class registry.
//! - `tether-extras`: compound nodes (ranges, choosers, groups).
//!
//! ```
//! use tether::{ModelValue, transform};
//!
//! let brightness = ModelValue::create("display.brightness", 80).unwrap();
//! let slider = brightness.interface_node();
//! slider.set(55);
//! assert_eq!(brightness.get(), 55);
//!
//! transform! {
//!     struct Display => DisplayNodes {
//!         brightness: value i32 = 80,
//!         contrast: value i32 = 50,
//!     }
//! }
//!
//! let panel = DisplayNodes::with_defaults("panel").unwrap();
//! let remote = panel.interface();
//! remote.contrast.set(60);
//! assert_eq!(panel.snapshot(), Display { brightness: 80, contrast: 60 });
//! ```

pub use tether_core::{
    BatchNode, Connection, FilteredInterfaceValue, FilteredModelValue, FilteredReadOnlyValue,
    InterfaceSignal, InterfaceValue, ModelSignal, ModelValue, MultipleValueContext, NodeError,
    NodeRole, ReadOnlyValue, Tube, ValueContext,
};
pub use tether_extras::{ChooserInterface, ChooserModel, Group, RangeInterface, RangeModel};
pub use tether_transform::{
    FilteredSeries, InterfaceSeries, ModelSeries, Schema, SchemaValue, Series, SeriesKind,
    registry, transform,
};
