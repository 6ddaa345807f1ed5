#![forbid(unsafe_code)]

//! Mirrored node-family series.
//!
//! A structural transform derives one generic node family per schema; the
//! [`Series`] parameter selects which leaf node types the family carries.
//! Model series and interface series are two instantiations of the same
//! template, so the two families mirror each other by construction.

use tether_core::{
    FilteredInterfaceValue, InterfaceSignal, InterfaceValue, ModelSignal, ModelValue,
};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ModelSeries {}
    impl Sealed for super::InterfaceSeries {}
    impl Sealed for super::FilteredSeries {}
}

/// Which family a derived node set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Authoritative nodes; own their names and values.
    Model,
    /// Derived observer/mutator proxies.
    Interface,
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Interface => f.write_str("interface"),
        }
    }
}

/// Selects the leaf node types of a derived family.
///
/// Sealed: the three provided series cover the model side, the plain
/// interface side, and the filtered interface side. Signals are never
/// filtered, so every interface-side series maps signals to
/// [`InterfaceSignal`].
pub trait Series: sealed::Sealed + 'static {
    /// Which family this series produces.
    const KIND: SeriesKind;

    /// The node type carrying a value of type `T`.
    type Value<T: Clone + 'static>;

    /// The node type carrying a stateless signal.
    type Signal;
}

/// The authoritative family: every leaf is a model node.
pub enum ModelSeries {}

impl Series for ModelSeries {
    const KIND: SeriesKind = SeriesKind::Model;
    type Value<T: Clone + 'static> = ModelValue<T>;
    type Signal = ModelSignal;
}

/// The plain proxy family: every leaf is a read-write interface node.
pub enum InterfaceSeries {}

impl Series for InterfaceSeries {
    const KIND: SeriesKind = SeriesKind::Interface;
    type Value<T: Clone + 'static> = InterfaceValue<T>;
    type Signal = InterfaceSignal;
}

/// The filtered proxy family: value leaves accept get/set filters.
pub enum FilteredSeries {}

impl Series for FilteredSeries {
    const KIND: SeriesKind = SeriesKind::Interface;
    type Value<T: Clone + 'static> = FilteredInterfaceValue<T>;
    type Signal = InterfaceSignal;
}
