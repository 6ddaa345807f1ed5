#![forbid(unsafe_code)]

//! Schema declaration and the [`transform!`] macro.
//!
//! A schema is a plain data struct — no behavior — from which the macro
//! derives a mirrored family of synchronized nodes. Declaring the field
//! kinds up front replaces the reflective field scan of dynamic languages:
//! every field is `value`, `signal`, or `nested`, and an unknown kind is a
//! compile error rather than a deferred-resolution failure.

use crate::registry::FieldSpec;

/// Bounds every schema field type and generic parameter must satisfy.
///
/// Blanket-implemented; never implement it by hand.
pub trait SchemaValue: Clone + PartialEq + std::fmt::Debug + Default + 'static {}

impl<T: Clone + PartialEq + std::fmt::Debug + Default + 'static> SchemaValue for T {}

/// A plain schema type produced by [`transform!`].
pub trait Schema: Clone + 'static {
    /// The unqualified schema name.
    const SHORT_NAME: &'static str;

    /// The ordered field list, as declared.
    fn field_specs() -> Vec<FieldSpec>;

    /// The registry cache key. Includes generic arguments, so each generic
    /// instantiation is transformed and cached independently.
    #[must_use]
    fn qualified_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Derive a mirrored node family from a plain schema.
///
/// The input is a schema struct whose fields declare their node kind:
///
/// ```ignore
/// use tether_transform::transform;
///
/// transform! {
///     /// Per-channel gain settings.
///     pub struct Gains => GainsNodes {
///         theta: value f64 = 1.0,
///         phi: value f64,
///         recenter: signal,
///         limits: nested Limits => LimitsNodes,
///     }
/// }
/// ```
///
/// This expands to:
///
/// - the plain struct `Gains` (`Clone + Debug + PartialEq + Default`, signal
///   fields omitted — they carry no data);
/// - an implementation of [`Schema`] recording the ordered field list;
/// - `GainsNodes<S: Series>`, one node per field, generic over the
///   [`Series`](crate::series::Series) so the model and interface families
///   are two instantiations of the same template;
/// - on `GainsNodes<ModelSeries>`: `create`, `with_defaults`, `snapshot`,
///   `load`, `load_in`, `interface`, and `filtered`.
///
/// Leaf nodes are named `"<owner>.<field>"`; nested families extend the
/// dotted path. Nested fields reuse the already-derived family of the nested
/// schema (`Limits => LimitsNodes` names it), so one schema transformed once
/// serves every schema that embeds it.
///
/// Schemas may take generic parameters (`pub struct Pair<T> => PairNodes`);
/// each parameter is bounded by [`SchemaValue`] and propagates into the node
/// family. The identifier `S` is reserved for the series parameter.
#[macro_export]
macro_rules! transform {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(< $($gp:ident),+ $(,)? >)? => $nodes:ident {
            $($fields:tt)*
        }
    ) => {
        $crate::transform!(@munch
            meta [ $(#[$meta])* ]
            vis [ $vis ]
            name [ $name ]
            gens [ $($($gp)+)? ]
            nodes [ $nodes ]
            vars [ __name __proto __model __ctx S ]
            sf [ ]
            nf [ ]
            specs [ ]
            mi [ ]
            ii [ ]
            fi [ ]
            ss [ ]
            ls [ ]
            rest [ $($fields)* ]
        );
    };

    // ---- field: value with an explicit default -------------------------
    (@munch
        meta $meta:tt vis $vis:tt name $name:tt gens $gps:tt nodes $nodes:tt
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $($sf:tt)* ]
        nf [ $($nf:tt)* ]
        specs [ $($sp:tt)* ]
        mi [ $($mi:tt)* ]
        ii [ $($ii:tt)* ]
        fi [ $($fi:tt)* ]
        ss [ $($ss:tt)* ]
        ls [ $($ls:tt)* ]
        rest [ $field:ident : value $fty:ty = $default:expr $(, $($rest:tt)*)? ]
    ) => {
        $crate::transform!(@munch
            meta $meta vis $vis name $name gens $gps nodes $nodes
            vars [ $vname $vproto $vmodel $vctx $vseries ]
            sf [ $($sf)* { $field [ $fty ] [ $default ] } ]
            nf [ $($nf)* { $field [ <$vseries as $crate::series::Series>::Value<$fty> ] } ]
            specs [ $($sp)* [ $crate::registry::FieldSpec {
                name: ::core::stringify!($field),
                kind: $crate::registry::FieldKind::Value,
            } ] ]
            mi [ $($mi)* { $field [ $crate::__private::ModelValue::create(
                ::std::format!("{}.{}", $vname, ::core::stringify!($field)),
                $vproto.$field.clone(),
            )? ] } ]
            ii [ $($ii)* { $field [ $vmodel.$field.interface_node() ] } ]
            fi [ $($fi)* { $field [ $vmodel.$field.filtered_node() ] } ]
            ss [ $($ss)* { $field [ $vmodel.$field.get() ] } ]
            ls [ $($ls)* [ $vctx.set(&$vmodel.$field, $vproto.$field.clone()); ] ]
            rest [ $($($rest)*)? ]
        );
    };

    // ---- field: value defaulting to Default::default() -----------------
    (@munch
        meta $meta:tt vis $vis:tt name $name:tt gens $gps:tt nodes $nodes:tt
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $($sf:tt)* ]
        nf [ $($nf:tt)* ]
        specs [ $($sp:tt)* ]
        mi [ $($mi:tt)* ]
        ii [ $($ii:tt)* ]
        fi [ $($fi:tt)* ]
        ss [ $($ss:tt)* ]
        ls [ $($ls:tt)* ]
        rest [ $field:ident : value $fty:ty $(, $($rest:tt)*)? ]
    ) => {
        $crate::transform!(@munch
            meta $meta vis $vis name $name gens $gps nodes $nodes
            vars [ $vname $vproto $vmodel $vctx $vseries ]
            sf [ $($sf)* { $field [ $fty ] [ ::core::default::Default::default() ] } ]
            nf [ $($nf)* { $field [ <$vseries as $crate::series::Series>::Value<$fty> ] } ]
            specs [ $($sp)* [ $crate::registry::FieldSpec {
                name: ::core::stringify!($field),
                kind: $crate::registry::FieldKind::Value,
            } ] ]
            mi [ $($mi)* { $field [ $crate::__private::ModelValue::create(
                ::std::format!("{}.{}", $vname, ::core::stringify!($field)),
                $vproto.$field.clone(),
            )? ] } ]
            ii [ $($ii)* { $field [ $vmodel.$field.interface_node() ] } ]
            fi [ $($fi)* { $field [ $vmodel.$field.filtered_node() ] } ]
            ss [ $($ss)* { $field [ $vmodel.$field.get() ] } ]
            ls [ $($ls)* [ $vctx.set(&$vmodel.$field, $vproto.$field.clone()); ] ]
            rest [ $($($rest)*)? ]
        );
    };

    // ---- field: signal --------------------------------------------------
    (@munch
        meta $meta:tt vis $vis:tt name $name:tt gens $gps:tt nodes $nodes:tt
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $($sf:tt)* ]
        nf [ $($nf:tt)* ]
        specs [ $($sp:tt)* ]
        mi [ $($mi:tt)* ]
        ii [ $($ii:tt)* ]
        fi [ $($fi:tt)* ]
        ss [ $($ss:tt)* ]
        ls [ $($ls:tt)* ]
        rest [ $field:ident : signal $(, $($rest:tt)*)? ]
    ) => {
        $crate::transform!(@munch
            meta $meta vis $vis name $name gens $gps nodes $nodes
            vars [ $vname $vproto $vmodel $vctx $vseries ]
            sf [ $($sf)* ]
            nf [ $($nf)* { $field [ <$vseries as $crate::series::Series>::Signal ] } ]
            specs [ $($sp)* [ $crate::registry::FieldSpec {
                name: ::core::stringify!($field),
                kind: $crate::registry::FieldKind::Signal,
            } ] ]
            mi [ $($mi)* { $field [ $crate::__private::ModelSignal::create(
                ::std::format!("{}.{}", $vname, ::core::stringify!($field)),
            )? ] } ]
            ii [ $($ii)* { $field [ $vmodel.$field.interface_node() ] } ]
            fi [ $($fi)* { $field [ $vmodel.$field.interface_node() ] } ]
            ss [ $($ss)* ]
            ls [ $($ls)* ]
            rest [ $($($rest)*)? ]
        );
    };

    // ---- field: nested with an explicit default -------------------------
    (@munch
        meta $meta:tt vis $vis:tt name $name:tt gens $gps:tt nodes $nodes:tt
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $($sf:tt)* ]
        nf [ $($nf:tt)* ]
        specs [ $($sp:tt)* ]
        mi [ $($mi:tt)* ]
        ii [ $($ii:tt)* ]
        fi [ $($fi:tt)* ]
        ss [ $($ss:tt)* ]
        ls [ $($ls:tt)* ]
        rest [ $field:ident : nested $nty:ident $(< $($narg:ty),+ >)? => $nnodes:ident
            = $default:expr $(, $($rest:tt)*)? ]
    ) => {
        $crate::transform!(@munch
            meta $meta vis $vis name $name gens $gps nodes $nodes
            vars [ $vname $vproto $vmodel $vctx $vseries ]
            sf [ $($sf)* { $field [ $nty $(< $($narg),+ >)? ] [ $default ] } ]
            nf [ $($nf)* { $field [ $nnodes<$($($narg,)+)? $vseries> ] } ]
            specs [ $($sp)* [ $crate::registry::FieldSpec {
                name: ::core::stringify!($field),
                kind: $crate::registry::FieldKind::Nested(
                    ::core::any::type_name::<$nty $(< $($narg),+ >)?>(),
                ),
            } ] ]
            mi [ $($mi)* { $field [ $nnodes::create(
                ::std::format!("{}.{}", $vname, ::core::stringify!($field)),
                &$vproto.$field,
            )? ] } ]
            ii [ $($ii)* { $field [ $vmodel.$field.interface() ] } ]
            fi [ $($fi)* { $field [ $vmodel.$field.filtered() ] } ]
            ss [ $($ss)* { $field [ $vmodel.$field.snapshot() ] } ]
            ls [ $($ls)* [ $vmodel.$field.load_in(&$vproto.$field, $vctx); ] ]
            rest [ $($($rest)*)? ]
        );
    };

    // ---- field: nested defaulting to Default::default() -----------------
    (@munch
        meta $meta:tt vis $vis:tt name $name:tt gens $gps:tt nodes $nodes:tt
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $($sf:tt)* ]
        nf [ $($nf:tt)* ]
        specs [ $($sp:tt)* ]
        mi [ $($mi:tt)* ]
        ii [ $($ii:tt)* ]
        fi [ $($fi:tt)* ]
        ss [ $($ss:tt)* ]
        ls [ $($ls:tt)* ]
        rest [ $field:ident : nested $nty:ident $(< $($narg:ty),+ >)? => $nnodes:ident
            $(, $($rest:tt)*)? ]
    ) => {
        $crate::transform!(@munch
            meta $meta vis $vis name $name gens $gps nodes $nodes
            vars [ $vname $vproto $vmodel $vctx $vseries ]
            sf [ $($sf)* { $field [ $nty $(< $($narg),+ >)? ]
                [ ::core::default::Default::default() ] } ]
            nf [ $($nf)* { $field [ $nnodes<$($($narg,)+)? $vseries> ] } ]
            specs [ $($sp)* [ $crate::registry::FieldSpec {
                name: ::core::stringify!($field),
                kind: $crate::registry::FieldKind::Nested(
                    ::core::any::type_name::<$nty $(< $($narg),+ >)?>(),
                ),
            } ] ]
            mi [ $($mi)* { $field [ $nnodes::create(
                ::std::format!("{}.{}", $vname, ::core::stringify!($field)),
                &$vproto.$field,
            )? ] } ]
            ii [ $($ii)* { $field [ $vmodel.$field.interface() ] } ]
            fi [ $($fi)* { $field [ $vmodel.$field.filtered() ] } ]
            ss [ $($ss)* { $field [ $vmodel.$field.snapshot() ] } ]
            ls [ $($ls)* [ $vmodel.$field.load_in(&$vproto.$field, $vctx); ] ]
            rest [ $($($rest)*)? ]
        );
    };

    // ---- all fields consumed: emit --------------------------------------
    (@munch
        meta [ $(#[$meta:meta])* ]
        vis [ $vis:vis ]
        name [ $name:ident ]
        gens [ $($gp:ident)* ]
        nodes [ $nodes:ident ]
        vars [ $vname:ident $vproto:ident $vmodel:ident $vctx:ident $vseries:ident ]
        sf [ $({ $sff:ident [ $($sfty:tt)* ] [ $($sfd:tt)* ] })* ]
        nf [ $({ $nff:ident [ $($nfty:tt)* ] })* ]
        specs [ $([ $($spec:tt)* ])* ]
        mi [ $({ $mif:ident [ $($mie:tt)* ] })* ]
        ii [ $({ $iif:ident [ $($iie:tt)* ] })* ]
        fi [ $({ $fif:ident [ $($fie:tt)* ] })* ]
        ss [ $({ $ssf:ident [ $($sse:tt)* ] })* ]
        ls [ $([ $($lse:tt)* ])* ]
        rest [ ]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        $vis struct $name<$($gp: $crate::schema::SchemaValue),*> {
            $( pub $sff: $($sfty)*, )*
        }

        impl<$($gp: $crate::schema::SchemaValue),*> ::core::default::Default
            for $name<$($gp),*>
        {
            fn default() -> Self {
                Self {
                    $( $sff: $($sfd)*, )*
                }
            }
        }

        impl<$($gp: $crate::schema::SchemaValue),*> $crate::schema::Schema
            for $name<$($gp),*>
        {
            const SHORT_NAME: &'static str = ::core::stringify!($name);

            fn field_specs() -> ::std::vec::Vec<$crate::registry::FieldSpec> {
                ::std::vec![ $( $($spec)* ),* ]
            }
        }

        /// Node family derived from the schema of the same declaration.
        ///
        /// The series parameter selects the leaf node types; the model and
        /// interface families are two instantiations of this one template.
        $vis struct $nodes<
            $($gp: $crate::schema::SchemaValue,)*
            $vseries: $crate::series::Series,
        > {
            $( pub $nff: $($nfty)*, )*
        }

        impl<
            $($gp: $crate::schema::SchemaValue,)*
            $vseries: $crate::series::Series,
        > $nodes<$($gp,)* $vseries> {
            fn ensure_registered() {
                $crate::registry::register($crate::registry::DerivedClass {
                    series: <$vseries as $crate::series::Series>::KIND,
                    schema: <$name<$($gp),*> as $crate::schema::Schema>::qualified_name(),
                    derived: ::core::any::TypeId::of::<Self>(),
                    derived_name: ::core::any::type_name::<Self>(),
                    fields: <$name<$($gp),*> as $crate::schema::Schema>::field_specs(),
                });
            }
        }

        impl<$($gp: $crate::schema::SchemaValue),*>
            $nodes<$($gp,)* $crate::series::ModelSeries>
        {
            /// Build the model family under the node-name prefix `name`,
            /// initialized from `proto`'s values.
            $vis fn create(
                name: impl ::core::convert::Into<::std::string::String>,
                proto: &$name<$($gp),*>,
            ) -> ::core::result::Result<Self, $crate::NodeError> {
                Self::ensure_registered();
                let $vname = name.into();
                let $vproto = proto;
                let _ = (&$vname, $vproto);
                ::core::result::Result::Ok(Self {
                    $( $mif: $($mie)*, )*
                })
            }

            /// Build the model family from the schema's declared defaults.
            $vis fn with_defaults(
                name: impl ::core::convert::Into<::std::string::String>,
            ) -> ::core::result::Result<Self, $crate::NodeError> {
                Self::create(
                    name,
                    &<$name<$($gp),*> as ::core::default::Default>::default(),
                )
            }

            /// Materialize a schema instance from the current node values.
            #[must_use]
            $vis fn snapshot(&self) -> $name<$($gp),*> {
                let $vmodel = self;
                let _ = $vmodel;
                $name {
                    $( $ssf: $($sse)*, )*
                }
            }

            /// Load every value from `proto`, notifying each node exactly
            /// once and rolling back atomically on failure.
            $vis fn load(&self, proto: &$name<$($gp),*>) {
                let mut ctx = $crate::MultipleValueContext::new();
                self.load_in(proto, &mut ctx);
                ctx.commit();
            }

            /// Load every value from `proto` through an open batch context.
            $vis fn load_in<'t>(
                &'t self,
                proto: &$name<$($gp),*>,
                ctx: &mut $crate::MultipleValueContext<'t>,
            ) {
                let $vmodel = self;
                let $vproto = proto;
                let $vctx = ctx;
                $( $($lse)* )*
                let _ = ($vmodel, $vproto, $vctx);
            }

            /// Derive the mirrored interface family.
            #[must_use]
            $vis fn interface(&self) -> $nodes<$($gp,)* $crate::series::InterfaceSeries> {
                <$nodes<$($gp,)* $crate::series::InterfaceSeries>>::ensure_registered();
                let $vmodel = self;
                let _ = $vmodel;
                $nodes {
                    $( $iif: $($iie)*, )*
                }
            }

            /// Derive the mirrored interface family with filterable leaves.
            #[must_use]
            $vis fn filtered(&self) -> $nodes<$($gp,)* $crate::series::FilteredSeries> {
                <$nodes<$($gp,)* $crate::series::FilteredSeries>>::ensure_registered();
                let $vmodel = self;
                let _ = $vmodel;
                $nodes {
                    $( $fif: $($fie)*, )*
                }
            }
        }
    };
}
