//! The two enums of the introspection meta-schema.
//!
//! Ordinals are part of the wire contract: a value converts to and from its
//! name by position in `NAMES`, so the tables must never be reordered.

use futures_util::future;
use gqlcore_response::Value;
use gqlcore_service::{
    convert_enum, enum_result, ArgumentType, ResolverFuture, ResolverParams, ResultType, SchemaError,
    SchemaResult,
};
use std::fmt;

macro_rules! meta_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $type_name:literal {
            $($variant:ident => $wire:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),*
        }

        impl $name {
            /// The introspection type name.
            pub const TYPE_NAME: &'static str = $type_name;

            /// Wire names in ordinal order.
            pub const NAMES: &'static [&'static str] = &[$($wire),*];

            /// Every value in ordinal order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            pub fn ordinal(self) -> usize {
                self as usize
            }

            pub fn from_ordinal(ordinal: usize) -> Option<Self> {
                Self::ALL.get(ordinal).copied()
            }

            pub fn as_str(self) -> &'static str {
                Self::NAMES[self.ordinal()]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ArgumentType for $name {
            fn convert(value: &Value) -> SchemaResult<Self> {
                let ordinal = convert_enum(value, Self::NAMES, Self::TYPE_NAME)?;
                Self::from_ordinal(ordinal)
                    .ok_or_else(|| SchemaError::new(format!("not a valid {} value", Self::TYPE_NAME)))
            }
        }

        impl ResultType for $name {
            fn convert(self, _params: ResolverParams) -> ResolverFuture {
                Box::pin(future::ready(enum_result(self.ordinal(), Self::NAMES, Self::TYPE_NAME)))
            }
        }
    };
}

meta_enum! {
    /// The kind of a type.
    pub enum TypeKind: "__TypeKind" {
        Scalar => "SCALAR",
        Object => "OBJECT",
        Interface => "INTERFACE",
        Union => "UNION",
        Enum => "ENUM",
        InputObject => "INPUT_OBJECT",
        List => "LIST",
        NonNull => "NON_NULL",
    }
}

meta_enum! {
    /// Where a directive may appear.
    pub enum DirectiveLocation: "__DirectiveLocation" {
        Query => "QUERY",
        Mutation => "MUTATION",
        Subscription => "SUBSCRIPTION",
        Field => "FIELD",
        FragmentDefinition => "FRAGMENT_DEFINITION",
        FragmentSpread => "FRAGMENT_SPREAD",
        InlineFragment => "INLINE_FRAGMENT",
        Schema => "SCHEMA",
        Scalar => "SCALAR",
        Object => "OBJECT",
        FieldDefinition => "FIELD_DEFINITION",
        ArgumentDefinition => "ARGUMENT_DEFINITION",
        Interface => "INTERFACE",
        Union => "UNION",
        Enum => "ENUM",
        EnumValue => "ENUM_VALUE",
        InputObject => "INPUT_OBJECT",
        InputFieldDefinition => "INPUT_FIELD_DEFINITION",
    }
}

impl TypeKind {
    /// Returns true for `LIST` and `NON_NULL`, the kinds without a name.
    pub fn is_wrapper(self) -> bool {
        matches!(self, Self::List | Self::NonNull)
    }
}
