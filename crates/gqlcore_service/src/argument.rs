//! Typed argument conversion.
//!
//! GraphQL types are nullable by default and may be wrapped in non-null or
//! list types. On the Rust side the default is inverted: a bare `T` is
//! non-null, `Option<T>` adds the nullable modifier and `Vec<T>` the list
//! modifier. `Vec<Option<bool>>` therefore reads as `[List, Nullable]`
//! around `Boolean`, a non-null list of nullable booleans.
//!
//! The List/Nullable recursion is written once below; terminal types only say
//! how a single value converts.

use crate::error::{SchemaError, SchemaResult};
use gqlcore_response::Value;

/// One wrapper around a terminal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeModifier {
    List,
    Nullable,
}

/// A type an argument value can be converted into.
pub trait ArgumentType: Sized {
    /// Converts a single dynamic value.
    fn convert(value: &Value) -> SchemaResult<Self>;

    /// The value of an argument that was not supplied at all, for types that
    /// accept that.
    fn missing() -> Option<Self> {
        None
    }

    /// The modifier stack, outermost first.
    fn modifiers() -> Vec<TypeModifier> {
        Vec::new()
    }
}

impl<T: ArgumentType> ArgumentType for Option<T> {
    fn convert(value: &Value) -> SchemaResult<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::convert(value).map(Some)
    }

    fn missing() -> Option<Self> {
        Some(None)
    }

    fn modifiers() -> Vec<TypeModifier> {
        let mut modifiers = vec![TypeModifier::Nullable];
        modifiers.extend(T::modifiers());
        modifiers
    }
}

impl<T: ArgumentType> ArgumentType for Vec<T> {
    fn convert(value: &Value) -> SchemaResult<Self> {
        let Some(elements) = value.as_list() else {
            return Err(SchemaError::new("not a valid List value"));
        };
        elements.iter().map(T::convert).collect()
    }

    fn modifiers() -> Vec<TypeModifier> {
        let mut modifiers = vec![TypeModifier::List];
        modifiers.extend(T::modifiers());
        modifiers
    }
}

impl ArgumentType for bool {
    fn convert(value: &Value) -> SchemaResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| SchemaError::new("not a valid Boolean value"))
    }
}

impl ArgumentType for i32 {
    fn convert(value: &Value) -> SchemaResult<Self> {
        value
            .as_int()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| SchemaError::new("not a valid Int value"))
    }
}

impl ArgumentType for f64 {
    fn convert(value: &Value) -> SchemaResult<Self> {
        value
            .as_float()
            .ok_or_else(|| SchemaError::new("not a valid Float value"))
    }
}

impl ArgumentType for String {
    fn convert(value: &Value) -> SchemaResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SchemaError::new("not a valid String value"))
    }
}

/// Custom scalars pass through unchanged.
impl ArgumentType for Value {
    fn convert(value: &Value) -> SchemaResult<Self> {
        Ok(value.clone())
    }
}

/// Converts an enum value to the ordinal of its name in `names`.
///
/// The value must be enum-tagged and match an entry exactly.
pub fn convert_enum(value: &Value, names: &[&str], type_name: &str) -> SchemaResult<usize> {
    value
        .as_enum()
        .and_then(|name| names.iter().position(|candidate| *candidate == name))
        .ok_or_else(|| SchemaError::new(format!("not a valid {type_name} value")))
}

/// Converts the argument `name`, failing if it is absent or invalid.
pub fn require<T: ArgumentType>(name: &str, arguments: &Value) -> SchemaResult<T> {
    let result = match arguments.get(name) {
        Some(value) => T::convert(value),
        None => T::missing().ok_or_else(|| SchemaError::new("missing required argument")),
    };

    result.map_err(|err| err.map_messages(|message| format!("Invalid argument: {name} error: {message}")))
}

/// Converts the argument `name` if it was supplied.
///
/// Returns `Ok(None)` when it is absent so the caller can fall back to a
/// declared default; a supplied but invalid value is still an error.
pub fn find<T: ArgumentType>(name: &str, arguments: &Value) -> SchemaResult<Option<T>> {
    if arguments.get(name).is_none() {
        return Ok(None);
    }
    require(name, arguments).map(Some)
}
