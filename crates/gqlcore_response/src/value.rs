//! The dynamic value tree.
//!
//! Arguments arrive in this shape from the parser and field results leave in
//! it towards serialization. Map keys keep their insertion order, which is
//! the field order of the final response.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Ordered name → value map.
pub type MapType = IndexMap<String, Value>;

/// Ordered list of values.
pub type ListType = Vec<Value>;

/// The kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Map,
    List,
    String,
    Null,
    Boolean,
    Int,
    Float,
    EnumValue,
}

impl Type {
    /// Returns the name used in error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::List => "List",
            Self::String => "String",
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::EnumValue => "EnumValue",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from using a value as the wrong kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected a {expected} value but found {actual}")]
    TypeMismatch { expected: Type, actual: Type },
}

/// A dynamic value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    EnumValue(String),
    List(ListType),
    Map(MapType),
}

impl Value {
    /// Creates the empty or zero value of a kind.
    pub fn new(ty: Type) -> Self {
        match ty {
            Type::Map => Self::Map(MapType::new()),
            Type::List => Self::List(ListType::new()),
            Type::String => Self::String(String::new()),
            Type::Null => Self::Null,
            Type::Boolean => Self::Boolean(false),
            Type::Int => Self::Int(0),
            Type::Float => Self::Float(0.0),
            Type::EnumValue => Self::EnumValue(String::new()),
        }
    }

    /// Creates an enum value tagged with its name.
    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::EnumValue(name.into())
    }

    /// Returns the kind of this value.
    pub fn value_type(&self) -> Type {
        match self {
            Self::Null => Type::Null,
            Self::Boolean(_) => Type::Boolean,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::EnumValue(_) => Type::EnumValue,
            Self::List(_) => Type::List,
            Self::Map(_) => Type::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::EnumValue(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the name of an enum value.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::EnumValue(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapType> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Takes the list out of this value.
    pub fn into_list(self) -> Result<ListType, ValueError> {
        match self {
            Self::List(l) => Ok(l),
            other => Err(other.mismatch(Type::List)),
        }
    }

    /// Takes the map out of this value.
    pub fn into_map(self) -> Result<MapType, ValueError> {
        match self {
            Self::Map(m) => Ok(m),
            other => Err(other.mismatch(Type::Map)),
        }
    }

    /// Sets a map member.
    ///
    /// A new key is appended after the existing ones; an existing key keeps
    /// its position and the previous value is returned.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>, ValueError> {
        match self {
            Self::Map(map) => Ok(map.insert(key.into(), value)),
            other => Err(other.mismatch(Type::Map)),
        }
    }

    /// Appends a list element.
    pub fn push(&mut self, value: Value) -> Result<(), ValueError> {
        match self {
            Self::List(list) => {
                list.push(value);
                Ok(())
            }
            other => Err(other.mismatch(Type::List)),
        }
    }

    /// Looks up a map member. Non-map values have no members.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Number of members or elements; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Self::List(l) => l.len(),
            Self::Map(m) => m.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(&self, expected: Type) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            actual: self.value_type(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ListType> for Value {
    fn from(value: ListType) -> Self {
        Self::List(value)
    }
}

impl From<MapType> for Value {
    fn from(value: MapType) -> Self {
        Self::Map(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Renders the value as a GraphQL input literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(s) => write_string_literal(f, s),
            Self::EnumValue(s) => f.write_str(s),
            Self::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(s) | Self::EnumValue(s) => serializer.serialize_str(s),
            Self::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    state.serialize_entry(key, item)?;
                }
                state.end()
            }
        }
    }
}
