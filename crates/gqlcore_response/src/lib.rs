//! Dynamic response values for gqlcore.
//!
//! This crate provides the value tree exchanged at the protocol boundary:
//! - `value`: the `Value` variant, its `Type` tag and ordered map/list aliases

pub mod value;

pub use value::{ListType, MapType, Type, Value, ValueError};
