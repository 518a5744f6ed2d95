//! The `ID` scalar.
//!
//! IDs are opaque bytes on the Rust side and Base64 strings on the wire.

use crate::argument::ArgumentType;
use crate::error::{SchemaError, SchemaResult};
use crate::object::ResolverFuture;
use crate::params::ResolverParams;
use crate::result::ResultType;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use futures_util::future;
use gqlcore_response::Value;
use std::fmt;
use std::ops::Deref;

/// Standard alphabet. Encodes with padding and decodes with or without it.
const ID_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An `ID` value as raw bytes.
///
/// # Example
///
/// ```
/// use gqlcore_response::Value;
/// use gqlcore_service::{ArgumentType, IdType};
///
/// let id = IdType::convert(&Value::from("dXNlcjox")).unwrap();
/// assert_eq!(id.as_bytes(), b"user:1");
/// assert_eq!(id.encode(), "dXNlcjox");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdType(pub Vec<u8>);

impl IdType {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decodes a Base64 string.
    pub fn decode(encoded: &str) -> SchemaResult<Self> {
        ID_ENGINE
            .decode(encoded)
            .map(Self)
            .map_err(|err| SchemaError::new(format!("not a valid ID value: {err}")))
    }

    /// Returns the Base64 form.
    pub fn encode(&self) -> String {
        ID_ENGINE.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for IdType {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for IdType {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for IdType {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for IdType {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl ArgumentType for IdType {
    fn convert(value: &Value) -> SchemaResult<Self> {
        let encoded = value
            .as_str()
            .ok_or_else(|| SchemaError::new("not a valid ID value"))?;
        Self::decode(encoded)
    }
}

impl ResultType for IdType {
    fn convert(self, _params: ResolverParams) -> ResolverFuture {
        Box::pin(future::ready(Ok(Value::from(self.encode()))))
    }
}
