//! The schema error raised by dispatch and conversion.

use gqlcore_response::{Value, ValueError};
use thiserror::Error;

/// One or more human-readable messages describing why a field could not be
/// produced.
///
/// This is the only error kind of the core. It is raised synchronously by
/// argument conversion and fails the future of result conversion; recovery
/// and partial responses are up to the executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join("; "))]
pub struct SchemaError {
    messages: Vec<String>,
}

impl SchemaError {
    /// Creates an error with a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Creates an error carrying several messages.
    pub fn from_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Returns the messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consumes the error, returning its messages.
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Rewrites every message, keeping their number and order.
    #[must_use]
    pub fn map_messages(self, f: impl Fn(String) -> String) -> Self {
        Self {
            messages: self.messages.into_iter().map(f).collect(),
        }
    }

    /// Renders the error list of a response: `[{message: ...}, ...]`.
    pub fn to_value(&self) -> Value {
        Value::List(
            self.messages
                .iter()
                .map(|message| Value::from_iter([("message", Value::from(message.as_str()))]))
                .collect(),
        )
    }
}

impl From<ValueError> for SchemaError {
    fn from(error: ValueError) -> Self {
        Self::new(error.to_string())
    }
}

/// Type alias for results of the core.
pub type SchemaResult<T> = Result<T, SchemaError>;
