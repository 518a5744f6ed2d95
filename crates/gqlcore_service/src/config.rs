//! Service configuration.

use serde::{Deserialize, Serialize};

/// How result conversion awaits the elements of a list.
///
/// Either way the output list keeps the element order of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListResolution {
    /// Poll every element future at once and reassemble by index.
    #[default]
    Concurrent,
    /// Await element futures one after another.
    Sequential,
}

/// Configuration shared by every resolution of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Register `__schema` and `__type` on the query root.
    pub introspection: bool,

    /// Strategy for list results.
    pub list_resolution: ListResolution,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            introspection: true,
            list_resolution: ListResolution::Concurrent,
        }
    }
}

impl ServiceConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables introspection (recommended for production).
    #[must_use]
    pub fn disable_introspection(mut self) -> Self {
        self.introspection = false;
        self
    }

    /// Sets the list resolution strategy.
    #[must_use]
    pub fn with_list_resolution(mut self, list_resolution: ListResolution) -> Self {
        self.list_resolution = list_resolution;
        self
    }
}
