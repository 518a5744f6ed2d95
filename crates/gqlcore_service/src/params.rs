//! Parameters passed to resolvers and collaborator getters.

use crate::config::ServiceConfig;
use crate::selection::{FragmentMap, SelectionSet};
use crate::state::{RequestState, SharedState};
use gqlcore_response::{Type, Value};
use std::ops::Deref;
use std::sync::Arc;

/// Parameters common to every field of a selection set.
///
/// Everything is shared, so cloning is cheap and every field invocation gets
/// its own copy.
#[derive(Debug, Clone)]
pub struct SelectionSetParams {
    /// Request-scoped state.
    pub state: SharedState,

    /// Directives on the operation.
    pub operation_directives: Arc<Value>,

    /// Directives on the fragment definition being expanded, if any.
    pub fragment_definition_directives: Arc<Value>,

    /// Directives on the fragment spread being expanded, if any.
    pub fragment_spread_directives: Arc<Value>,

    /// Directives on the inline fragment being expanded, if any.
    pub inline_fragment_directives: Arc<Value>,

    /// Fragment definitions of the document.
    pub fragments: Arc<FragmentMap>,

    /// Service configuration.
    pub config: Arc<ServiceConfig>,
}

impl Default for SelectionSetParams {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl SelectionSetParams {
    /// Creates params for the root selection set of an operation.
    pub fn new(config: ServiceConfig) -> Self {
        let empty = Arc::new(Value::new(Type::Map));
        Self {
            state: Arc::new(RequestState::new()),
            operation_directives: Arc::clone(&empty),
            fragment_definition_directives: Arc::clone(&empty),
            fragment_spread_directives: Arc::clone(&empty),
            inline_fragment_directives: empty,
            fragments: Arc::new(FragmentMap::new()),
            config: Arc::new(config),
        }
    }

    /// Sets the request state.
    #[must_use]
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = state;
        self
    }

    /// Sets the operation directives.
    #[must_use]
    pub fn with_operation_directives(mut self, directives: Value) -> Self {
        self.operation_directives = Arc::new(directives);
        self
    }

    /// Sets the fragment definitions.
    #[must_use]
    pub fn with_fragments(mut self, fragments: FragmentMap) -> Self {
        self.fragments = Arc::new(fragments);
        self
    }

    /// Params for the sub-selection of an object field.
    ///
    /// Fragment directives only apply to the fragment they were written on.
    #[must_use]
    pub fn nested(&self) -> Self {
        let empty = Arc::new(Value::new(Type::Map));
        Self {
            fragment_definition_directives: Arc::clone(&empty),
            fragment_spread_directives: Arc::clone(&empty),
            inline_fragment_directives: empty,
            ..self.clone()
        }
    }
}

/// Parameters handed to collaborator getters.
#[derive(Debug, Clone)]
pub struct FieldParams {
    pub selection_set_params: SelectionSetParams,

    /// Directives on this field occurrence.
    pub field_directives: Value,
}

impl FieldParams {
    pub fn new(selection_set_params: SelectionSetParams, field_directives: Value) -> Self {
        Self {
            selection_set_params,
            field_directives,
        }
    }
}

impl Deref for FieldParams {
    type Target = SelectionSetParams;

    fn deref(&self) -> &Self::Target {
        &self.selection_set_params
    }
}

/// Everything a field resolver receives for one invocation.
#[derive(Debug, Clone)]
pub struct ResolverParams {
    pub selection_set_params: SelectionSetParams,

    /// The field name being resolved.
    pub field_name: String,

    /// Argument values, always a map.
    pub arguments: Value,

    /// Directives on this field occurrence, always a map.
    pub field_directives: Value,

    /// Sub-selection for object-typed fields.
    pub selection: Option<Arc<SelectionSet>>,
}

impl ResolverParams {
    /// Creates params without arguments, directives or sub-selection.
    pub fn new(selection_set_params: SelectionSetParams, field_name: impl Into<String>) -> Self {
        Self {
            selection_set_params,
            field_name: field_name.into(),
            arguments: Value::new(Type::Map),
            field_directives: Value::new(Type::Map),
            selection: None,
        }
    }

    /// Sets the arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the field directives.
    #[must_use]
    pub fn with_field_directives(mut self, directives: Value) -> Self {
        self.field_directives = directives;
        self
    }

    /// Sets the sub-selection.
    #[must_use]
    pub fn with_selection(mut self, selection: Arc<SelectionSet>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Builds the params passed to a collaborator getter.
    pub fn field_params(&self) -> FieldParams {
        FieldParams::new(self.selection_set_params.clone(), self.field_directives.clone())
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.selection_set_params.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListResolution;

    #[test]
    fn test_nested_clears_fragment_directives() {
        let mut params = SelectionSetParams::default()
            .with_operation_directives([("cached", Value::new(Type::Map))].into_iter().collect());
        params.inline_fragment_directives =
            Arc::new([("skip", Value::new(Type::Map))].into_iter().collect());

        let nested = params.nested();

        assert!(nested.inline_fragment_directives.is_empty());
        assert!(nested.operation_directives.get("cached").is_some());
    }

    #[test]
    fn test_field_params_carry_directives() {
        let config = ServiceConfig::new().with_list_resolution(ListResolution::Sequential);
        let params = ResolverParams::new(SelectionSetParams::new(config), "fields")
            .with_field_directives([("custom", Value::new(Type::Map))].into_iter().collect());

        let field_params = params.field_params();

        assert!(field_params.field_directives.get("custom").is_some());
        assert_eq!(field_params.config.list_resolution, ListResolution::Sequential);
        assert_eq!(params.config().list_resolution, ListResolution::Sequential);
    }
}
