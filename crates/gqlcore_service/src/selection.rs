//! Parsed selection sets as handed over by the parser.
//!
//! Arguments and directives are already resolved to dynamic values: variables
//! have been substituted and literals converted.

use gqlcore_response::{MapType, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The selections of one object.
pub type SelectionSet = Vec<Selection>;

/// A single selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    InlineFragment(InlineFragment),
    FragmentSpread(FragmentSpread),
}

/// A selected field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    /// Response key override.
    pub alias: Option<String>,

    /// The field name.
    pub name: String,

    /// Argument values by name.
    pub arguments: MapType,

    /// Directive arguments by directive name.
    pub directives: MapType,

    /// Sub-selection for object-typed fields.
    pub selection_set: Option<Arc<SelectionSet>>,
}

impl FieldSelection {
    /// Creates a field selection without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: MapType::new(),
            directives: MapType::new(),
            selection_set: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Adds a directive with its arguments.
    #[must_use]
    pub fn with_directive(mut self, name: impl Into<String>, arguments: MapType) -> Self {
        self.directives.insert(name.into(), Value::Map(arguments));
        self
    }

    /// Sets the sub-selection.
    #[must_use]
    pub fn with_selection<I, S>(mut self, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selection>,
    {
        self.selection_set = Some(Arc::new(selections.into_iter().map(Into::into).collect()));
        self
    }

    /// Returns the key this field is stored under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// An inline fragment, optionally conditioned on a type.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub directives: MapType,
    pub selection_set: Arc<SelectionSet>,
}

impl InlineFragment {
    /// Creates an inline fragment.
    pub fn new<I, S>(type_condition: Option<&str>, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selection>,
    {
        Self {
            type_condition: type_condition.map(str::to_string),
            directives: MapType::new(),
            selection_set: Arc::new(selections.into_iter().map(Into::into).collect()),
        }
    }

    /// Adds a directive with its arguments.
    #[must_use]
    pub fn with_directive(mut self, name: impl Into<String>, arguments: MapType) -> Self {
        self.directives.insert(name.into(), Value::Map(arguments));
        self
    }
}

/// A reference to a named fragment definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub name: String,
    pub directives: MapType,
}

impl FragmentSpread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directives: MapType::new(),
        }
    }

    /// Adds a directive with its arguments.
    #[must_use]
    pub fn with_directive(mut self, name: impl Into<String>, arguments: MapType) -> Self {
        self.directives.insert(name.into(), Value::Map(arguments));
        self
    }
}

/// A named fragment definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub type_condition: String,
    pub directives: MapType,
    pub selection_set: Arc<SelectionSet>,
}

impl Fragment {
    pub fn new<I, S>(type_condition: impl Into<String>, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selection>,
    {
        Self {
            type_condition: type_condition.into(),
            directives: MapType::new(),
            selection_set: Arc::new(selections.into_iter().map(Into::into).collect()),
        }
    }
}

/// Fragment definitions of a document by name.
pub type FragmentMap = HashMap<String, Fragment>;

impl From<FieldSelection> for Selection {
    fn from(field: FieldSelection) -> Self {
        Self::Field(field)
    }
}

impl From<InlineFragment> for Selection {
    fn from(fragment: InlineFragment) -> Self {
        Self::InlineFragment(fragment)
    }
}

impl From<FragmentSpread> for Selection {
    fn from(spread: FragmentSpread) -> Self {
        Self::FragmentSpread(spread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_key() {
        let field = FieldSelection::new("name");
        assert_eq!(field.response_key(), "name");

        let aliased = FieldSelection::new("name").with_alias("label");
        assert_eq!(aliased.response_key(), "label");
    }

    #[test]
    fn test_builder_keeps_selection_order() {
        let field = FieldSelection::new("__type")
            .with_argument("name", "Query")
            .with_selection([FieldSelection::new("kind"), FieldSelection::new("name")]);

        assert_eq!(field.arguments.get("name"), Some(&Value::from("Query")));
        let names: Vec<_> = field
            .selection_set
            .unwrap()
            .iter()
            .map(|s| match s {
                Selection::Field(f) => f.name.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, ["kind", "name"]);
    }
}
