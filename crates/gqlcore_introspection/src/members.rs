//! Fields, input values, enum values and directives.
//!
//! Each is built once through its builder and embeds the object that serves
//! its introspection fields. Type references are weak; see [`crate::Schema`].

use crate::kinds::DirectiveLocation;
use crate::object::{
    directive_object, enum_value_object, field_object, input_value_object, DirectiveFields, EnumValueFields,
    FieldFields, InputValueFields, TypeFields,
};
use crate::types::Type;
use async_trait::async_trait;
use gqlcore_service::{AsObject, FieldParams, Object, SchemaError, SchemaResult};
use std::fmt;
use std::sync::{Arc, Weak};

fn upgrade_type(ty: &Weak<Type>, owner: &str) -> SchemaResult<Arc<dyn TypeFields>> {
    ty.upgrade()
        .map(|ty| ty as Arc<dyn TypeFields>)
        .ok_or_else(|| SchemaError::new(format!("The type of {owner} is not registered in the schema")))
}

fn as_input_values(args: &[Arc<InputValue>]) -> Vec<Arc<dyn InputValueFields>> {
    args.iter()
        .map(|arg| Arc::clone(arg) as Arc<dyn InputValueFields>)
        .collect()
}

/// A field of an object or interface.
pub struct Field {
    name: String,
    description: Option<String>,
    args: Vec<Arc<InputValue>>,
    ty: Weak<Type>,
    deprecation_reason: Option<String>,
    object: Object,
}

impl Field {
    pub fn builder(name: impl Into<String>, ty: &Arc<Type>) -> FieldBuilder {
        FieldBuilder {
            name: name.into(),
            description: None,
            args: Vec::new(),
            ty: Arc::downgrade(ty),
            deprecation_reason: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Arc<InputValue>] {
        &self.args
    }

    /// Returns the field type, if it is still alive.
    pub fn field_type(&self) -> Option<Arc<Type>> {
        self.ty.upgrade()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

#[derive(Debug)]
pub struct FieldBuilder {
    name: String,
    description: Option<String>,
    args: Vec<Arc<InputValue>>,
    ty: Weak<Type>,
    deprecation_reason: Option<String>,
}

impl FieldBuilder {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: Arc<InputValue>) -> Self {
        self.args.push(arg);
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn build(self) -> Arc<Field> {
        Arc::new_cyclic(|this| Field {
            name: self.name,
            description: self.description,
            args: self.args,
            ty: self.ty,
            deprecation_reason: self.deprecation_reason,
            object: field_object(this),
        })
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("deprecated", &self.is_deprecated())
            .finish()
    }
}

impl AsObject for Field {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl FieldFields for Field {
    async fn get_name(&self, _params: FieldParams) -> SchemaResult<String> {
        Ok(self.name.clone())
    }

    async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.description.clone())
    }

    async fn get_args(&self, _params: FieldParams) -> SchemaResult<Vec<Arc<dyn InputValueFields>>> {
        Ok(as_input_values(&self.args))
    }

    async fn get_type(&self, _params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>> {
        upgrade_type(&self.ty, &self.name)
    }

    async fn get_is_deprecated(&self, _params: FieldParams) -> SchemaResult<bool> {
        Ok(self.is_deprecated())
    }

    async fn get_deprecation_reason(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.deprecation_reason.clone())
    }
}

/// An argument or input object field.
pub struct InputValue {
    name: String,
    description: Option<String>,
    ty: Weak<Type>,
    default_value: Option<String>,
    object: Object,
}

impl InputValue {
    pub fn builder(name: impl Into<String>, ty: &Arc<Type>) -> InputValueBuilder {
        InputValueBuilder {
            name: name.into(),
            description: None,
            ty: Arc::downgrade(ty),
            default_value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default value as a GraphQL literal.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

#[derive(Debug)]
pub struct InputValueBuilder {
    name: String,
    description: Option<String>,
    ty: Weak<Type>,
    default_value: Option<String>,
}

impl InputValueBuilder {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value, written as a GraphQL literal.
    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    pub fn build(self) -> Arc<InputValue> {
        Arc::new_cyclic(|this| InputValue {
            name: self.name,
            description: self.description,
            ty: self.ty,
            default_value: self.default_value,
            object: input_value_object(this),
        })
    }
}

impl fmt::Debug for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputValue")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .finish()
    }
}

impl AsObject for InputValue {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl InputValueFields for InputValue {
    async fn get_name(&self, _params: FieldParams) -> SchemaResult<String> {
        Ok(self.name.clone())
    }

    async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.description.clone())
    }

    async fn get_type(&self, _params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>> {
        upgrade_type(&self.ty, &self.name)
    }

    async fn get_default_value(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.default_value.clone())
    }
}

/// A value of an enum type.
pub struct EnumValue {
    name: String,
    description: Option<String>,
    deprecation_reason: Option<String>,
    object: Object,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, description: Option<&str>, deprecation_reason: Option<&str>) -> Arc<Self> {
        let name = name.into();
        let description = description.map(str::to_string);
        let deprecation_reason = deprecation_reason.map(str::to_string);

        Arc::new_cyclic(|this| EnumValue {
            name,
            description,
            deprecation_reason,
            object: enum_value_object(this),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

impl fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValue")
            .field("name", &self.name)
            .field("deprecated", &self.is_deprecated())
            .finish()
    }
}

impl AsObject for EnumValue {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl EnumValueFields for EnumValue {
    async fn get_name(&self, _params: FieldParams) -> SchemaResult<String> {
        Ok(self.name.clone())
    }

    async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.description.clone())
    }

    async fn get_is_deprecated(&self, _params: FieldParams) -> SchemaResult<bool> {
        Ok(self.is_deprecated())
    }

    async fn get_deprecation_reason(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.deprecation_reason.clone())
    }
}

/// A directive the schema accepts.
pub struct Directive {
    name: String,
    description: Option<String>,
    locations: Vec<DirectiveLocation>,
    args: Vec<Arc<InputValue>>,
    object: Object,
}

impl Directive {
    pub fn new(
        name: impl Into<String>,
        description: Option<&str>,
        locations: Vec<DirectiveLocation>,
        args: Vec<Arc<InputValue>>,
    ) -> Arc<Self> {
        let name = name.into();
        let description = description.map(str::to_string);

        Arc::new_cyclic(|this| Directive {
            name,
            description,
            locations,
            args,
            object: directive_object(this),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locations(&self) -> &[DirectiveLocation] {
        &self.locations
    }

    pub fn args(&self) -> &[Arc<InputValue>] {
        &self.args
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("name", &self.name)
            .field("locations", &self.locations)
            .finish()
    }
}

impl AsObject for Directive {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl DirectiveFields for Directive {
    async fn get_name(&self, _params: FieldParams) -> SchemaResult<String> {
        Ok(self.name.clone())
    }

    async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
        Ok(self.description.clone())
    }

    async fn get_locations(&self, _params: FieldParams) -> SchemaResult<Vec<DirectiveLocation>> {
        Ok(self.locations.clone())
    }

    async fn get_args(&self, _params: FieldParams) -> SchemaResult<Vec<Arc<dyn InputValueFields>>> {
        Ok(as_input_values(&self.args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::TypeKind;
    use gqlcore_response::Value;
    use gqlcore_service::{FieldSelection, SelectionSetParams};

    #[tokio::test]
    async fn test_field_object() {
        let string = Type::named(TypeKind::Scalar, "String", None).unwrap();
        let field = Field::builder("greeting", &string)
            .description("Says hello")
            .arg(InputValue::builder("name", &string).default_value("\"World\"").build())
            .deprecated("Use salutation")
            .build();

        let value = field
            .object()
            .resolve(
                &SelectionSetParams::default(),
                &vec![
                    FieldSelection::new("name").into(),
                    FieldSelection::new("description").into(),
                    FieldSelection::new("args")
                        .with_selection([FieldSelection::new("name"), FieldSelection::new("defaultValue")])
                        .into(),
                    FieldSelection::new("type").with_selection([FieldSelection::new("name")]).into(),
                    FieldSelection::new("isDeprecated").into(),
                    FieldSelection::new("deprecationReason").into(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            value.to_string(),
            r#"{name: "greeting", description: "Says hello", args: [{name: "name", defaultValue: "\"World\""}], type: {name: "String"}, isDeprecated: true, deprecationReason: "Use salutation"}"#
        );
    }

    #[tokio::test]
    async fn test_unregistered_type() {
        let field = {
            let orphan = Type::named(TypeKind::Scalar, "Orphan", None).unwrap();
            Field::builder("orphaned", &orphan).build()
        };

        let err = field
            .object()
            .resolve(
                &SelectionSetParams::default(),
                &vec![FieldSelection::new("type").with_selection([FieldSelection::new("name")]).into()],
            )
            .await
            .unwrap_err();

        assert_eq!(err.messages(), ["The type of orphaned is not registered in the schema"]);
        assert!(field.field_type().is_none());
    }

    #[tokio::test]
    async fn test_directive_object() {
        let boolean = Type::named(TypeKind::Scalar, "Boolean", None).unwrap();
        let directive = Directive::new(
            "skip",
            None,
            vec![DirectiveLocation::Field, DirectiveLocation::InlineFragment],
            vec![InputValue::builder("if", &boolean).build()],
        );

        let value = directive
            .object()
            .resolve(
                &SelectionSetParams::default(),
                &vec![
                    FieldSelection::new("name").into(),
                    FieldSelection::new("description").into(),
                    FieldSelection::new("locations").into(),
                    FieldSelection::new("args").with_selection([FieldSelection::new("name")]).into(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            value.to_string(),
            r#"{name: "skip", description: null, locations: [FIELD, INLINE_FRAGMENT], args: [{name: "if"}]}"#
        );
        assert_eq!(value.get("__typename"), None::<&Value>);
    }

    #[tokio::test]
    async fn test_enum_value_object() {
        let value = EnumValue::new("LEGACY", Some("Old"), Some("Gone"));

        let resolved = value
            .object()
            .resolve(
                &SelectionSetParams::default(),
                &vec![
                    FieldSelection::new("__typename").into(),
                    FieldSelection::new("isDeprecated").into(),
                    FieldSelection::new("deprecationReason").into(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            resolved.to_string(),
            r#"{__typename: "__EnumValue", isDeprecated: true, deprecationReason: "Gone"}"#
        );
    }
}
