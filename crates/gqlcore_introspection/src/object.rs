//! Meta-schema objects.
//!
//! Each `*Fields` trait is the getter seam for one meta type: a collaborator
//! that describes a schema implements it, and the matching `*_object`
//! function builds the [`Object`] that serves the introspection fields by
//! calling those getters and converting their typed results.
//!
//! The builders take a `Weak` handle so a collaborator can embed its own
//! object (see `Arc::new_cyclic`) without a reference cycle.

use crate::kinds::{DirectiveLocation, TypeKind};
use async_trait::async_trait;
use futures_util::future;
use gqlcore_response::Value;
use gqlcore_service::{
    convert, find, require, AsObject, FieldParams, Object, Resolver, ResolverFuture, ResolverMap,
    ResolverParams, ResultType, SchemaError, SchemaResult,
};
use std::future::Future;
use std::sync::{Arc, Weak};

/// Getters behind `__Schema`.
#[async_trait]
pub trait SchemaFields: AsObject + Send + Sync {
    async fn get_types(&self, params: FieldParams) -> SchemaResult<Vec<Arc<dyn TypeFields>>>;
    async fn get_query_type(&self, params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>>;
    async fn get_mutation_type(&self, params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>>;
    async fn get_subscription_type(&self, params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>>;
    async fn get_directives(&self, params: FieldParams) -> SchemaResult<Vec<Arc<dyn DirectiveFields>>>;
}

/// Getters behind `__Type`.
///
/// List getters return `None` for kinds the list does not apply to, e.g.
/// `get_fields` on a scalar.
#[async_trait]
pub trait TypeFields: AsObject + Send + Sync {
    async fn get_kind(&self, params: FieldParams) -> SchemaResult<TypeKind>;
    async fn get_name(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_description(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_fields(
        &self,
        params: FieldParams,
        include_deprecated: Option<bool>,
    ) -> SchemaResult<Option<Vec<Arc<dyn FieldFields>>>>;
    async fn get_interfaces(&self, params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>>;
    async fn get_possible_types(&self, params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>>;
    async fn get_enum_values(
        &self,
        params: FieldParams,
        include_deprecated: Option<bool>,
    ) -> SchemaResult<Option<Vec<Arc<dyn EnumValueFields>>>>;
    async fn get_input_fields(&self, params: FieldParams)
        -> SchemaResult<Option<Vec<Arc<dyn InputValueFields>>>>;
    async fn get_of_type(&self, params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>>;
}

/// Getters behind `__Field`.
#[async_trait]
pub trait FieldFields: AsObject + Send + Sync {
    async fn get_name(&self, params: FieldParams) -> SchemaResult<String>;
    async fn get_description(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_args(&self, params: FieldParams) -> SchemaResult<Vec<Arc<dyn InputValueFields>>>;
    async fn get_type(&self, params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>>;
    async fn get_is_deprecated(&self, params: FieldParams) -> SchemaResult<bool>;
    async fn get_deprecation_reason(&self, params: FieldParams) -> SchemaResult<Option<String>>;
}

/// Getters behind `__InputValue`.
#[async_trait]
pub trait InputValueFields: AsObject + Send + Sync {
    async fn get_name(&self, params: FieldParams) -> SchemaResult<String>;
    async fn get_description(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_type(&self, params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>>;
    async fn get_default_value(&self, params: FieldParams) -> SchemaResult<Option<String>>;
}

/// Getters behind `__EnumValue`.
#[async_trait]
pub trait EnumValueFields: AsObject + Send + Sync {
    async fn get_name(&self, params: FieldParams) -> SchemaResult<String>;
    async fn get_description(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_is_deprecated(&self, params: FieldParams) -> SchemaResult<bool>;
    async fn get_deprecation_reason(&self, params: FieldParams) -> SchemaResult<Option<String>>;
}

/// Getters behind `__Directive`.
#[async_trait]
pub trait DirectiveFields: AsObject + Send + Sync {
    async fn get_name(&self, params: FieldParams) -> SchemaResult<String>;
    async fn get_description(&self, params: FieldParams) -> SchemaResult<Option<String>>;
    async fn get_locations(&self, params: FieldParams) -> SchemaResult<Vec<DirectiveLocation>>;
    async fn get_args(&self, params: FieldParams) -> SchemaResult<Vec<Arc<dyn InputValueFields>>>;
}

/// Declared defaults of `__Type.fields` and `__Type.enumValues`.
pub(crate) fn include_deprecated_defaults() -> Value {
    [("includeDeprecated", Value::from(false))].into_iter().collect()
}

/// Reads `includeDeprecated`, falling back to its declared default.
fn include_deprecated(arguments: &Value) -> SchemaResult<Option<bool>> {
    match find::<Option<bool>>("includeDeprecated", arguments)? {
        Some(value) => Ok(value),
        None => require("includeDeprecated", &include_deprecated_defaults()),
    }
}

/// Builds a resolver that upgrades `this`, calls `get` and converts the
/// typed result.
fn getter<T, R, F, Fut>(this: &Weak<T>, get: F) -> Resolver
where
    T: Send + Sync + 'static,
    R: ResultType,
    F: Fn(Arc<T>, ResolverParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SchemaResult<R>> + Send + 'static,
{
    let this = this.clone();
    Arc::new(move |params: ResolverParams| match this.upgrade() {
        Some(target) => convert(get(target, params.clone()), params),
        None => Box::pin(future::ready(Err(SchemaError::new(format!(
            "Field {} resolved after its schema was dropped",
            params.field_name
        ))))) as ResolverFuture,
    })
}

fn resolvers(entries: Vec<(&str, Resolver)>) -> ResolverMap {
    entries
        .into_iter()
        .map(|(name, resolver)| (name.to_string(), resolver))
        .collect()
}

/// Builds the `__Schema` object.
pub fn schema_object<T: SchemaFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__Schema",
        resolvers(vec![
            ("types", getter(this, |s, p| async move { s.get_types(p.field_params()).await })),
            ("queryType", getter(this, |s, p| async move { s.get_query_type(p.field_params()).await })),
            (
                "mutationType",
                getter(this, |s, p| async move { s.get_mutation_type(p.field_params()).await }),
            ),
            (
                "subscriptionType",
                getter(this, |s, p| async move { s.get_subscription_type(p.field_params()).await }),
            ),
            ("directives", getter(this, |s, p| async move { s.get_directives(p.field_params()).await })),
        ]),
    )
}

/// Builds the `__Type` object.
pub fn type_object<T: TypeFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__Type",
        resolvers(vec![
            ("kind", getter(this, |t, p| async move { t.get_kind(p.field_params()).await })),
            ("name", getter(this, |t, p| async move { t.get_name(p.field_params()).await })),
            ("description", getter(this, |t, p| async move { t.get_description(p.field_params()).await })),
            (
                "fields",
                getter(this, |t, p| async move {
                    let include_deprecated = include_deprecated(&p.arguments)?;
                    t.get_fields(p.field_params(), include_deprecated).await
                }),
            ),
            ("interfaces", getter(this, |t, p| async move { t.get_interfaces(p.field_params()).await })),
            (
                "possibleTypes",
                getter(this, |t, p| async move { t.get_possible_types(p.field_params()).await }),
            ),
            (
                "enumValues",
                getter(this, |t, p| async move {
                    let include_deprecated = include_deprecated(&p.arguments)?;
                    t.get_enum_values(p.field_params(), include_deprecated).await
                }),
            ),
            ("inputFields", getter(this, |t, p| async move { t.get_input_fields(p.field_params()).await })),
            ("ofType", getter(this, |t, p| async move { t.get_of_type(p.field_params()).await })),
        ]),
    )
}

/// Builds the `__Field` object.
pub fn field_object<T: FieldFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__Field",
        resolvers(vec![
            ("name", getter(this, |f, p| async move { f.get_name(p.field_params()).await })),
            ("description", getter(this, |f, p| async move { f.get_description(p.field_params()).await })),
            ("args", getter(this, |f, p| async move { f.get_args(p.field_params()).await })),
            ("type", getter(this, |f, p| async move { f.get_type(p.field_params()).await })),
            ("isDeprecated", getter(this, |f, p| async move { f.get_is_deprecated(p.field_params()).await })),
            (
                "deprecationReason",
                getter(this, |f, p| async move { f.get_deprecation_reason(p.field_params()).await }),
            ),
        ]),
    )
}

/// Builds the `__InputValue` object.
pub fn input_value_object<T: InputValueFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__InputValue",
        resolvers(vec![
            ("name", getter(this, |v, p| async move { v.get_name(p.field_params()).await })),
            ("description", getter(this, |v, p| async move { v.get_description(p.field_params()).await })),
            ("type", getter(this, |v, p| async move { v.get_type(p.field_params()).await })),
            ("defaultValue", getter(this, |v, p| async move { v.get_default_value(p.field_params()).await })),
        ]),
    )
}

/// Builds the `__EnumValue` object.
pub fn enum_value_object<T: EnumValueFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__EnumValue",
        resolvers(vec![
            ("name", getter(this, |v, p| async move { v.get_name(p.field_params()).await })),
            ("description", getter(this, |v, p| async move { v.get_description(p.field_params()).await })),
            ("isDeprecated", getter(this, |v, p| async move { v.get_is_deprecated(p.field_params()).await })),
            (
                "deprecationReason",
                getter(this, |v, p| async move { v.get_deprecation_reason(p.field_params()).await }),
            ),
        ]),
    )
}

/// Builds the `__Directive` object.
pub fn directive_object<T: DirectiveFields + 'static>(this: &Weak<T>) -> Object {
    Object::new(
        "__Directive",
        resolvers(vec![
            ("name", getter(this, |d, p| async move { d.get_name(p.field_params()).await })),
            ("description", getter(this, |d, p| async move { d.get_description(p.field_params()).await })),
            ("locations", getter(this, |d, p| async move { d.get_locations(p.field_params()).await })),
            ("args", getter(this, |d, p| async move { d.get_args(p.field_params()).await })),
        ]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlcore_service::{FieldSelection, SelectionSet, SelectionSetParams};
    use std::sync::Mutex;

    /// An enum type with one deprecated value, recording the
    /// `includeDeprecated` it was asked for.
    struct Color {
        seen: Mutex<Vec<Option<bool>>>,
        object: Object,
    }

    impl Color {
        fn new() -> Arc<Self> {
            Arc::new_cyclic(|this| Color {
                seen: Mutex::new(Vec::new()),
                object: type_object(this),
            })
        }
    }

    impl AsObject for Color {
        fn object(&self) -> &Object {
            &self.object
        }
    }

    #[async_trait]
    impl TypeFields for Color {
        async fn get_kind(&self, _params: FieldParams) -> SchemaResult<TypeKind> {
            Ok(TypeKind::Enum)
        }

        async fn get_name(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
            Ok(Some("Color".to_string()))
        }

        async fn get_description(&self, _params: FieldParams) -> SchemaResult<Option<String>> {
            Ok(None)
        }

        async fn get_fields(
            &self,
            _params: FieldParams,
            _include_deprecated: Option<bool>,
        ) -> SchemaResult<Option<Vec<Arc<dyn FieldFields>>>> {
            Ok(None)
        }

        async fn get_interfaces(&self, _params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>> {
            Ok(None)
        }

        async fn get_possible_types(&self, _params: FieldParams) -> SchemaResult<Option<Vec<Arc<dyn TypeFields>>>> {
            Ok(None)
        }

        async fn get_enum_values(
            &self,
            _params: FieldParams,
            include_deprecated: Option<bool>,
        ) -> SchemaResult<Option<Vec<Arc<dyn EnumValueFields>>>> {
            self.seen.lock().unwrap().push(include_deprecated);
            Ok(Some(Vec::new()))
        }

        async fn get_input_fields(
            &self,
            _params: FieldParams,
        ) -> SchemaResult<Option<Vec<Arc<dyn InputValueFields>>>> {
            Ok(None)
        }

        async fn get_of_type(&self, _params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>> {
            Ok(None)
        }
    }

    async fn query(color: &Arc<Color>, selection: SelectionSet) -> SchemaResult<Value> {
        color.object().resolve(&SelectionSetParams::default(), &selection).await
    }

    #[test]
    fn test_include_deprecated_default() {
        let arguments = Value::new(gqlcore_response::Type::Map);
        assert_eq!(include_deprecated(&arguments), Ok(Some(false)));
    }

    #[tokio::test]
    async fn test_include_deprecated_reaches_getter() {
        let color = Color::new();

        query(&color, vec![FieldSelection::new("enumValues").with_selection([FieldSelection::new("name")]).into()])
            .await
            .unwrap();
        query(
            &color,
            vec![FieldSelection::new("enumValues")
                .with_argument("includeDeprecated", true)
                .with_selection([FieldSelection::new("name")])
                .into()],
        )
        .await
        .unwrap();

        assert_eq!(*color.seen.lock().unwrap(), [Some(false), Some(true)]);
    }

    #[tokio::test]
    async fn test_invalid_include_deprecated() {
        let color = Color::new();

        let err = query(
            &color,
            vec![FieldSelection::new("enumValues")
                .with_argument("includeDeprecated", "yes")
                .with_selection([FieldSelection::new("name")])
                .into()],
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.messages(),
            ["Invalid argument: includeDeprecated error: not a valid Boolean value"]
        );
    }

    #[tokio::test]
    async fn test_type_object_fields() {
        let color = Color::new();

        let value = query(
            &color,
            vec![
                FieldSelection::new("__typename").into(),
                FieldSelection::new("kind").into(),
                FieldSelection::new("name").into(),
                FieldSelection::new("fields").with_selection([FieldSelection::new("name")]).into(),
                FieldSelection::new("ofType").with_selection([FieldSelection::new("name")]).into(),
            ],
        )
        .await
        .unwrap();

        assert_eq!(
            value.to_string(),
            r#"{__typename: "__Type", kind: ENUM, name: "Color", fields: null, ofType: null}"#
        );
    }

    #[tokio::test]
    async fn test_dropped_collaborator() {
        let color = Color::new();
        let object_params = SelectionSetParams::default();
        let resolver = Arc::clone(color.object().resolver("kind").unwrap());
        drop(color);

        let err = resolver(ResolverParams::new(object_params, "kind")).await.unwrap_err();

        assert_eq!(err.messages(), ["Field kind resolved after its schema was dropped"]);
    }
}
