//! Built-in scalars, directives and the introspection meta types.
//!
//! The declared type of every meta field is derived from the Rust type its
//! getter returns, so the schema graph and the resolvers agree on every
//! modifier stack.

use crate::kinds::{DirectiveLocation, TypeKind};
use crate::members::{Directive, EnumValue, Field, InputValue};
use crate::object::{
    include_deprecated_defaults, DirectiveFields, EnumValueFields, FieldFields, InputValueFields, TypeFields,
};
use crate::schema::SchemaBuilder;
use crate::types::Type;
use gqlcore_response::Value;
use gqlcore_service::{ResultType, SchemaResult};
use std::sync::Arc;

const BUILT_IN: &str = "Built-in type";

/// The built-in scalars, in registration order.
pub const SCALARS: [&str; 5] = ["Int", "Float", "ID", "String", "Boolean"];

type TypeRef = Arc<dyn TypeFields>;

fn field<R: ResultType>(builder: &mut SchemaBuilder, name: &str, inner: &Arc<Type>) -> SchemaResult<Arc<Field>> {
    Ok(Field::builder(name, &builder.wrap_result::<R>(inner)?).build())
}

fn meta_enum(name: &str, values: &[&str]) -> SchemaResult<Arc<Type>> {
    let ty = Type::named(TypeKind::Enum, name, None)?;
    ty.add_enum_values(values.iter().map(|value| EnumValue::new(*value, None, None)).collect())?;
    Ok(ty)
}

/// Registers the built-in scalars, `__TypeKind`, `__DirectiveLocation`, the
/// six meta object types and the `@skip`, `@include` and `@deprecated`
/// directives.
pub fn add_types_to_schema(builder: &mut SchemaBuilder) -> SchemaResult<()> {
    for name in SCALARS {
        builder.add_type(Type::named(TypeKind::Scalar, name, Some(BUILT_IN))?)?;
    }

    builder.add_type(meta_enum(TypeKind::TYPE_NAME, TypeKind::NAMES)?)?;
    builder.add_type(meta_enum(DirectiveLocation::TYPE_NAME, DirectiveLocation::NAMES)?)?;

    // Object types first; their fields refer to each other.
    let schema = Type::named(TypeKind::Object, "__Schema", None)?;
    let ty = Type::named(TypeKind::Object, "__Type", None)?;
    let field_type = Type::named(TypeKind::Object, "__Field", None)?;
    let input_value = Type::named(TypeKind::Object, "__InputValue", None)?;
    let enum_value = Type::named(TypeKind::Object, "__EnumValue", None)?;
    let directive = Type::named(TypeKind::Object, "__Directive", None)?;
    for meta in [&schema, &ty, &field_type, &input_value, &enum_value, &directive] {
        builder.add_type(Arc::clone(meta))?;
    }

    let string = builder.lookup_type("String")?;
    let boolean = builder.lookup_type("Boolean")?;
    let type_kind = builder.lookup_type(TypeKind::TYPE_NAME)?;
    let location = builder.lookup_type(DirectiveLocation::TYPE_NAME)?;

    let mut include_deprecated =
        InputValue::builder("includeDeprecated", &builder.wrap_argument::<Option<bool>>(&boolean)?);
    if let Some(default) = include_deprecated_defaults().get("includeDeprecated") {
        include_deprecated = include_deprecated.default_value(default.to_string());
    }
    let include_deprecated = include_deprecated.build();

    schema.add_fields(vec![
        field::<Vec<TypeRef>>(builder, "types", &ty)?,
        field::<TypeRef>(builder, "queryType", &ty)?,
        field::<Option<TypeRef>>(builder, "mutationType", &ty)?,
        field::<Option<TypeRef>>(builder, "subscriptionType", &ty)?,
        field::<Vec<Arc<dyn DirectiveFields>>>(builder, "directives", &directive)?,
    ])?;

    ty.add_fields(vec![
        field::<TypeKind>(builder, "kind", &type_kind)?,
        field::<Option<String>>(builder, "name", &string)?,
        field::<Option<String>>(builder, "description", &string)?,
        Field::builder(
            "fields",
            &builder.wrap_result::<Option<Vec<Arc<dyn FieldFields>>>>(&field_type)?,
        )
        .arg(Arc::clone(&include_deprecated))
        .build(),
        field::<Option<Vec<TypeRef>>>(builder, "interfaces", &ty)?,
        field::<Option<Vec<TypeRef>>>(builder, "possibleTypes", &ty)?,
        Field::builder(
            "enumValues",
            &builder.wrap_result::<Option<Vec<Arc<dyn EnumValueFields>>>>(&enum_value)?,
        )
        .arg(include_deprecated)
        .build(),
        field::<Option<Vec<Arc<dyn InputValueFields>>>>(builder, "inputFields", &input_value)?,
        field::<Option<TypeRef>>(builder, "ofType", &ty)?,
    ])?;

    field_type.add_fields(vec![
        field::<String>(builder, "name", &string)?,
        field::<Option<String>>(builder, "description", &string)?,
        field::<Vec<Arc<dyn InputValueFields>>>(builder, "args", &input_value)?,
        field::<TypeRef>(builder, "type", &ty)?,
        field::<bool>(builder, "isDeprecated", &boolean)?,
        field::<Option<String>>(builder, "deprecationReason", &string)?,
    ])?;

    input_value.add_fields(vec![
        field::<String>(builder, "name", &string)?,
        field::<Option<String>>(builder, "description", &string)?,
        field::<TypeRef>(builder, "type", &ty)?,
        field::<Option<String>>(builder, "defaultValue", &string)?,
    ])?;

    enum_value.add_fields(vec![
        field::<String>(builder, "name", &string)?,
        field::<Option<String>>(builder, "description", &string)?,
        field::<bool>(builder, "isDeprecated", &boolean)?,
        field::<Option<String>>(builder, "deprecationReason", &string)?,
    ])?;

    directive.add_fields(vec![
        field::<String>(builder, "name", &string)?,
        field::<Option<String>>(builder, "description", &string)?,
        field::<Vec<DirectiveLocation>>(builder, "locations", &location)?,
        field::<Vec<Arc<dyn InputValueFields>>>(builder, "args", &input_value)?,
    ])?;

    add_builtin_directives(builder, &string, &boolean)
}

fn add_builtin_directives(builder: &mut SchemaBuilder, string: &Arc<Type>, boolean: &Arc<Type>) -> SchemaResult<()> {
    let condition = builder.wrap_argument::<bool>(boolean)?;
    let conditional = vec![
        DirectiveLocation::Field,
        DirectiveLocation::FragmentSpread,
        DirectiveLocation::InlineFragment,
    ];

    builder.add_directive(Directive::new(
        "skip",
        Some("Directs the executor to skip this field or fragment when the `if` argument is true."),
        conditional.clone(),
        vec![InputValue::builder("if", &condition).description("Skipped when true.").build()],
    ))?;
    builder.add_directive(Directive::new(
        "include",
        Some("Directs the executor to include this field or fragment only when the `if` argument is true."),
        conditional,
        vec![InputValue::builder("if", &condition).description("Included when true.").build()],
    ))?;

    let reason = builder.wrap_argument::<Option<String>>(string)?;
    builder.add_directive(Directive::new(
        "deprecated",
        Some("Marks an element of a GraphQL schema as no longer supported."),
        vec![DirectiveLocation::FieldDefinition, DirectiveLocation::EnumValue],
        vec![InputValue::builder("reason", &reason)
            .default_value(Value::from("No longer supported").to_string())
            .build()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_types(ty: &Type) -> Vec<String> {
        ty.fields()
            .iter()
            .map(|field| {
                let field_type = field.field_type().map(|t| t.to_string()).unwrap_or_default();
                format!("{}: {field_type}", field.name())
            })
            .collect()
    }

    #[test]
    fn test_registration_order() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();

        let names: Vec<_> = schema.types().filter_map(|ty| ty.name()).collect();
        assert_eq!(
            names,
            [
                "Int",
                "Float",
                "ID",
                "String",
                "Boolean",
                "__TypeKind",
                "__DirectiveLocation",
                "__Schema",
                "__Type",
                "__Field",
                "__InputValue",
                "__EnumValue",
                "__Directive",
            ]
        );
        assert_eq!(schema.lookup_type("Int").unwrap().description(), Some("Built-in type"));
    }

    #[test]
    fn test_meta_field_types() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();

        assert_eq!(
            field_types(&schema.lookup_type("__Schema").unwrap()),
            [
                "types: [__Type!]!",
                "queryType: __Type!",
                "mutationType: __Type",
                "subscriptionType: __Type",
                "directives: [__Directive!]!",
            ]
        );
        assert_eq!(
            field_types(&schema.lookup_type("__Type").unwrap()),
            [
                "kind: __TypeKind!",
                "name: String",
                "description: String",
                "fields: [__Field!]",
                "interfaces: [__Type!]",
                "possibleTypes: [__Type!]",
                "enumValues: [__EnumValue!]",
                "inputFields: [__InputValue!]",
                "ofType: __Type",
            ]
        );
        assert_eq!(
            field_types(&schema.lookup_type("__Directive").unwrap()),
            [
                "name: String!",
                "description: String",
                "locations: [__DirectiveLocation!]!",
                "args: [__InputValue!]!",
            ]
        );
    }

    #[test]
    fn test_wrapped_types_are_shared() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();
        let meta_type = schema.lookup_type("__Type").unwrap();
        let field_meta = schema.lookup_type("__Field").unwrap();

        let of_type = meta_type.fields().iter().find(|f| f.name() == "ofType").unwrap();
        let interfaces = meta_type.fields().iter().find(|f| f.name() == "interfaces").unwrap();
        let possible = meta_type.fields().iter().find(|f| f.name() == "possibleTypes").unwrap();
        let field_type = field_meta.fields().iter().find(|f| f.name() == "type").unwrap();

        assert!(Arc::ptr_eq(
            &interfaces.field_type().unwrap(),
            &possible.field_type().unwrap()
        ));
        assert!(!Arc::ptr_eq(
            &of_type.field_type().unwrap(),
            &field_type.field_type().unwrap()
        ));
        assert!(Arc::ptr_eq(&of_type.field_type().unwrap(), &meta_type));
    }

    #[test]
    fn test_include_deprecated_argument() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();
        let meta_type = schema.lookup_type("__Type").unwrap();

        for name in ["fields", "enumValues"] {
            let field = meta_type.fields().iter().find(|f| f.name() == name).unwrap();
            let arg = &field.args()[0];
            assert_eq!(arg.name(), "includeDeprecated");
            assert_eq!(arg.default_value(), Some("false"));
        }
    }

    #[test]
    fn test_enum_tables() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();

        let kinds: Vec<_> = schema
            .lookup_type("__TypeKind")
            .unwrap()
            .enum_values()
            .iter()
            .map(|value| value.name().to_string())
            .collect();
        assert_eq!(kinds, TypeKind::NAMES);

        let locations = schema.lookup_type("__DirectiveLocation").unwrap();
        assert_eq!(locations.enum_values().len(), 18);
    }

    #[test]
    fn test_builtin_directives() {
        let schema = SchemaBuilder::with_builtins().unwrap().build();

        let names: Vec<_> = schema.directives().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["skip", "include", "deprecated"]);

        let deprecated = &schema.directives()[2];
        assert_eq!(deprecated.args()[0].default_value(), Some("\"No longer supported\""));
        assert_eq!(
            deprecated.locations(),
            [DirectiveLocation::FieldDefinition, DirectiveLocation::EnumValue]
        );
    }

    #[test]
    fn test_builtins_registered_once() {
        let mut builder = SchemaBuilder::with_builtins().unwrap();
        assert!(add_types_to_schema(&mut builder).is_err());
    }
}
