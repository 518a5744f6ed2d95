//! # gqlcore_introspection
//!
//! The introspection meta-schema: the schema described as queryable objects.
//!
//! ## Overview
//!
//! - [`TypeKind`], [`DirectiveLocation`]: the two meta enums
//! - [`SchemaFields`], [`TypeFields`], …: getter seams behind `__Schema`,
//!   `__Type`, `__Field`, `__InputValue`, `__EnumValue` and `__Directive`
//! - [`Type`], [`Field`], [`InputValue`], [`EnumValue`], [`Directive`]: a
//!   concrete schema model implementing those seams
//! - [`SchemaBuilder`], [`Schema`]: the schema graph, with shared wrapper
//!   types and the built-in types registered by [`add_types_to_schema`]
//! - [`add_introspection_fields`]: `__schema` and `__type` on a query root
//!
//! ## Example
//!
//! ```
//! use gqlcore_introspection::{add_introspection_fields, Field, SchemaBuilder, Type, TypeKind};
//! use gqlcore_service::{Object, ResolverMap, ServiceConfig};
//!
//! let mut builder = SchemaBuilder::with_builtins()?;
//! let string = builder.lookup_type("String")?;
//! let query = Type::named(TypeKind::Object, "Query", None)?;
//! query.add_fields(vec![Field::builder("hello", &string).build()])?;
//! builder.add_type(query.clone())?;
//! builder.set_query_type(&query)?;
//! let schema = builder.build();
//!
//! let mut resolvers = ResolverMap::new();
//! add_introspection_fields(&mut resolvers, &schema, &ServiceConfig::default());
//! let root = Object::new("Query", resolvers);
//!
//! assert!(root.resolver("__schema").is_some());
//! assert!(root.resolver("__type").is_some());
//! # Ok::<(), gqlcore_service::SchemaError>(())
//! ```

pub mod builtins;
pub mod kinds;
pub mod members;
pub mod object;
pub mod schema;
pub mod types;

pub use builtins::add_types_to_schema;
pub use kinds::{DirectiveLocation, TypeKind};
pub use members::{Directive, EnumValue, Field, FieldBuilder, InputValue, InputValueBuilder};
pub use object::{
    directive_object, enum_value_object, field_object, input_value_object, schema_object, type_object,
    DirectiveFields, EnumValueFields, FieldFields, InputValueFields, SchemaFields, TypeFields,
};
pub use schema::{add_introspection_fields, Schema, SchemaBuilder};
pub use types::Type;
