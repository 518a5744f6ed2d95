//! The schema graph and its builder.
//!
//! The builder owns every type while the graph is wired together, then hands
//! ownership to the [`Schema`]. Entities refer to each other through weak
//! handles, so the schema is the only strong root; once built, the graph is
//! immutable and shared by every request without locking.

use crate::builtins::add_types_to_schema;
use crate::kinds::TypeKind;
use crate::members::Directive;
use crate::object::{schema_object, DirectiveFields, SchemaFields, TypeFields};
use crate::types::Type;
use async_trait::async_trait;
use futures_util::future;
use gqlcore_service::{
    convert, require, ArgumentType, AsObject, FieldParams, Object, ResolverFuture, ResolverMap, ResolverParams,
    ResultType, SchemaError, SchemaResult, ServiceConfig, TypeModifier,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Wrappers keyed by the address of the wrapped type.
///
/// A cached wrapper holds its inner type strongly, so an address cannot be
/// reused while its entry exists.
type WrapperCache = FxHashMap<usize, Arc<Type>>;

fn cache_key(inner: &Arc<Type>) -> usize {
    Arc::as_ptr(inner) as usize
}

/// Assembles a [`Schema`].
///
/// # Example
///
/// ```
/// use gqlcore_introspection::{Field, SchemaBuilder, Type, TypeKind};
///
/// let mut builder = SchemaBuilder::with_builtins()?;
/// let string = builder.lookup_type("String")?;
///
/// let query = Type::named(TypeKind::Object, "Query", None)?;
/// query.add_fields(vec![Field::builder("hello", &string).build()])?;
/// builder.add_type(query.clone())?;
/// builder.set_query_type(&query)?;
///
/// let schema = builder.build();
/// assert!(schema.find_type("Query").is_some());
/// # Ok::<(), gqlcore_service::SchemaError>(())
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    types: IndexMap<String, Arc<Type>>,
    list_types: WrapperCache,
    non_null_types: WrapperCache,
    query_type: Option<Arc<Type>>,
    mutation_type: Option<Arc<Type>>,
    subscription_type: Option<Arc<Type>>,
    directives: Vec<Arc<Directive>>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the built-in scalars, directives and the
    /// introspection meta types already registered.
    pub fn with_builtins() -> SchemaResult<Self> {
        let mut builder = Self::new();
        add_types_to_schema(&mut builder)?;
        Ok(builder)
    }

    /// Registers a named type.
    pub fn add_type(&mut self, ty: Arc<Type>) -> SchemaResult<()> {
        let Some(name) = ty.name().map(str::to_string) else {
            return Err(SchemaError::new(format!("Cannot register unnamed type {ty}")));
        };
        if self.types.contains_key(&name) {
            return Err(SchemaError::new(format!("Duplicate type name: {name}")));
        }

        debug!(name = %name, kind = %ty.kind(), "registering type");
        self.types.insert(name, ty);
        Ok(())
    }

    /// Looks up a registered type, failing if it was not registered first.
    pub fn lookup_type(&self, name: &str) -> SchemaResult<Arc<Type>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::new(format!("Unknown type name: {name}")))
    }

    /// Wraps `inner` in a `LIST` or `NON_NULL`.
    ///
    /// Wrapping the same type with the same kind twice returns the same
    /// instance.
    pub fn wrap_type(&mut self, kind: TypeKind, inner: &Arc<Type>) -> SchemaResult<Arc<Type>> {
        let cache = match kind {
            TypeKind::List => &mut self.list_types,
            TypeKind::NonNull if inner.kind() == TypeKind::NonNull => {
                return Err(SchemaError::new(format!("Cannot wrap non-null type {inner} in NON_NULL")));
            }
            TypeKind::NonNull => &mut self.non_null_types,
            _ => return Err(SchemaError::new(format!("{kind} is not a wrapper kind"))),
        };

        let wrapper = cache
            .entry(cache_key(inner))
            .or_insert_with(|| Type::wrapper(kind, Arc::clone(inner)));
        Ok(Arc::clone(wrapper))
    }

    /// Wraps `inner` according to a modifier stack.
    ///
    /// Types are non-null unless a `Nullable` modifier says otherwise, so an
    /// empty stack yields `inner!` and `[List, Nullable]` yields `[inner]!`.
    pub fn wrap_modifiers(&mut self, modifiers: &[TypeModifier], inner: &Arc<Type>) -> SchemaResult<Arc<Type>> {
        self.wrap(modifiers, inner, false)
    }

    fn wrap(&mut self, modifiers: &[TypeModifier], inner: &Arc<Type>, nullable: bool) -> SchemaResult<Arc<Type>> {
        match modifiers.split_first() {
            None if nullable => Ok(Arc::clone(inner)),
            None => self.wrap_type(TypeKind::NonNull, inner),
            Some((TypeModifier::Nullable, rest)) => self.wrap(rest, inner, true),
            Some((TypeModifier::List, rest)) => {
                let element = self.wrap(rest, inner, false)?;
                let list = self.wrap_type(TypeKind::List, &element)?;
                if nullable {
                    Ok(list)
                } else {
                    self.wrap_type(TypeKind::NonNull, &list)
                }
            }
        }
    }

    /// Wraps `inner` the way a resolver returning `R` produces it.
    pub fn wrap_result<R: ResultType>(&mut self, inner: &Arc<Type>) -> SchemaResult<Arc<Type>> {
        self.wrap_modifiers(&R::modifiers(), inner)
    }

    /// Wraps `inner` the way an argument read as `A` accepts it.
    pub fn wrap_argument<A: ArgumentType>(&mut self, inner: &Arc<Type>) -> SchemaResult<Arc<Type>> {
        self.wrap_modifiers(&A::modifiers(), inner)
    }

    pub fn set_query_type(&mut self, ty: &Arc<Type>) -> SchemaResult<()> {
        self.query_type = Some(self.root_type(ty, "query")?);
        Ok(())
    }

    pub fn set_mutation_type(&mut self, ty: &Arc<Type>) -> SchemaResult<()> {
        self.mutation_type = Some(self.root_type(ty, "mutation")?);
        Ok(())
    }

    pub fn set_subscription_type(&mut self, ty: &Arc<Type>) -> SchemaResult<()> {
        self.subscription_type = Some(self.root_type(ty, "subscription")?);
        Ok(())
    }

    fn root_type(&self, ty: &Arc<Type>, operation: &str) -> SchemaResult<Arc<Type>> {
        if ty.kind() != TypeKind::Object {
            return Err(SchemaError::new(format!("The {operation} type must be an object type: {ty}")));
        }
        let registered = self.lookup_type(ty.name().unwrap_or_default())?;
        if !Arc::ptr_eq(&registered, ty) {
            return Err(SchemaError::new(format!("The {operation} type {ty} is not the registered type")));
        }
        Ok(registered)
    }

    pub fn add_directive(&mut self, directive: Arc<Directive>) -> SchemaResult<()> {
        if self.directives.iter().any(|existing| existing.name() == directive.name()) {
            return Err(SchemaError::new(format!("Duplicate directive name: {}", directive.name())));
        }
        self.directives.push(directive);
        Ok(())
    }

    /// Freezes the graph.
    pub fn build(self) -> Arc<Schema> {
        debug!(
            types = self.types.len(),
            directives = self.directives.len(),
            "schema built"
        );

        Arc::new_cyclic(|this| Schema {
            types: self.types,
            wrappers: self
                .list_types
                .into_values()
                .chain(self.non_null_types.into_values())
                .collect(),
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            subscription_type: self.subscription_type,
            directives: self.directives,
            object: schema_object(this),
        })
    }
}

/// An immutable schema graph, itself the `__Schema` object.
pub struct Schema {
    types: IndexMap<String, Arc<Type>>,
    /// Keeps the shared wrapper types alive; fields only refer to them weakly.
    wrappers: Vec<Arc<Type>>,
    query_type: Option<Arc<Type>>,
    mutation_type: Option<Arc<Type>>,
    subscription_type: Option<Arc<Type>>,
    directives: Vec<Arc<Directive>>,
    object: Object,
}

impl Schema {
    /// Returns the named types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<Type>> {
        self.types.values()
    }

    pub fn find_type(&self, name: &str) -> Option<Arc<Type>> {
        self.types.get(name).cloned()
    }

    pub fn lookup_type(&self, name: &str) -> SchemaResult<Arc<Type>> {
        self.find_type(name)
            .ok_or_else(|| SchemaError::new(format!("Unknown type name: {name}")))
    }

    pub fn query_type(&self) -> Option<&Arc<Type>> {
        self.query_type.as_ref()
    }

    pub fn mutation_type(&self) -> Option<&Arc<Type>> {
        self.mutation_type.as_ref()
    }

    pub fn subscription_type(&self) -> Option<&Arc<Type>> {
        self.subscription_type.as_ref()
    }

    pub fn directives(&self) -> &[Arc<Directive>] {
        &self.directives
    }

    /// Number of distinct wrapper types in the graph.
    pub fn wrapper_count(&self) -> usize {
        self.wrappers.len()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("query_type", &self.query_type.as_ref().map(ToString::to_string))
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}

impl AsObject for Schema {
    fn object(&self) -> &Object {
        &self.object
    }
}

#[async_trait]
impl SchemaFields for Schema {
    async fn get_types(&self, _params: FieldParams) -> SchemaResult<Vec<Arc<dyn TypeFields>>> {
        Ok(self
            .types
            .values()
            .map(|ty| Arc::clone(ty) as Arc<dyn TypeFields>)
            .collect())
    }

    async fn get_query_type(&self, _params: FieldParams) -> SchemaResult<Arc<dyn TypeFields>> {
        self.query_type
            .as_ref()
            .map(|ty| Arc::clone(ty) as Arc<dyn TypeFields>)
            .ok_or_else(|| SchemaError::new("The schema has no query type"))
    }

    async fn get_mutation_type(&self, _params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>> {
        Ok(self
            .mutation_type
            .as_ref()
            .map(|ty| Arc::clone(ty) as Arc<dyn TypeFields>))
    }

    async fn get_subscription_type(&self, _params: FieldParams) -> SchemaResult<Option<Arc<dyn TypeFields>>> {
        Ok(self
            .subscription_type
            .as_ref()
            .map(|ty| Arc::clone(ty) as Arc<dyn TypeFields>))
    }

    async fn get_directives(&self, _params: FieldParams) -> SchemaResult<Vec<Arc<dyn DirectiveFields>>> {
        Ok(self
            .directives
            .iter()
            .map(|directive| Arc::clone(directive) as Arc<dyn DirectiveFields>)
            .collect())
    }
}

/// Installs `__schema` and `__type(name: String!)` on a query root's
/// resolvers, unless introspection is disabled.
pub fn add_introspection_fields(resolvers: &mut ResolverMap, schema: &Arc<Schema>, config: &ServiceConfig) {
    if !config.introspection {
        debug!("introspection disabled");
        return;
    }

    let this = Arc::clone(schema);
    resolvers.insert(
        "__schema".to_string(),
        Arc::new(move |params: ResolverParams| {
            let schema = Arc::clone(&this);
            convert(future::ready(Ok(schema)), params)
        }),
    );

    let this = Arc::clone(schema);
    resolvers.insert(
        "__type".to_string(),
        Arc::new(move |params: ResolverParams| {
            let name = match require::<String>("name", &params.arguments) {
                Ok(name) => name,
                Err(err) => return Box::pin(future::ready(Err(err))) as ResolverFuture,
            };
            convert(future::ready(Ok(this.find_type(&name))), params)
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::members::Field;
    use gqlcore_service::{FieldSelection, Object, SelectionSet, SelectionSetParams};

    fn scalar(name: &str) -> Arc<Type> {
        Type::named(TypeKind::Scalar, name, None).unwrap()
    }

    #[test]
    fn test_wrap_returns_shared_instance() {
        let mut builder = SchemaBuilder::new();
        let int = scalar("Int");
        builder.add_type(Arc::clone(&int)).unwrap();

        let first = builder.wrap_type(TypeKind::NonNull, &int).unwrap();
        let second = builder.wrap_type(TypeKind::NonNull, &int).unwrap();
        let list = builder.wrap_type(TypeKind::List, &int).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &list));
        assert_eq!(first.to_string(), "Int!");
    }

    #[test]
    fn test_wrap_rejects_named_kinds() {
        let mut builder = SchemaBuilder::new();
        let int = scalar("Int");

        let err = builder.wrap_type(TypeKind::Object, &int).unwrap_err();
        assert_eq!(err.messages(), ["OBJECT is not a wrapper kind"]);

        let non_null = builder.wrap_type(TypeKind::NonNull, &int).unwrap();
        assert!(builder.wrap_type(TypeKind::NonNull, &non_null).is_err());
    }

    #[test]
    fn test_wrap_modifiers() {
        let mut builder = SchemaBuilder::new();
        let int = scalar("Int");

        let cases: [(&[TypeModifier], &str); 6] = [
            (&[], "Int!"),
            (&[TypeModifier::Nullable], "Int"),
            (&[TypeModifier::List], "[Int!]!"),
            (&[TypeModifier::Nullable, TypeModifier::List], "[Int!]"),
            (&[TypeModifier::List, TypeModifier::Nullable], "[Int]!"),
            (&[TypeModifier::List, TypeModifier::List], "[[Int!]!]!"),
        ];
        for (modifiers, expected) in cases {
            assert_eq!(builder.wrap_modifiers(modifiers, &int).unwrap().to_string(), expected);
        }

        let first = builder.wrap_result::<Option<Vec<i32>>>(&int).unwrap();
        let second = builder.wrap_modifiers(&[TypeModifier::Nullable, TypeModifier::List], &int).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lookup_fails_loudly() {
        let builder = SchemaBuilder::new();
        let err = builder.lookup_type("Missing").unwrap_err();
        assert_eq!(err.messages(), ["Unknown type name: Missing"]);
    }

    #[test]
    fn test_duplicate_names() {
        let mut builder = SchemaBuilder::new();
        builder.add_type(scalar("Int")).unwrap();

        assert!(builder.add_type(scalar("Int")).is_err());
        let wrapper = builder.wrap_type(TypeKind::List, &scalar("Float")).unwrap();
        assert!(builder.add_type(wrapper).is_err());
    }

    #[test]
    fn test_root_type_must_be_registered_object() {
        let mut builder = SchemaBuilder::new();
        let int = scalar("Int");
        builder.add_type(Arc::clone(&int)).unwrap();
        let query = Type::named(TypeKind::Object, "Query", None).unwrap();

        assert!(builder.set_query_type(&int).is_err());
        assert!(builder.set_query_type(&query).is_err());

        builder.add_type(Arc::clone(&query)).unwrap();
        builder.set_query_type(&query).unwrap();
    }

    #[test]
    fn test_schema_keeps_wrappers_alive() {
        let mut builder = SchemaBuilder::new();
        let int = scalar("Int");
        builder.add_type(Arc::clone(&int)).unwrap();
        let list = builder.wrap_modifiers(&[TypeModifier::List], &int).unwrap();
        let field = Field::builder("numbers", &list).build();
        drop(list);

        let schema = builder.build();

        assert_eq!(schema.wrapper_count(), 3);
        assert_eq!(field.field_type().map(|t| t.to_string()), Some("[Int!]!".to_string()));
    }

    #[tokio::test]
    async fn test_missing_query_type_is_an_error() {
        let schema = SchemaBuilder::new().build();
        let selection: SelectionSet =
            vec![FieldSelection::new("queryType").with_selection([FieldSelection::new("name")]).into()];

        let err = schema
            .object()
            .resolve(&SelectionSetParams::default(), &selection)
            .await
            .unwrap_err();

        assert_eq!(err.messages(), ["The schema has no query type"]);
    }

    #[test]
    fn test_introspection_can_be_disabled() {
        let schema = SchemaBuilder::new().build();

        let mut resolvers = ResolverMap::new();
        add_introspection_fields(&mut resolvers, &schema, &ServiceConfig::new().disable_introspection());
        assert!(resolvers.is_empty());

        add_introspection_fields(&mut resolvers, &schema, &ServiceConfig::new());
        let query = Object::new("Query", resolvers);
        assert!(query.resolver("__schema").is_some());
        assert!(query.resolver("__type").is_some());
    }
}
