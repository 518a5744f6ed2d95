//! The object dispatcher.
//!
//! An [`Object`] is a stateless table from field name to resolver for one
//! schema type. The same instance serves every request; per-request data
//! arrives through [`ResolverParams`].

use crate::argument::require;
use crate::error::{SchemaError, SchemaResult};
use crate::params::{ResolverParams, SelectionSetParams};
use crate::selection::{FieldSelection, Selection, SelectionSet};
use futures_util::future::{self, try_join_all};
use gqlcore_response::{MapType, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, trace};

/// Future produced by a field resolver.
pub type ResolverFuture = Pin<Box<dyn Future<Output = SchemaResult<Value>> + Send + 'static>>;

/// A field resolver.
pub type Resolver = Arc<dyn Fn(ResolverParams) -> ResolverFuture + Send + Sync>;

/// Resolvers by field name.
pub type ResolverMap = HashMap<String, Resolver>;

/// Called around the resolution of each selection set of an [`Object`].
pub type SelectionSetHook = Arc<dyn Fn(&SelectionSetParams) + Send + Sync>;

/// Wraps an async closure as a [`Resolver`].
///
/// # Example
///
/// ```
/// use gqlcore_response::Value;
/// use gqlcore_service::{resolver_fn, ResolverMap};
///
/// let mut resolvers = ResolverMap::new();
/// resolvers.insert(
///     "hello".to_string(),
///     resolver_fn(|_params| async { Ok(Value::from("world")) }),
/// );
/// ```
pub fn resolver_fn<F, Fut>(f: F) -> Resolver
where
    F: Fn(ResolverParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SchemaResult<Value>> + Send + 'static,
{
    Arc::new(move |params| Box::pin(f(params)) as ResolverFuture)
}

/// Field-name to resolver dispatch for one schema type.
pub struct Object {
    /// The own type name first, then interfaces and unions it belongs to.
    type_names: Vec<String>,
    resolvers: ResolverMap,
    begin_selection_set: Option<SelectionSetHook>,
    end_selection_set: Option<SelectionSetHook>,
}

impl Object {
    /// Creates an object for the type `type_name`.
    ///
    /// A `__typename` resolver returning `type_name` is always installed,
    /// replacing any declared one.
    pub fn new(type_name: impl Into<String>, mut resolvers: ResolverMap) -> Self {
        let type_name = type_name.into();

        let typename = type_name.clone();
        resolvers.insert(
            "__typename".to_string(),
            resolver_fn(move |_params| future::ready(Ok(Value::from(typename.as_str())))),
        );

        Self {
            type_names: vec![type_name],
            resolvers,
            begin_selection_set: None,
            end_selection_set: None,
        }
    }

    /// Adds the names of interfaces and unions this object matches in
    /// fragment type conditions.
    #[must_use]
    pub fn with_type_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Installs hooks run once per selection set resolved on this object.
    ///
    /// `begin` runs before any field is dispatched. `end` runs once every
    /// field has been dispatched and before any of them is awaited, so
    /// resolvers can queue work in the request state for `end` to flush.
    #[must_use]
    pub fn with_selection_set_hooks<B, E>(mut self, begin: B, end: E) -> Self
    where
        B: Fn(&SelectionSetParams) + Send + Sync + 'static,
        E: Fn(&SelectionSetParams) + Send + Sync + 'static,
    {
        self.begin_selection_set = Some(Arc::new(begin));
        self.end_selection_set = Some(Arc::new(end));
        self
    }

    /// Returns the introspection type name.
    pub fn type_name(&self) -> &str {
        &self.type_names[0]
    }

    /// Returns true if a fragment conditioned on `name` applies to this object.
    pub fn matches_type(&self, name: &str) -> bool {
        self.type_names.iter().any(|type_name| type_name == name)
    }

    /// Looks up the resolver for a field.
    pub fn resolver(&self, field_name: &str) -> Option<&Resolver> {
        self.resolvers.get(field_name)
    }

    /// Returns the declared field names, `__typename` included.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    /// Invokes the resolver for `field_name`, or returns `None` if there is
    /// no such field.
    pub fn resolve_field(&self, field_name: &str, params: ResolverParams) -> Option<ResolverFuture> {
        self.resolver(field_name).map(|resolver| resolver(params))
    }

    /// Resolves a selection set against this object.
    ///
    /// Every field is dispatched before anything is awaited, then all field
    /// futures run concurrently. The result map follows selection order no
    /// matter which field completes first. Any field error fails the whole
    /// selection set.
    pub fn resolve(&self, params: &SelectionSetParams, selection: &SelectionSet) -> ResolverFuture {
        if let Some(begin) = &self.begin_selection_set {
            begin(params);
        }

        let mut fields = Vec::with_capacity(selection.len());
        let collected = self.collect_fields(params, selection, &mut fields);

        if let Some(end) = &self.end_selection_set {
            end(params);
        }

        if let Err(err) = collected {
            debug!(type_name = %self.type_name(), error = %err, "selection set rejected");
            return Box::pin(future::ready(Err(err)));
        }

        debug!(type_name = %self.type_name(), fields = fields.len(), "resolving selection set");

        let (keys, futures): (Vec<String>, Vec<ResolverFuture>) = fields.into_iter().unzip();
        Box::pin(async move {
            let values = try_join_all(futures).await?;
            Ok(Value::Map(keys.into_iter().zip(values).collect()))
        })
    }

    fn collect_fields(
        &self,
        params: &SelectionSetParams,
        selection: &SelectionSet,
        fields: &mut Vec<(String, ResolverFuture)>,
    ) -> SchemaResult<()> {
        for item in selection {
            match item {
                Selection::Field(field) => {
                    if !should_include(&field.directives)? {
                        continue;
                    }
                    let key = field.response_key();
                    // First occurrence of a response key wins.
                    if fields.iter().any(|(existing, _)| existing == key) {
                        continue;
                    }
                    let future = self.dispatch(params, field)?;
                    fields.push((key.to_string(), future));
                }
                Selection::InlineFragment(inline) => {
                    if !should_include(&inline.directives)? {
                        continue;
                    }
                    if let Some(condition) = &inline.type_condition {
                        if !self.matches_type(condition) {
                            continue;
                        }
                    }

                    let mut fragment_params = params.clone();
                    fragment_params.inline_fragment_directives =
                        Arc::new(Value::Map(inline.directives.clone()));
                    self.collect_fields(&fragment_params, &inline.selection_set, fields)?;
                }
                Selection::FragmentSpread(spread) => {
                    if !should_include(&spread.directives)? {
                        continue;
                    }
                    let fragment = params.fragments.get(&spread.name).ok_or_else(|| {
                        SchemaError::new(format!("Unknown fragment name: {}", spread.name))
                    })?;
                    if !self.matches_type(&fragment.type_condition) {
                        continue;
                    }

                    let mut fragment_params = params.clone();
                    fragment_params.fragment_definition_directives =
                        Arc::new(Value::Map(fragment.directives.clone()));
                    fragment_params.fragment_spread_directives =
                        Arc::new(Value::Map(spread.directives.clone()));
                    self.collect_fields(&fragment_params, &fragment.selection_set, fields)?;
                }
            }
        }

        Ok(())
    }

    fn dispatch(&self, params: &SelectionSetParams, field: &FieldSelection) -> SchemaResult<ResolverFuture> {
        trace!(type_name = %self.type_name(), field = %field.name, "dispatching field");

        let mut resolver_params = ResolverParams::new(params.clone(), field.name.as_str())
            .with_arguments(Value::Map(field.arguments.clone()))
            .with_field_directives(Value::Map(field.directives.clone()));
        if let Some(selection) = &field.selection_set {
            resolver_params = resolver_params.with_selection(Arc::clone(selection));
        }

        self.resolve_field(&field.name, resolver_params)
            .ok_or_else(|| SchemaError::new(format!("Unknown field name: {}", field.name)))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.field_names().collect();
        fields.sort_unstable();
        f.debug_struct("Object")
            .field("type_names", &self.type_names)
            .field("fields", &fields)
            .field("selection_set_hooks", &self.begin_selection_set.is_some())
            .finish()
    }
}

/// Evaluates `@skip(if:)` and `@include(if:)`.
pub(crate) fn should_include(directives: &MapType) -> SchemaResult<bool> {
    if let Some(arguments) = directives.get("skip") {
        if require::<bool>("if", arguments)? {
            return Ok(false);
        }
    }
    if let Some(arguments) = directives.get("include") {
        if !require::<bool>("if", arguments)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Anything that dispatches through an [`Object`].
pub trait AsObject {
    fn object(&self) -> &Object;
}

impl AsObject for Object {
    fn object(&self) -> &Object {
        self
    }
}
