//! Typed result conversion.
//!
//! The mirror image of [`crate::argument`]: a typed value produced by a
//! collaborator is turned into a future of a dynamic value. `Option<T>` maps
//! `None` to null, `Vec<T>` converts every element and reassembles the list
//! in index order, and terminal types convert themselves.

use crate::argument::TypeModifier;
use crate::config::ListResolution;
use crate::error::{SchemaError, SchemaResult};
use crate::object::{AsObject, ResolverFuture};
use crate::params::ResolverParams;
use futures_util::future::{self, try_join_all};
use gqlcore_response::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A typed value a resolver can return.
pub trait ResultType: Send + 'static {
    /// Converts the value for the field described by `params`.
    fn convert(self, params: ResolverParams) -> ResolverFuture;

    /// The modifier stack, outermost first.
    fn modifiers() -> Vec<TypeModifier> {
        Vec::new()
    }
}

impl<T: ResultType> ResultType for Option<T> {
    fn convert(self, params: ResolverParams) -> ResolverFuture {
        match self {
            Some(value) => value.convert(params),
            None => Box::pin(future::ready(Ok(Value::Null))),
        }
    }

    fn modifiers() -> Vec<TypeModifier> {
        let mut modifiers = vec![TypeModifier::Nullable];
        modifiers.extend(T::modifiers());
        modifiers
    }
}

impl<T: ResultType> ResultType for Vec<T> {
    fn convert(self, params: ResolverParams) -> ResolverFuture {
        let resolution = params.config().list_resolution;
        let elements: Vec<ResolverFuture> = self
            .into_iter()
            .map(|element| element.convert(params.clone()))
            .collect();

        Box::pin(async move {
            let values = match resolution {
                ListResolution::Concurrent => try_join_all(elements).await?,
                ListResolution::Sequential => {
                    let mut values = Vec::with_capacity(elements.len());
                    for element in elements {
                        values.push(element.await?);
                    }
                    values
                }
            };
            Ok(Value::List(values))
        })
    }

    fn modifiers() -> Vec<TypeModifier> {
        let mut modifiers = vec![TypeModifier::List];
        modifiers.extend(T::modifiers());
        modifiers
    }
}

macro_rules! impl_scalar_result {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ResultType for $ty {
                fn convert(self, _params: ResolverParams) -> ResolverFuture {
                    Box::pin(future::ready(Ok(Value::from(self))))
                }
            }
        )*
    };
}

impl_scalar_result!(bool, i32, f64, String, Value);

/// Objects resolve the field's sub-selection.
impl<T> ResultType for Arc<T>
where
    T: ?Sized + AsObject + Send + Sync + 'static,
{
    fn convert(self, params: ResolverParams) -> ResolverFuture {
        let Some(selection) = params.selection.as_ref() else {
            return Box::pin(future::ready(Err(SchemaError::new(format!(
                "Missing selection set for field: {}",
                params.field_name
            )))));
        };

        let fields = self
            .object()
            .resolve(&params.selection_set_params.nested(), selection);

        // Resolvers may only hold a weak handle to their owner.
        Box::pin(async move {
            let _owner = self;
            fields.await
        })
    }
}

/// Converts an enum ordinal to its name in `names`.
pub fn enum_result(ordinal: usize, names: &[&str], type_name: &str) -> SchemaResult<Value> {
    names
        .get(ordinal)
        .map(|name| Value::enum_value(*name))
        .ok_or_else(|| SchemaError::new(format!("not a valid {type_name} value")))
}

/// Awaits a collaborator's typed result and converts it.
///
/// Errors from the collaborator or the conversion propagate unchanged.
pub fn convert<T, F>(result: F, params: ResolverParams) -> ResolverFuture
where
    T: ResultType,
    F: Future<Output = SchemaResult<T>> + Send + 'static,
{
    Box::pin(async move {
        let field_name = params.field_name.clone();
        let converted = match result.await {
            Ok(value) => value.convert(params).await,
            Err(err) => Err(err),
        };

        if let Err(err) = &converted {
            debug!(field = %field_name, error = %err, "field resolution failed");
        }
        converted
    })
}
