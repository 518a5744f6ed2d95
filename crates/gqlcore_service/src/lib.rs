//! # gqlcore_service
//!
//! The execution core of gqlcore: resolver dispatch and typed conversion.
//!
//! - [`Object`]: field-name to resolver dispatch for one schema type,
//!   including selection-set resolution with `@skip` / `@include` and
//!   fragments
//! - [`ArgumentType`], [`require`], [`find`]: dynamic arguments to typed
//!   values
//! - [`ResultType`], [`convert`]: typed values back to dynamic values
//! - [`SelectionSetParams`], [`FieldParams`], [`ResolverParams`]: the
//!   per-field resolution context
//! - [`IdType`]: the `ID` scalar, Base64 on the wire
//! - [`Request`]: operation roots and subscription delivery
//! - [`SchemaError`]: the single error kind of the core
//!
//! Parsing, validation and wire serialization are left to the caller, which
//! hands over a parsed [`SelectionSet`] and consumes the resulting
//! [`gqlcore_response::Value`].

pub mod argument;
pub mod config;
pub mod error;
pub mod id;
pub mod object;
pub mod params;
pub mod request;
pub mod result;
pub mod selection;
pub mod state;

pub use argument::{convert_enum, find, require, ArgumentType, TypeModifier};
pub use config::{ListResolution, ServiceConfig};
pub use error::{SchemaError, SchemaResult};
pub use id::IdType;
pub use object::{resolver_fn, AsObject, Object, Resolver, ResolverFuture, ResolverMap, SelectionSetHook};
pub use params::{FieldParams, ResolverParams, SelectionSetParams};
pub use request::{
    OperationRoot, OperationType, Request, SubscriptionArguments, SubscriptionCallback, SubscriptionFilter,
    SubscriptionKey, SubscriptionParams,
};
pub use result::{convert, enum_result, ResultType};
pub use selection::{
    FieldSelection, Fragment, FragmentMap, FragmentSpread, InlineFragment, Selection, SelectionSet,
};
pub use state::{RequestState, SharedState};
