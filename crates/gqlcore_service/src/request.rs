//! Operation roots and subscription delivery.
//!
//! A [`Request`] owns the root objects of a service. Queries and mutations
//! resolve against their root right away. Subscriptions are registered with
//! [`Request::subscribe`] and resolved later, once per event, when the
//! application calls [`Request::deliver`] for one of the subscribed fields.

use crate::error::{SchemaError, SchemaResult};
use crate::object::{should_include, AsObject, ResolverFuture};
use crate::params::SelectionSetParams;
use crate::selection::{FragmentMap, Selection, SelectionSet};
use futures_util::future;
use gqlcore_response::{MapType, Value};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A root object, kept alive while its selection set resolves.
pub type OperationRoot = Arc<dyn AsObject + Send + Sync>;

/// Identifies a registered subscription.
pub type SubscriptionKey = usize;

/// Arguments of one subscribed field occurrence.
pub type SubscriptionArguments = MapType;

/// Receives the future of each delivered event.
pub type SubscriptionCallback = Box<dyn Fn(ResolverFuture) + Send + Sync>;

/// The kind of operation being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a subscription operation resolves with on every delivery.
#[derive(Debug, Clone)]
pub struct SubscriptionParams {
    /// Request state, operation directives, fragments and configuration.
    pub selection_set_params: SelectionSetParams,

    /// The top-level selection of the subscription operation.
    pub selection: Arc<SelectionSet>,
}

impl SubscriptionParams {
    pub fn new(selection_set_params: SelectionSetParams, selection: SelectionSet) -> Self {
        Self {
            selection_set_params,
            selection: Arc::new(selection),
        }
    }
}

/// Chooses which listeners of a field receive an event.
#[derive(Clone, Copy)]
pub enum SubscriptionFilter<'a> {
    /// Every listener.
    All,

    /// Listeners whose field arguments contain all of these entries.
    Arguments(&'a SubscriptionArguments),

    /// Listeners whose every field argument passes the callback.
    Callback(&'a dyn Fn(&str, &Value) -> bool),
}

impl SubscriptionFilter<'_> {
    fn matches(&self, occurrences: &[SubscriptionArguments]) -> bool {
        match self {
            Self::All => true,
            Self::Arguments(required) => occurrences.iter().any(|arguments| {
                required
                    .iter()
                    .all(|(name, value)| arguments.get(name) == Some(value))
            }),
            Self::Callback(accept) => occurrences
                .iter()
                .any(|arguments| arguments.iter().all(|(name, value)| accept(name.as_str(), value))),
        }
    }
}

struct Subscription {
    params: SubscriptionParams,
    /// Arguments of every occurrence of each top-level field.
    fields: FxHashMap<String, Vec<SubscriptionArguments>>,
    callback: SubscriptionCallback,
}

/// The operation roots of a service and its live subscriptions.
///
/// Registration needs `&mut self`; wrap the request in a lock to share it
/// between the tasks that subscribe and the ones that deliver.
pub struct Request {
    query: OperationRoot,
    mutation: Option<OperationRoot>,
    subscription: Option<OperationRoot>,
    subscriptions: BTreeMap<SubscriptionKey, Subscription>,
    listeners: FxHashMap<String, BTreeSet<SubscriptionKey>>,
    next_key: SubscriptionKey,
}

impl Request {
    /// Creates a request with only a query root.
    pub fn new(query: OperationRoot) -> Self {
        Self {
            query,
            mutation: None,
            subscription: None,
            subscriptions: BTreeMap::new(),
            listeners: FxHashMap::default(),
            next_key: 0,
        }
    }

    /// Sets the mutation root.
    #[must_use]
    pub fn with_mutation(mut self, mutation: OperationRoot) -> Self {
        self.mutation = Some(mutation);
        self
    }

    /// Sets the subscription root.
    #[must_use]
    pub fn with_subscription(mut self, subscription: OperationRoot) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Returns the root object for an operation type, if the service has one.
    pub fn root(&self, operation: OperationType) -> Option<&OperationRoot> {
        match operation {
            OperationType::Query => Some(&self.query),
            OperationType::Mutation => self.mutation.as_ref(),
            OperationType::Subscription => self.subscription.as_ref(),
        }
    }

    /// Resolves a query or mutation selection set against its root.
    pub fn resolve(
        &self,
        operation: OperationType,
        params: &SelectionSetParams,
        selection: &SelectionSet,
    ) -> ResolverFuture {
        if operation == OperationType::Subscription {
            return Box::pin(future::ready(Err(SchemaError::new(
                "Subscription operations are resolved on delivery",
            ))));
        }
        let Some(root) = self.root(operation) else {
            return Box::pin(future::ready(Err(SchemaError::new(format!(
                "Unknown operation type: {operation}"
            )))));
        };

        debug!(%operation, "resolving operation");
        resolve_owned(Arc::clone(root), params, selection)
    }

    /// Registers a subscription and returns its key.
    ///
    /// The subscription listens to every top-level field it selects, with
    /// the arguments given to each occurrence.
    pub fn subscribe<F>(&mut self, params: SubscriptionParams, callback: F) -> SchemaResult<SubscriptionKey>
    where
        F: Fn(ResolverFuture) + Send + Sync + 'static,
    {
        let mut fields = FxHashMap::default();
        collect_subscription_fields(&params.selection_set_params.fragments, &params.selection, &mut fields)?;
        if fields.is_empty() {
            return Err(SchemaError::new("Missing subscription field"));
        }

        let key = self.next_key;
        self.next_key += 1;

        for name in fields.keys() {
            self.listeners.entry(name.clone()).or_default().insert(key);
        }
        debug!(key, fields = fields.len(), "subscription registered");

        self.subscriptions.insert(
            key,
            Subscription {
                params,
                fields,
                callback: Box::new(callback),
            },
        );
        Ok(key)
    }

    /// Removes a subscription. Returns false if the key is not registered.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        let Some(subscription) = self.subscriptions.remove(&key) else {
            return false;
        };

        for name in subscription.fields.keys() {
            if let Some(keys) = self.listeners.get_mut(name) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.listeners.remove(name);
                }
            }
        }
        debug!(key, "subscription removed");
        true
    }

    /// Returns the number of registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Delivers an event for the subscribed field `name`.
    ///
    /// Every matching subscription resolves its stored selection set against
    /// `object`, or the subscription root when `object` is `None`, and hands
    /// the resulting future to its callback. Subscriptions are visited in key
    /// order. Returns how many callbacks were invoked.
    pub fn deliver(
        &self,
        name: &str,
        filter: SubscriptionFilter<'_>,
        object: Option<OperationRoot>,
    ) -> SchemaResult<usize> {
        let object = match object {
            Some(object) => object,
            None => self
                .subscription
                .clone()
                .ok_or_else(|| SchemaError::new("Unknown operation type: subscription"))?,
        };

        let Some(keys) = self.listeners.get(name) else {
            return Ok(0);
        };

        let mut delivered = 0;
        for key in keys {
            let Some(subscription) = self.subscriptions.get(key) else {
                continue;
            };
            let occurrences = subscription.fields.get(name).map_or(&[][..], Vec::as_slice);
            if !filter.matches(occurrences) {
                continue;
            }

            trace!(key, field = %name, "delivering event");
            let future = resolve_owned(
                Arc::clone(&object),
                &subscription.params.selection_set_params,
                &subscription.params.selection,
            );
            (subscription.callback)(future);
            delivered += 1;
        }

        debug!(field = %name, delivered, "event delivered");
        Ok(delivered)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut listening: Vec<_> = self.listeners.keys().collect();
        listening.sort_unstable();
        f.debug_struct("Request")
            .field("query", &self.query.object().type_name())
            .field("mutation", &self.mutation.as_ref().map(|root| root.object().type_name()))
            .field(
                "subscription",
                &self.subscription.as_ref().map(|root| root.object().type_name()),
            )
            .field("subscriptions", &self.subscriptions.len())
            .field("listening", &listening)
            .finish()
    }
}

fn resolve_owned(root: OperationRoot, params: &SelectionSetParams, selection: &SelectionSet) -> ResolverFuture {
    let fields = root.object().resolve(params, selection);
    Box::pin(async move {
        let _root = root;
        fields.await
    })
}

fn collect_subscription_fields(
    fragments: &FragmentMap,
    selection: &SelectionSet,
    fields: &mut FxHashMap<String, Vec<SubscriptionArguments>>,
) -> SchemaResult<()> {
    for item in selection {
        match item {
            Selection::Field(field) => {
                if should_include(&field.directives)? {
                    fields
                        .entry(field.name.clone())
                        .or_default()
                        .push(field.arguments.clone());
                }
            }
            Selection::InlineFragment(inline) => {
                if should_include(&inline.directives)? {
                    collect_subscription_fields(fragments, &inline.selection_set, fields)?;
                }
            }
            Selection::FragmentSpread(spread) => {
                if should_include(&spread.directives)? {
                    let fragment = fragments.get(&spread.name).ok_or_else(|| {
                        SchemaError::new(format!("Unknown fragment name: {}", spread.name))
                    })?;
                    collect_subscription_fields(fragments, &fragment.selection_set, fields)?;
                }
            }
        }
    }
    Ok(())
}
