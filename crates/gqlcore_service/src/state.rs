//! Request-scoped state shared by every field resolution of one request.
//!
//! Uses `TypeId` keys so each resolver retrieves its own data by type rather
//! than by string name.

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A type-keyed store of per-request values.
///
/// The core passes it through untouched; resolvers use it to correlate work
/// across the asynchronous resolution of one request (batching, caching).
///
/// Values added with [`insert`](Self::insert) are fixed once the state is
/// shared. Slots from [`slot`](Self::slot) can still be created afterwards and
/// carry their own interior mutability, such as a `Mutex` or an atomic.
///
/// # Example
///
/// ```
/// use gqlcore_service::state::RequestState;
///
/// #[derive(Clone)]
/// struct RequestId(u64);
///
/// let mut state = RequestState::new();
/// state.insert(RequestId(7));
///
/// assert_eq!(state.get::<RequestId>().map(|id| id.0), Some(7));
/// ```
#[derive(Default)]
pub struct RequestState {
    data: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    slots: Mutex<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl RequestState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing and returning any previous value of the
    /// same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.data
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Gets a value by type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.data
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Removes a value by type.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.data
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Returns true if a value of the given type is present.
    pub fn contains<T: 'static>(&self) -> bool {
        self.data.contains_key(&TypeId::of::<T>())
    }

    /// Returns the shared slot of type `T`, creating a default one on first use.
    pub fn slot<T: Default + Send + Sync + 'static>(&self) -> Arc<T> {
        self.slot_with(T::default)
    }

    /// Returns the shared slot of type `T`, creating it with `init` on first
    /// use. Every caller of one request gets the same instance.
    pub fn slot_with<T, F>(&self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| Arc::clone(slot).downcast::<T>().ok())
        {
            return slot;
        }

        let slot = Arc::new(init());
        slots.insert(TypeId::of::<T>(), Arc::clone(&slot) as Arc<dyn Any + Send + Sync>);
        slot
    }

    /// Freezes the typed values for sharing across resolvers.
    pub fn into_shared(self) -> SharedState {
        Arc::new(self)
    }
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot_count = self
            .slots
            .lock()
            .map_or(0, |slots| slots.len());
        f.debug_struct("RequestState")
            .field("data_count", &self.data.len())
            .field("slot_count", &slot_count)
            .finish()
    }
}

/// Request state as held by resolution parameters.
pub type SharedState = Arc<RequestState>;
