//! Type-indexed, synchronous event bus.
//!
//! Handlers are registered per concrete event type and keyed by its
//! [`TypeId`], so dispatch is a single map lookup and only exact type
//! matches are delivered.
//!
//! ## Delivery guarantees
//!
//! - `publish` runs every handler registered for the type, in registration
//!   order, on the caller's thread, before returning.
//! - The handler list is snapshotted under the read lock and the lock is
//!   released before any handler runs. Handlers may publish, subscribe or
//!   unsubscribe (themselves included) without deadlocking.
//! - A handler subscribed during delivery first sees the next event. A
//!   handler unsubscribed during delivery is not called again, even if it
//!   was in the snapshot.
//! - A handler returning `Err` or panicking is logged and skipped; the
//!   remaining handlers still run and `publish` itself never fails.

use std::any::{Any, TypeId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Result;

/// Marker for types that can travel over the bus.
pub trait Event: Any + Send + Sync {}

impl<T: Any + Send + Sync> Event for T {}

/// Opaque handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type ErasedHandler = Arc<dyn Fn(&dyn Any) -> Result<()> + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    handler: ErasedHandler,
}

#[derive(Default)]
struct Registry {
    /// Handlers per event type, in registration order.
    by_type: FxHashMap<TypeId, Vec<Registration>>,

    /// Reverse index for unsubscribe.
    types: FxHashMap<SubscriptionId, (TypeId, &'static str)>,
}

/// Event bus shared by every subsystem of one game.
///
/// ## Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use rust_terraform::events::EventBus;
///
/// struct Ping(u32);
///
/// let bus = EventBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
///
/// let id = bus.subscribe(move |event: &Ping| {
///     counter.fetch_add(event.0 as usize, Ordering::SeqCst);
///     Ok(())
/// });
///
/// bus.publish(Ping(3));
/// assert!(bus.unsubscribe(id));
/// bus.publish(Ping(3));
///
/// assert_eq!(seen.load(Ordering::SeqCst), 3);
/// ```
pub struct EventBus {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for events of exactly type `T`.
    pub fn subscribe<T, F>(&self, handler: F) -> SubscriptionId
    where
        T: Event,
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let type_name = std::any::type_name::<T>();

        let handler: ErasedHandler = Arc::new(move |event: &dyn Any| match event.downcast_ref::<T>() {
            Some(event) => handler(event),
            None => Ok(()),
        });

        let mut registry = self.registry.write();
        registry
            .by_type
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Registration { id, handler });
        registry.types.insert(id, (TypeId::of::<T>(), type_name));
        drop(registry);

        tracing::debug!(subscription_id = %id, event_type = type_name, "event handler subscribed");
        id
    }

    /// Deliver an event to every handler registered for `T`.
    ///
    /// Returns the number of handlers that completed successfully.
    pub fn publish<T: Event>(&self, event: T) -> usize {
        let type_name = std::any::type_name::<T>();

        let handlers: SmallVec<[(SubscriptionId, ErasedHandler); 4]> = {
            let registry = self.registry.read();
            match registry.by_type.get(&TypeId::of::<T>()) {
                Some(registrations) => registrations
                    .iter()
                    .map(|r| (r.id, Arc::clone(&r.handler)))
                    .collect(),
                None => SmallVec::new(),
            }
        };

        if handlers.is_empty() {
            tracing::trace!(event_type = type_name, "no subscribers for event");
            return 0;
        }

        tracing::debug!(
            event_type = type_name,
            subscriber_count = handlers.len(),
            "publishing event"
        );

        let mut delivered = 0;
        for (id, handler) in handlers {
            if !self.is_subscribed(id) {
                tracing::trace!(subscription_id = %id, event_type = type_name, "handler removed during delivery");
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| handler(&event as &dyn Any))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(error)) => {
                    tracing::error!(
                        subscription_id = %id,
                        event_type = type_name,
                        %error,
                        "event handler failed"
                    );
                }
                Err(payload) => {
                    tracing::error!(
                        subscription_id = %id,
                        event_type = type_name,
                        panic = panic_message(payload.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }
        delivered
    }

    /// Remove one registration. Returns `false` if the ID is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write();
        let Some((type_id, type_name)) = registry.types.remove(&id) else {
            return false;
        };

        if let Some(registrations) = registry.by_type.get_mut(&type_id) {
            registrations.retain(|r| r.id != id);
            if registrations.is_empty() {
                registry.by_type.remove(&type_id);
            }
        }
        drop(registry);

        tracing::debug!(subscription_id = %id, event_type = type_name, "event handler unsubscribed");
        true
    }

    /// Whether a subscription is still registered.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry.read().types.contains_key(&id)
    }

    /// Number of handlers registered for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.registry
            .read()
            .by_type
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().types.len()
    }

    /// Check if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration.
    pub fn clear(&self) {
        let mut registry = self.registry.write();
        registry.by_type.clear();
        registry.types.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
