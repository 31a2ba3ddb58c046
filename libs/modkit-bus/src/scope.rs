//! Per-publish resolution scope.
//!
//! A [`Scope`] is opened by the bus right before dispatch and dropped right
//! after the outcome is computed. Handlers and the scoped services they pull
//! in live inside it; nothing scoped is visible to another publish call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::services::{Boxed, Provider, ScopedFactory, ServiceCollection, ServiceError};
use crate::type_key::TypeKey;

pub struct Scope {
    id: Uuid,
    event: &'static str,
    services: Arc<ServiceCollection>,
    instances: Mutex<HashMap<TypeKey, Boxed>>,
    // Scoped types whose factory is currently running; guards against cycles.
    constructing: Mutex<Vec<TypeKey>>,
    cancel: CancellationToken,
}

impl Scope {
    pub(crate) fn open(
        event: &'static str,
        services: Arc<ServiceCollection>,
        cancel: CancellationToken,
    ) -> Self {
        let scope = Self {
            id: Uuid::new_v4(),
            event,
            services,
            instances: Mutex::new(HashMap::new()),
            constructing: Mutex::new(Vec::new()),
            cancel,
        };
        tracing::trace!(scope_id = %scope.id, event, "scope opened");
        scope
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the event this scope was opened for.
    #[inline]
    pub fn event_name(&self) -> &'static str {
        self.event
    }

    /// The caller's cancellation signal for this publish call.
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Number of scoped services built so far in this scope.
    pub fn scoped_instances(&self) -> usize {
        self.instances.lock().len()
    }

    /// Resolve a service by interface type.
    ///
    /// Singletons come straight from the root collection. Scoped services are
    /// built on first use and cached for the rest of this scope.
    pub fn resolve<T>(&self) -> Result<Arc<T>, ServiceError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        match self.services.provider(&key) {
            None => Err(ServiceError::NotRegistered(key.name())),
            Some(Provider::Singleton(boxed)) => boxed
                .downcast_ref::<Arc<T>>()
                .cloned()
                .ok_or(ServiceError::TypeMismatch(key.name())),
            Some(Provider::Scoped(boxed)) => {
                if let Some(existing) = self.cached::<T>(&key)? {
                    return Ok(existing);
                }
                let factory = boxed
                    .downcast_ref::<ScopedFactory<T>>()
                    .cloned()
                    .ok_or(ServiceError::TypeMismatch(key.name()))?;
                self.build_scoped(key, factory)
            }
        }
    }

    fn cached<T>(&self, key: &TypeKey) -> Result<Option<Arc<T>>, ServiceError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instances = self.instances.lock();
        match instances.get(key) {
            None => Ok(None),
            Some(boxed) => boxed
                .downcast_ref::<Arc<T>>()
                .cloned()
                .map(Some)
                .ok_or(ServiceError::TypeMismatch(key.name())),
        }
    }

    fn build_scoped<T>(&self, key: TypeKey, factory: ScopedFactory<T>) -> Result<Arc<T>, ServiceError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        {
            let mut constructing = self.constructing.lock();
            if constructing.contains(&key) {
                return Err(ServiceError::Cycle(key.name()));
            }
            constructing.push(key);
        }

        // No lock held while the factory runs: it may resolve other services.
        let built = factory(self);
        self.constructing.lock().retain(|k| *k != key);

        let instance = built.map_err(|source| ServiceError::Construction {
            type_name: key.name(),
            source,
        })?;

        self.instances
            .lock()
            .insert(key, Box::new(instance.clone()));
        tracing::trace!(scope_id = %self.id, service = key.name(), "scoped service built");
        Ok(instance)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("scoped_instances", &self.scoped_instances())
            .finish()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let disposed = self.instances.get_mut().len();
        // Scoped services drop here, together with the map.
        tracing::trace!(scope_id = %self.id, event = self.event, disposed, "scope closed");
    }
}
