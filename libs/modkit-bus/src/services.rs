//! Root service providers, keyed by interface type.
//!
//! - Key = `TypeKey::of::<T>()`, so `T` may be a trait object (`dyn Store`).
//! - Singletons are stored as `Arc<T>` and shared by every scope.
//! - Scoped providers are factories; a [`Scope`](crate::scope::Scope) builds
//!   each scoped service at most once and drops it with the scope.
//! - The collection is filled once at startup and read-only afterwards, so
//!   lookups take no lock.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::scope::Scope;
use crate::type_key::TypeKey;

pub(crate) type Boxed = Box<dyn Any + Send + Sync>;

/// Factory for a scoped service. Returns `Arc<T>` so `T` can be unsized.
pub(crate) type ScopedFactory<T> =
    Arc<dyn Fn(&Scope) -> anyhow::Result<Arc<T>> + Send + Sync + 'static>;

pub(crate) enum Provider {
    /// Holds `Arc<T>`.
    Singleton(Boxed),
    /// Holds `ScopedFactory<T>`.
    Scoped(Boxed),
}

/// How long a resolved service lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Singleton,
    Scoped,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("service not registered: type={0}")]
    NotRegistered(&'static str),

    #[error("type mismatch in service collection for type={0}")]
    TypeMismatch(&'static str),

    #[error("scoped service '{0}' depends on itself")]
    Cycle(&'static str),

    #[error("failed to construct scoped service '{type_name}'")]
    Construction {
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Read-only after startup; owned by the sealed handler registry.
#[derive(Default)]
pub struct ServiceCollection {
    providers: HashMap<TypeKey, (Lifetime, &'static str, Provider)>,
}

impl ServiceCollection {
    /// Returns the owner of the existing registration when `T` is taken.
    pub(crate) fn add_singleton<T>(
        &mut self,
        owner: &'static str,
        service: Arc<T>,
    ) -> Result<(), &'static str>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(
            TypeKey::of::<T>(),
            owner,
            Lifetime::Singleton,
            Provider::Singleton(Box::new(service)),
        )
    }

    pub(crate) fn add_scoped<T>(
        &mut self,
        owner: &'static str,
        factory: ScopedFactory<T>,
    ) -> Result<(), &'static str>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert(
            TypeKey::of::<T>(),
            owner,
            Lifetime::Scoped,
            Provider::Scoped(Box::new(factory)),
        )
    }

    fn insert(
        &mut self,
        key: TypeKey,
        owner: &'static str,
        lifetime: Lifetime,
        provider: Provider,
    ) -> Result<(), &'static str> {
        if let Some((_, existing, _)) = self.providers.get(&key) {
            return Err(*existing);
        }
        self.providers.insert(key, (lifetime, owner, provider));
        Ok(())
    }

    pub(crate) fn provider(&self, key: &TypeKey) -> Option<&Provider> {
        self.providers.get(key).map(|(_, _, p)| p)
    }

    /// Lifetime of `T`, if registered.
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.providers.get(&TypeKey::of::<T>()).map(|(l, _, _)| *l)
    }

    /// Module that registered `T`, if any.
    pub fn owner_of<T: ?Sized + 'static>(&self) -> Option<&'static str> {
        self.providers.get(&TypeKey::of::<T>()).map(|(_, o, _)| *o)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Store: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Memory;
    impl Store for Memory {
        fn name(&self) -> &'static str {
            "memory"
        }
    }

    #[test]
    fn second_registration_reports_first_owner() {
        let mut services = ServiceCollection::default();
        let store: Arc<dyn Store> = Arc::new(Memory);
        services.add_singleton::<dyn Store>("identity", store.clone()).unwrap();

        let err = services.add_singleton::<dyn Store>("catalog", store).unwrap_err();
        assert_eq!(err, "identity");
        assert_eq!(services.len(), 1);
        assert_eq!(services.owner_of::<dyn Store>(), Some("identity"));
    }

    #[test]
    fn lifetime_is_recorded_per_type() {
        let mut services = ServiceCollection::default();
        services.add_singleton::<u32>("a", Arc::new(1)).unwrap();
        let factory: ScopedFactory<String> =
            Arc::new(|_scope: &Scope| Ok::<_, anyhow::Error>(Arc::new("x".to_string())));
        services.add_scoped::<String>("b", factory).unwrap();

        assert_eq!(services.lifetime_of::<u32>(), Some(Lifetime::Singleton));
        assert_eq!(services.lifetime_of::<String>(), Some(Lifetime::Scoped));
        assert_eq!(services.lifetime_of::<dyn Store>(), None);
        assert_eq!(Memory.name(), "memory");
    }
}
