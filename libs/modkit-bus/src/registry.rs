//! Handler registry: event type → handler factories, built once at startup.
//!
//! Modules register through a [`Registrar`] tagged with their name. The
//! sealed [`HandlerRegistry`] is immutable and shared by every publish call;
//! handler instances are only ever created inside a [`Scope`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::BusConfig;
use crate::error::{BusError, ConfigurationFault, RegistryError};
use crate::event::IntegrationEvent;
use crate::handler::{EventHandler, RequestHandler};
use crate::scope::Scope;
use crate::services::{Boxed, ScopedFactory, ServiceCollection};
use crate::type_key::TypeKey;

type BroadcastFactory<E> =
    Arc<dyn Fn(&Scope) -> anyhow::Result<Box<dyn EventHandler<E>>> + Send + Sync + 'static>;

type RequestFactory<E, T> =
    Arc<dyn Fn(&Scope) -> anyhow::Result<Box<dyn RequestHandler<E, T>>> + Send + Sync + 'static>;

/// Which capability a handler registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Broadcast,
    Request,
}

/// Diagnostic record of one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDescriptor {
    /// `IntegrationEvent::NAME` of the handled event.
    pub event: &'static str,
    /// Answer type for request handlers.
    pub answer: Option<&'static str>,
    /// Module that registered the handler.
    pub owner: &'static str,
    /// Handler type name.
    pub handler: &'static str,
    pub capability: Capability,
}

impl HandlerDescriptor {
    fn label(&self) -> String {
        format!("{} ({})", self.handler, self.owner)
    }
}

struct Registration {
    descriptor: HandlerDescriptor,
    /// `BroadcastFactory<E>` or `RequestFactory<E, T>`.
    factory: Boxed,
}

/// A handler instance built inside a scope, with the name used in logs.
pub(crate) struct Resolved<H: ?Sized> {
    pub(crate) name: &'static str,
    pub(crate) handler: Box<H>,
}

/// Collects registrations; keys are event (and answer) types.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    broadcast: HashMap<TypeKey, Vec<Registration>>,
    requests: HashMap<(TypeKey, TypeKey), Vec<Registration>>,
    services: ServiceCollection,
    catalog: Vec<HandlerDescriptor>,
    errors: Vec<String>,
}

impl HandlerRegistryBuilder {
    /// Registration handle for one module.
    pub fn registrar(&mut self, owner: &'static str) -> Registrar<'_> {
        Registrar {
            owner,
            builder: self,
        }
    }

    /// Seal the registry.
    ///
    /// Ambiguous request wiring is fatal only with `strict_requests`;
    /// otherwise it is logged here and reported as a configuration fault
    /// when somebody publishes that request.
    pub fn build(self, config: &BusConfig) -> Result<HandlerRegistry, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::InvalidRegistration {
                errors: self.errors,
            });
        }

        let mut ambiguous: Vec<ConfigurationFault> = self
            .requests
            .values()
            .filter(|regs| regs.len() > 1)
            .map(|regs| ambiguity(regs))
            .collect();
        ambiguous.sort_by_key(|fault| fault.to_string());

        if let Some(fault) = ambiguous.first() {
            if config.strict_requests {
                return Err(RegistryError::AmbiguousRequestHandlers(fault.clone()));
            }
            for fault in &ambiguous {
                tracing::warn!(%fault, "ambiguous request wiring; publishing this request will fail");
            }
        }

        let registry = HandlerRegistry {
            broadcast: self.broadcast,
            requests: self.requests,
            services: Arc::new(self.services),
            catalog: self.catalog,
        };
        tracing::info!(
            handlers = registry.catalog.len(),
            services = registry.services.len(),
            "handler registry sealed"
        );
        Ok(registry)
    }
}

/// Registration surface handed to one module during startup.
pub struct Registrar<'a> {
    owner: &'static str,
    builder: &'a mut HandlerRegistryBuilder,
}

impl Registrar<'_> {
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Add a broadcast handler for `E`. Handlers run in registration order.
    pub fn on_event<E, H, F>(&mut self, factory: F) -> &mut Self
    where
        E: IntegrationEvent,
        H: EventHandler<E> + 'static,
        F: Fn(&Scope) -> anyhow::Result<H> + Send + Sync + 'static,
    {
        let factory: BroadcastFactory<E> = Arc::new(move |scope: &Scope| {
            factory(scope).map(|h| Box::new(h) as Box<dyn EventHandler<E>>)
        });
        let descriptor = HandlerDescriptor {
            event: E::NAME,
            answer: None,
            owner: self.owner,
            handler: std::any::type_name::<H>(),
            capability: Capability::Broadcast,
        };
        tracing::debug!(event = E::NAME, handler = descriptor.handler, owner = self.owner, "broadcast handler registered");
        self.builder.catalog.push(descriptor.clone());
        self.builder
            .broadcast
            .entry(TypeKey::of::<E>())
            .or_default()
            .push(Registration {
                descriptor,
                factory: Box::new(factory),
            });
        self
    }

    /// Add the request handler answering `E` with `T`.
    pub fn on_request<E, T, H, F>(&mut self, factory: F) -> &mut Self
    where
        E: IntegrationEvent,
        T: Send + 'static,
        H: RequestHandler<E, T> + 'static,
        F: Fn(&Scope) -> anyhow::Result<H> + Send + Sync + 'static,
    {
        let factory: RequestFactory<E, T> = Arc::new(move |scope: &Scope| {
            factory(scope).map(|h| Box::new(h) as Box<dyn RequestHandler<E, T>>)
        });
        let descriptor = HandlerDescriptor {
            event: E::NAME,
            answer: Some(std::any::type_name::<T>()),
            owner: self.owner,
            handler: std::any::type_name::<H>(),
            capability: Capability::Request,
        };
        tracing::debug!(event = E::NAME, handler = descriptor.handler, owner = self.owner, "request handler registered");
        self.builder.catalog.push(descriptor.clone());
        self.builder
            .requests
            .entry((TypeKey::of::<E>(), TypeKey::of::<T>()))
            .or_default()
            .push(Registration {
                descriptor,
                factory: Box::new(factory),
            });
        self
    }

    /// Share one instance of `T` with every scope.
    pub fn provide_singleton<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if let Err(existing) = self.builder.services.add_singleton::<T>(self.owner, service) {
            self.duplicate_service::<T>(existing);
        }
        self
    }

    /// Build `T` at most once per scope, on first resolution.
    pub fn provide_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        let factory: ScopedFactory<T> = Arc::new(factory);
        if let Err(existing) = self.builder.services.add_scoped::<T>(self.owner, factory) {
            self.duplicate_service::<T>(existing);
        }
        self
    }

    fn duplicate_service<T: ?Sized + 'static>(&mut self, existing: &'static str) {
        self.builder.errors.push(format!(
            "Service '{}' registered by '{}' is already provided by '{}'",
            std::any::type_name::<T>(),
            self.owner,
            existing
        ));
    }
}

fn ambiguity(regs: &[Registration]) -> ConfigurationFault {
    let first = &regs[0].descriptor;
    ConfigurationFault::AmbiguousRequestHandlers {
        event: first.event,
        answer: first.answer.unwrap_or("()"),
        candidates: regs.iter().map(|r| r.descriptor.label()).collect(),
    }
}

/// Sealed, read-only handler registry.
pub struct HandlerRegistry {
    broadcast: HashMap<TypeKey, Vec<Registration>>,
    requests: HashMap<(TypeKey, TypeKey), Vec<Registration>>,
    services: Arc<ServiceCollection>,
    catalog: Vec<HandlerDescriptor>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("events", &self.broadcast.len())
            .field("requests", &self.requests.len())
            .field("services", &self.services.len())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Every registration, in registration order.
    pub fn catalog(&self) -> &[HandlerDescriptor] {
        &self.catalog
    }

    pub fn services(&self) -> &ServiceCollection {
        &self.services
    }

    pub fn broadcast_count<E: IntegrationEvent>(&self) -> usize {
        self.broadcast
            .get(&TypeKey::of::<E>())
            .map_or(0, Vec::len)
    }

    pub fn request_count<E: IntegrationEvent, T: 'static>(&self) -> usize {
        self.requests
            .get(&(TypeKey::of::<E>(), TypeKey::of::<T>()))
            .map_or(0, Vec::len)
    }

    pub(crate) fn open_scope<E: IntegrationEvent>(
        &self,
        cancel: &tokio_util::sync::CancellationToken,
    ) -> Scope {
        Scope::open(E::NAME, self.services.clone(), cancel.clone())
    }

    /// Build every broadcast handler for `E` inside `scope`, in registration order.
    pub(crate) fn resolve_broadcast<E: IntegrationEvent>(
        &self,
        scope: &Scope,
    ) -> Result<Vec<Resolved<dyn EventHandler<E>>>, BusError> {
        let Some(regs) = self.broadcast.get(&TypeKey::of::<E>()) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(regs.len());
        for reg in regs {
            let factory = reg
                .factory
                .downcast_ref::<BroadcastFactory<E>>()
                .ok_or(ConfigurationFault::TypeMismatch {
                    event: E::NAME,
                    handler: reg.descriptor.handler,
                })?;
            let handler = factory(scope).map_err(|source| BusError::Construction {
                event: E::NAME,
                handler: reg.descriptor.handler,
                source,
            })?;
            out.push(Resolved {
                name: reg.descriptor.handler,
                handler,
            });
        }
        Ok(out)
    }

    /// Build the single request handler for `(E, T)`.
    ///
    /// Cardinality is checked before anything is constructed.
    pub(crate) fn resolve_request<E: IntegrationEvent, T: Send + 'static>(
        &self,
        scope: &Scope,
    ) -> Result<Resolved<dyn RequestHandler<E, T>>, BusError> {
        let regs = self
            .requests
            .get(&(TypeKey::of::<E>(), TypeKey::of::<T>()))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let reg = match regs {
            [] => {
                return Err(ConfigurationFault::NoRequestHandler {
                    event: E::NAME,
                    answer: std::any::type_name::<T>(),
                }
                .into())
            }
            [only] => only,
            many => return Err(ambiguity(many).into()),
        };

        let factory = reg
            .factory
            .downcast_ref::<RequestFactory<E, T>>()
            .ok_or(ConfigurationFault::TypeMismatch {
                event: E::NAME,
                handler: reg.descriptor.handler,
            })?;
        let handler = factory(scope).map_err(|source| BusError::Construction {
            event: E::NAME,
            handler: reg.descriptor.handler,
            source,
        })?;
        Ok(Resolved {
            name: reg.descriptor.handler,
            handler,
        })
    }
}
