//! In-memory dependency container with scoped acquisition.
//!
//! `StaticProvider` is the reference implementation of the provider port for
//! hosts that do not bring their own container. Services are registered by
//! type at startup; scopes hold an ownership map from service key to instance
//! and release it deterministically when dropped at call end.

use grpc_validate_domain::{Lifetime, ServiceKey};
use grpc_validate_ports::{ErasedInstance, InjectorPort, ProviderPort};
use grpc_validate_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

type ServiceFactory = Arc<dyn Fn(&dyn InjectorPort) -> Result<ErasedInstance> + Send + Sync>;

struct ServiceRegistration {
    key: ServiceKey,
    lifetime: Lifetime,
    factory: ServiceFactory,
    // Single-flight cache for singleton services. The per-registration lock
    // is held across construction, so concurrent first resolutions observe
    // exactly one instance. A dependency cycle between singletons would
    // deadlock here; that is a wiring bug, not a supported configuration.
    singleton: Mutex<Option<ErasedInstance>>,
}

impl ServiceRegistration {
    fn resolve(&self, injector: &dyn InjectorPort) -> Result<ErasedInstance> {
        match self.lifetime {
            Lifetime::Singleton => {
                let mut cell = self
                    .singleton
                    .lock()
                    .map_err(|_| construction_error(self.key, "singleton lock poisoned"))?;
                if let Some(existing) = cell.as_ref() {
                    return Ok(Arc::clone(existing));
                }
                let instance = (self.factory)(injector)?;
                *cell = Some(Arc::clone(&instance));
                Ok(instance)
            },
            Lifetime::Scoped | Lifetime::Transient => (self.factory)(injector),
        }
    }
}

/// Builder for [`StaticProvider`].
#[derive(Default)]
pub struct StaticProviderBuilder {
    services: HashMap<ServiceKey, ServiceRegistration>,
}

impl StaticProviderBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built singleton instance.
    #[must_use]
    pub fn singleton<T: Send + Sync + 'static>(self, value: T) -> Self {
        let instance: ErasedInstance = Arc::new(value);
        self.register_erased(
            ServiceKey::of::<T>(),
            Lifetime::Singleton,
            Arc::new(move |_| Ok(Arc::clone(&instance))),
        )
    }

    /// Register a service constructor with an explicit lifetime.
    #[must_use]
    pub fn register<T, F>(self, lifetime: Lifetime, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn InjectorPort) -> Result<T> + Send + Sync + 'static,
    {
        self.register_erased(
            ServiceKey::of::<T>(),
            lifetime,
            Arc::new(move |injector| {
                let value = build(injector)?;
                let erased: ErasedInstance = Arc::new(value);
                Ok(erased)
            }),
        )
    }

    fn register_erased(
        mut self,
        key: ServiceKey,
        lifetime: Lifetime,
        factory: ServiceFactory,
    ) -> Self {
        self.services.insert(
            key,
            ServiceRegistration {
                key,
                lifetime,
                factory,
                singleton: Mutex::new(None),
            },
        );
        self
    }

    /// Freeze the registrations into a provider.
    #[must_use]
    pub fn build(self) -> Arc<StaticProvider> {
        Arc::new(StaticProvider {
            services: Arc::new(self.services),
        })
    }
}

impl fmt::Debug for StaticProviderBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StaticProviderBuilder")
            .field("services", &self.services.len())
            .finish()
    }
}

/// In-memory implementation of the provider port.
pub struct StaticProvider {
    services: Arc<HashMap<ServiceKey, ServiceRegistration>>,
}

impl ProviderPort for StaticProvider {
    fn root(&self) -> Arc<dyn InjectorPort> {
        Arc::new(RootInjector {
            services: Arc::clone(&self.services),
        })
    }

    fn open_scope(&self) -> Arc<dyn InjectorPort> {
        Arc::new(ScopeInjector {
            services: Arc::clone(&self.services),
            scoped: Mutex::new(HashMap::new()),
        })
    }
}

impl fmt::Debug for StaticProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StaticProvider")
            .field("services", &self.services.len())
            .finish()
    }
}

/// Process-lifetime injector: serves singletons and transients, refuses
/// scoped services outside a call scope.
struct RootInjector {
    services: Arc<HashMap<ServiceKey, ServiceRegistration>>,
}

impl InjectorPort for RootInjector {
    fn resolve_any(&self, key: &ServiceKey) -> Result<ErasedInstance> {
        let registration = self
            .services
            .get(key)
            .ok_or_else(|| not_registered(*key))?;
        if registration.lifetime == Lifetime::Scoped {
            return Err(construction_error(
                *key,
                "scoped service resolved outside a call scope",
            ));
        }
        registration.resolve(self)
    }
}

/// Per-call injector owning the scoped instances it has constructed.
struct ScopeInjector {
    services: Arc<HashMap<ServiceKey, ServiceRegistration>>,
    scoped: Mutex<HashMap<ServiceKey, ErasedInstance>>,
}

impl InjectorPort for ScopeInjector {
    fn resolve_any(&self, key: &ServiceKey) -> Result<ErasedInstance> {
        let registration = self
            .services
            .get(key)
            .ok_or_else(|| not_registered(*key))?;

        if registration.lifetime != Lifetime::Scoped {
            return registration.resolve(self);
        }

        if let Some(existing) = self
            .scoped
            .lock()
            .map_err(|_| construction_error(*key, "scope lock poisoned"))?
            .get(key)
        {
            return Ok(Arc::clone(existing));
        }

        // Construct outside the lock so a scoped service may depend on other
        // scoped services without deadlocking; a racing duplicate within one
        // scope is resolved by first-insert-wins.
        let instance = registration.resolve(self)?;
        let mut scoped = self
            .scoped
            .lock()
            .map_err(|_| construction_error(*key, "scope lock poisoned"))?;
        let winner = scoped.entry(*key).or_insert(instance);
        Ok(Arc::clone(winner))
    }
}

fn not_registered(key: ServiceKey) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::resolution(),
        format!("service not registered: {key}"),
    )
}

fn construction_error(key: ServiceKey, message: &str) -> ErrorEnvelope {
    ErrorEnvelope::invariant(ErrorCode::resolution(), message)
        .with_metadata("service", key.type_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grpc_validate_ports::resolve_typed;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Clock {
        now_ms: u64,
    }

    struct AuditTrail {
        constructions: &'static AtomicUsize,
    }

    #[test]
    fn singleton_is_shared_across_scopes() {
        let provider = StaticProviderBuilder::new()
            .singleton(Clock { now_ms: 42 })
            .build();

        let first_scope = provider.open_scope();
        let second_scope = provider.open_scope();

        let first = resolve_typed::<Clock>(first_scope.as_ref());
        let second = resolve_typed::<Clock>(second_scope.as_ref());

        let (Ok(first), Ok(second)) = (first, second) else {
            unreachable!("singleton resolution must succeed");
        };
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.now_ms, 42);
    }

    #[test]
    fn scoped_instances_are_per_scope() {
        static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

        let provider = StaticProviderBuilder::new()
            .register(Lifetime::Scoped, |_| {
                CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
                Ok(AuditTrail {
                    constructions: &CONSTRUCTIONS,
                })
            })
            .build();

        let scope = provider.open_scope();
        let first = resolve_typed::<AuditTrail>(scope.as_ref());
        let again = resolve_typed::<AuditTrail>(scope.as_ref());
        let (Ok(first), Ok(again)) = (first, again) else {
            unreachable!("scoped resolution must succeed");
        };
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.constructions.load(Ordering::SeqCst), 1);

        let other_scope = provider.open_scope();
        let other = resolve_typed::<AuditTrail>(other_scope.as_ref());
        let Ok(other) = other else {
            unreachable!("scoped resolution must succeed");
        };
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn scoped_service_is_refused_at_root() {
        let provider = StaticProviderBuilder::new()
            .register(Lifetime::Scoped, |_| Ok(Clock { now_ms: 0 }))
            .build();

        let root = provider.root();
        let resolved = resolve_typed::<Clock>(root.as_ref());
        assert!(resolved.is_err());
    }

    #[test]
    fn missing_registration_is_a_resolution_error() {
        let provider = StaticProviderBuilder::new().build();
        let scope = provider.open_scope();

        let resolved = resolve_typed::<Clock>(scope.as_ref());
        let Err(error) = resolved else {
            unreachable!("missing service must fail");
        };
        assert_eq!(error.code, ErrorCode::resolution());
    }
}
