//! Live validator instances per call, honoring declared lifetimes.
//!
//! Resolution walks the bindings for a message key and produces instances:
//! singletons come from a lazily-filled single-flight cell (concurrent first
//! resolutions construct exactly one instance), scoped instances are owned by
//! the call's [`CallScope`] and reused within it, transients are constructed
//! fresh on every resolve.

use crate::registry::{ValidatorBinding, ValidatorRegistry};
use grpc_validate_domain::{BindingId, Lifetime, MessageKey, ServiceKey};
use grpc_validate_ports::{ErasedValidator, InjectorPort, ProviderPort};
use grpc_validate_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Per-call lifetime boundary.
///
/// Owns the scoped validator instances resolved during one call (an ownership
/// map keyed by binding id) plus the call's view of the host container. Both
/// are released when the scope is dropped at call end.
pub struct CallScope {
    injector: Arc<dyn InjectorPort>,
    scoped: Mutex<HashMap<BindingId, ErasedValidator>>,
}

impl CallScope {
    fn new(injector: Arc<dyn InjectorPort>) -> Self {
        Self {
            injector,
            scoped: Mutex::new(HashMap::new()),
        }
    }

    /// The call-scoped dependency injector.
    #[must_use]
    pub fn injector(&self) -> &dyn InjectorPort {
        self.injector.as_ref()
    }

    fn get_or_build(&self, binding: &ValidatorBinding) -> Result<ErasedValidator> {
        let mut scoped = self
            .scoped
            .lock()
            .map_err(|_| scope_poisoned(binding.validator()))?;
        if let Some(existing) = scoped.get(&binding.id()) {
            return Ok(Arc::clone(existing));
        }

        let instance = (binding.factory())(self.injector.as_ref())
            .map_err(|error| resolution_error(binding, &error))?;
        scoped.insert(binding.id(), Arc::clone(&instance));
        Ok(instance)
    }
}

impl fmt::Debug for CallScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let held = self.scoped.lock().map(|scoped| scoped.len()).unwrap_or(0);
        formatter
            .debug_struct("CallScope")
            .field("scoped_instances", &held)
            .finish_non_exhaustive()
    }
}

/// A live validator instance paired with its binding identity.
#[derive(Clone)]
pub struct ResolvedValidator {
    /// Registration-order identity of the originating binding.
    pub id: BindingId,
    /// Validator type identity, for diagnostics.
    pub validator: ServiceKey,
    /// The live instance.
    pub instance: ErasedValidator,
}

impl fmt::Debug for ResolvedValidator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResolvedValidator")
            .field("id", &self.id)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

/// Produces the ordered list of live validator instances for a message key.
pub struct ValidatorResolver {
    registry: Arc<ValidatorRegistry>,
    provider: Arc<dyn ProviderPort>,
}

impl ValidatorResolver {
    /// Create a resolver over a frozen registry and a host container.
    #[must_use]
    pub fn new(registry: Arc<ValidatorRegistry>, provider: Arc<dyn ProviderPort>) -> Self {
        Self { registry, provider }
    }

    /// The frozen registry this resolver consults.
    #[must_use]
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Open a fresh per-call scope.
    #[must_use]
    pub fn open_scope(&self) -> CallScope {
        CallScope::new(self.provider.open_scope())
    }

    /// Resolve the live validators for `message`, in registration order.
    ///
    /// Construction failures are configuration errors (`validation:resolution`)
    /// and propagate; they are never treated as "message is valid".
    pub async fn resolve(
        &self,
        message: MessageKey,
        scope: &CallScope,
    ) -> Result<Vec<ResolvedValidator>> {
        let bindings = self.registry.lookup(message);
        let mut resolved = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let instance = match binding.lifetime() {
                Lifetime::Singleton => self.resolve_singleton(binding).await?,
                Lifetime::Scoped => scope.get_or_build(binding)?,
                Lifetime::Transient => (binding.factory())(scope.injector())
                    .map_err(|error| resolution_error(binding, &error))?,
            };

            resolved.push(ResolvedValidator {
                id: binding.id(),
                validator: binding.validator(),
                instance,
            });
        }

        Ok(resolved)
    }

    /// Singleton construction is single-flight: the `OnceCell` guarantees one
    /// winner under concurrent first resolutions, and everyone observes the
    /// winner's instance. Singletons resolve against the provider root, not
    /// the call scope.
    async fn resolve_singleton(&self, binding: &ValidatorBinding) -> Result<ErasedValidator> {
        let root = self.provider.root();
        let instance = binding
            .singleton_cell()
            .get_or_try_init(|| {
                let constructed = (binding.factory())(root.as_ref())
                    .map_err(|error| resolution_error(binding, &error));
                async move { constructed }
            })
            .await?;
        Ok(Arc::clone(instance))
    }
}

impl fmt::Debug for ValidatorResolver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidatorResolver")
            .field("bindings", &self.registry.len())
            .finish_non_exhaustive()
    }
}

fn resolution_error(binding: &ValidatorBinding, cause: &ErrorEnvelope) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::resolution(),
        format!("failed to construct validator {}", binding.validator()),
    )
    .with_metadata("message_type", binding.message().type_name())
    .with_metadata("lifetime", binding.lifetime().as_str())
    .with_metadata("cause", cause.message.clone())
}

fn scope_poisoned(validator: ServiceKey) -> ErrorEnvelope {
    ErrorEnvelope::invariant(
        ErrorCode::resolution(),
        "call scope lock poisoned during resolution",
    )
    .with_metadata("validator", validator.type_name())
}
