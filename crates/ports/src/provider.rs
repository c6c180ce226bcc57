//! Dependency-resolution boundary contract.
//!
//! The dependency container itself is external: the dispatch core only needs
//! the capability to resolve a service by key within a lifetime boundary, and
//! to open a fresh boundary per call. Scoped instances are owned by the scope
//! injector and released when it is dropped at call end.

use grpc_validate_domain::ServiceKey;
use grpc_validate_shared::{ErrorCode, ErrorEnvelope, Result};
use std::any::Any;
use std::sync::Arc;

/// Erased service instance handed out by the container.
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

/// Dependency-resolution capability for one lifetime boundary.
pub trait InjectorPort: Send + Sync {
    /// Resolve a service by key within this boundary.
    ///
    /// A missing registration or a failing constructor is a configuration
    /// error, surfaced as a resolution failure. It is never coerced into
    /// "message is valid".
    fn resolve_any(&self, key: &ServiceKey) -> Result<ErasedInstance>;
}

/// Typed resolution helper over [`InjectorPort::resolve_any`].
pub fn resolve_typed<T: Send + Sync + 'static>(injector: &dyn InjectorPort) -> Result<Arc<T>> {
    let key = ServiceKey::of::<T>();
    let instance = injector.resolve_any(&key)?;
    instance.downcast::<T>().map_err(|_| {
        ErrorEnvelope::invariant(
            ErrorCode::resolution(),
            "container returned a mismatched instance type",
        )
        .with_metadata("service", key.type_name())
    })
}

/// The host dependency container.
pub trait ProviderPort: Send + Sync {
    /// Process-lifetime injector, used to construct singleton services.
    fn root(&self) -> Arc<dyn InjectorPort>;

    /// Open a per-call scope.
    ///
    /// Dropping the returned injector releases every scoped instance it owns;
    /// callers keep it alive exactly as long as the call.
    fn open_scope(&self) -> Arc<dyn InjectorPort>;
}
