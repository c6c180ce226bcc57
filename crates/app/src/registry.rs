//! Message-type → validator-binding registry.
//!
//! Registration follows a construct-then-freeze discipline: all registration
//! happens on a mutable [`RegistryBuilder`] at startup, which is then frozen
//! into an immutable [`ValidatorRegistry`]. Lookups on the frozen registry
//! are plain map reads and need no locking on the hot path.

use crate::profile::ValidationProfile;
use grpc_validate_domain::{BindingId, Failure, Lifetime, MessageKey, ServiceKey};
use grpc_validate_ports::{
    ErasedValidator, InjectorPort, InlineValidator, MessageValidator, TypedValidator,
    ValidatorFactory, erased_factory,
};
use grpc_validate_shared::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A registered association between a message type and a validator.
///
/// Bindings are created at registration time and immutable afterwards. The
/// singleton cell is lazily filled on first resolution (single-flight); that
/// is caching, not mutation of the binding's identity.
pub struct ValidatorBinding {
    id: BindingId,
    message: MessageKey,
    validator: ServiceKey,
    lifetime: Lifetime,
    factory: ValidatorFactory,
    singleton: OnceCell<ErasedValidator>,
}

impl ValidatorBinding {
    fn new(
        id: BindingId,
        message: MessageKey,
        validator: ServiceKey,
        lifetime: Lifetime,
        factory: ValidatorFactory,
    ) -> Self {
        Self {
            id,
            message,
            validator,
            lifetime,
            factory,
            singleton: OnceCell::new(),
        }
    }

    /// Registration-order identity.
    #[must_use]
    pub const fn id(&self) -> BindingId {
        self.id
    }

    /// Message type this binding applies to.
    #[must_use]
    pub const fn message(&self) -> MessageKey {
        self.message
    }

    /// Validator type identity.
    #[must_use]
    pub const fn validator(&self) -> ServiceKey {
        self.validator
    }

    /// Declared instance lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) const fn factory(&self) -> &ValidatorFactory {
        &self.factory
    }

    pub(crate) const fn singleton_cell(&self) -> &OnceCell<ErasedValidator> {
        &self.singleton
    }
}

impl fmt::Debug for ValidatorBinding {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidatorBinding")
            .field("id", &self.id)
            .field("message", &self.message)
            .field("validator", &self.validator)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Mutable registration surface, frozen into a [`ValidatorRegistry`] at
/// startup.
///
/// Registering the same validator twice under the same message type yields
/// two independent bindings and both run: duplicates are a developer choice,
/// not a framework error, and are deliberately not detected.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    next_id: u64,
    bindings: HashMap<MessageKey, Vec<ValidatorBinding>>,
}

impl RegistryBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an erased validator factory under a message key.
    pub fn register(
        &mut self,
        message: MessageKey,
        validator: ServiceKey,
        lifetime: Lifetime,
        factory: ValidatorFactory,
    ) -> BindingId {
        let id = BindingId::new(self.next_id);
        self.next_id += 1;
        self.bindings
            .entry(message)
            .or_default()
            .push(ValidatorBinding::new(id, message, validator, lifetime, factory));
        id
    }

    /// Register a typed validator constructor under the message type `M`.
    pub fn register_validator<M, V, F>(&mut self, lifetime: Lifetime, build: F) -> BindingId
    where
        M: Send + Sync + 'static,
        V: MessageValidator<M> + 'static,
        F: Fn(&dyn InjectorPort) -> Result<V> + Send + Sync + 'static,
    {
        self.register(
            MessageKey::of::<M>(),
            ServiceKey::of::<V>(),
            lifetime,
            erased_factory(build),
        )
    }

    /// Register an inline rule closure under the message type `M`.
    ///
    /// Inline validators capture no per-call dependencies, so they are built
    /// eagerly and bound as Singleton; there is no lifetime to choose.
    pub fn register_inline<M>(
        &mut self,
        rules: impl Fn(&M) -> Vec<Failure> + Send + Sync + 'static,
    ) -> BindingId
    where
        M: Send + Sync + 'static,
    {
        let validator: ErasedValidator =
            Arc::new(TypedValidator::new(InlineValidator::new(rules)));
        let factory: ValidatorFactory = Arc::new(move |_| Ok(Arc::clone(&validator)));
        self.register(
            MessageKey::of::<M>(),
            ServiceKey::of::<InlineValidator<M>>(),
            Lifetime::Singleton,
            factory,
        )
    }

    /// Apply a buffered profile's registrations, in the order they were added
    /// to the profile. The profile is consumed; it is applied exactly once.
    pub fn merge(&mut self, profile: ValidationProfile) -> Vec<BindingId> {
        profile
            .into_entries()
            .into_iter()
            .map(|entry| {
                self.register(entry.message, entry.validator, entry.lifetime, entry.factory)
            })
            .collect()
    }

    /// Number of bindings registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// Returns true when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Freeze the builder into an immutable registry.
    #[must_use]
    pub fn freeze(self) -> ValidatorRegistry {
        ValidatorRegistry {
            bindings: self.bindings,
        }
    }
}

/// Immutable message-type → bindings mapping.
///
/// Read-mostly after startup: lookups are lock-free map reads, shared across
/// calls behind an `Arc`.
#[derive(Debug)]
pub struct ValidatorRegistry {
    bindings: HashMap<MessageKey, Vec<ValidatorBinding>>,
}

impl ValidatorRegistry {
    /// Bindings for a message key, in registration order.
    ///
    /// An empty slice, never an error: absence of a validator means the
    /// message is implicitly valid.
    #[must_use]
    pub fn lookup(&self, message: MessageKey) -> &[ValidatorBinding] {
        self.bindings.get(&message).map_or(&[], Vec::as_slice)
    }

    /// Total number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// Returns true when the registry holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Message keys with at least one binding.
    pub fn message_keys(&self) -> impl Iterator<Item = MessageKey> + '_ {
        self.bindings.keys().copied()
    }
}
