//! Declarative registration batches.
//!
//! A profile buffers validator registrations so a feature area can declare
//! its validators in one place. Nothing touches a registry until the profile
//! is merged; profiles can be unit-constructed and inspected on their own.

use grpc_validate_domain::{Failure, Lifetime, MessageKey, ServiceKey};
use grpc_validate_ports::{
    ErasedValidator, InjectorPort, InlineValidator, MessageValidator, TypedValidator,
    ValidatorFactory, erased_factory,
};
use grpc_validate_shared::Result;
use std::fmt;
use std::sync::Arc;

pub(crate) struct ProfileEntry {
    pub(crate) message: MessageKey,
    pub(crate) validator: ServiceKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: ValidatorFactory,
}

/// A named bundle of validator registrations, buffered until merged.
pub struct ValidationProfile {
    name: Box<str>,
    entries: Vec<ProfileEntry>,
}

impl ValidationProfile {
    /// Create an empty profile.
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Profile name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Buffer a typed validator registration under the message type `M`.
    #[must_use]
    pub fn add_validator<M, V, F>(mut self, lifetime: Lifetime, build: F) -> Self
    where
        M: Send + Sync + 'static,
        V: MessageValidator<M> + 'static,
        F: Fn(&dyn InjectorPort) -> Result<V> + Send + Sync + 'static,
    {
        self.entries.push(ProfileEntry {
            message: MessageKey::of::<M>(),
            validator: ServiceKey::of::<V>(),
            lifetime,
            factory: erased_factory(build),
        });
        self
    }

    /// Buffer an inline rule closure under the message type `M`.
    ///
    /// Inline validators are always Singleton; the API accepts no lifetime.
    #[must_use]
    pub fn add_inline<M>(
        mut self,
        rules: impl Fn(&M) -> Vec<Failure> + Send + Sync + 'static,
    ) -> Self
    where
        M: Send + Sync + 'static,
    {
        let validator: ErasedValidator =
            Arc::new(TypedValidator::new(InlineValidator::new(rules)));
        let factory: ValidatorFactory = Arc::new(move |_| Ok(Arc::clone(&validator)));
        self.entries.push(ProfileEntry {
            message: MessageKey::of::<M>(),
            validator: ServiceKey::of::<InlineValidator<M>>(),
            lifetime: Lifetime::Singleton,
            factory,
        });
        self
    }

    /// Number of buffered registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the profile buffers no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inspect the buffered registrations as (validator, message, lifetime).
    pub fn bindings(&self) -> impl Iterator<Item = (ServiceKey, MessageKey, Lifetime)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.validator, entry.message, entry.lifetime))
    }

    pub(crate) fn into_entries(self) -> Vec<ProfileEntry> {
        self.entries
    }
}

impl fmt::Debug for ValidationProfile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidationProfile")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hello {
        name: String,
    }

    #[test]
    fn profile_buffers_without_a_registry() {
        let profile = ValidationProfile::new("greetings").add_inline::<Hello>(|message| {
            if message.name.is_empty() {
                vec![Failure::new("name", "must not be empty")]
            } else {
                Vec::new()
            }
        });

        assert_eq!(profile.name(), "greetings");
        assert_eq!(profile.len(), 1);

        let bound: Vec<_> = profile.bindings().collect();
        assert_eq!(
            bound.first().map(|(_, message, lifetime)| (*message, *lifetime)),
            Some((MessageKey::of::<Hello>(), Lifetime::Singleton))
        );
    }
}
