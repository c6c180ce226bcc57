//! Identity keys for runtime lookup.
//!
//! A [`MessageKey`] identifies a request message type; a [`ServiceKey`]
//! identifies a validator or service type inside the dependency container.
//! Both carry the `TypeId` for equality and the type name for diagnostics.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identity of a request message type.
#[derive(Debug, Clone, Copy, Eq)]
pub struct MessageKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl MessageKey {
    /// Key for the message type `M`.
    #[must_use]
    pub fn of<M: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            type_name: any::type_name::<M>(),
        }
    }

    /// Fully-qualified name of the message type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for MessageKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Hash for MessageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.type_name)
    }
}

/// Stable identity of a validator or service type in the container.
#[derive(Debug, Clone, Copy, Eq)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceKey {
    /// Key for the service type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// Fully-qualified name of the service type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.type_name)
    }
}

/// Registration-order identity of a validator binding.
///
/// Ids are assigned from a monotonic counter at registration time and fix the
/// order failures are reported in, regardless of completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    /// Wrap a raw registration counter value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw registration counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "binding_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hello;
    struct Goodbye;

    #[test]
    fn message_keys_compare_by_type() {
        assert_eq!(MessageKey::of::<Hello>(), MessageKey::of::<Hello>());
        assert_ne!(MessageKey::of::<Hello>(), MessageKey::of::<Goodbye>());
    }

    #[test]
    fn keys_expose_type_names() {
        let key = MessageKey::of::<Hello>();
        assert!(key.type_name().ends_with("Hello"));
        assert!(key.to_string().ends_with("Hello"));

        let service = ServiceKey::of::<Goodbye>();
        assert!(service.type_name().ends_with("Goodbye"));
    }

    #[test]
    fn binding_ids_order_by_registration() {
        let first = BindingId::new(1);
        let second = BindingId::new(2);
        assert!(first < second);
        assert_eq!(first.to_string(), "binding_1");
    }
}
