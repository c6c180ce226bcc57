//! Validator boundary contract.
//!
//! Rule semantics are external to the dispatch core: a validator is an opaque
//! capability that inspects one message and reports zero or more failures.
//! The core only needs the erased form; typed validators are adapted into it
//! at registration time.

use crate::BoxFuture;
use crate::provider::InjectorPort;
use grpc_validate_domain::{Failure, MessageKey};
use grpc_validate_shared::{CallContext, ErrorCode, ErrorEnvelope, Result};
use std::any::Any;
use std::future::ready;
use std::marker::PhantomData;
use std::sync::Arc;

/// Validation capability for a concrete message type.
pub trait MessageValidator<M>: Send + Sync {
    /// Inspect `message` and return the failures it produces, in rule order.
    ///
    /// Returning `Err` means the validator itself crashed; the dispatch core
    /// treats that as fatal for the call, never as a validation failure.
    fn validate<'a>(
        &'a self,
        ctx: &'a CallContext,
        message: &'a M,
    ) -> BoxFuture<'a, Result<Vec<Failure>>>;
}

/// A live, shareable validator instance with its message type erased.
pub type ErasedValidator = Arc<dyn ErasedMessageValidator>;

/// Object-safe erased form of [`MessageValidator`] used by the dispatch core.
pub trait ErasedMessageValidator: Send + Sync {
    /// The message key this validator was registered under.
    fn message_key(&self) -> MessageKey;

    /// Validate an erased message.
    ///
    /// The registry guarantees the payload type matches [`Self::message_key`];
    /// a mismatch is an invariant violation, not a validation failure.
    fn validate_erased<'a>(
        &'a self,
        ctx: &'a CallContext,
        message: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<Vec<Failure>>>;
}

/// Adapter from a typed validator to the erased capability.
pub struct TypedValidator<M, V> {
    inner: V,
    _marker: PhantomData<fn(&M)>,
}

impl<M, V> TypedValidator<M, V> {
    /// Wrap a typed validator.
    pub const fn new(inner: V) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<M, V> ErasedMessageValidator for TypedValidator<M, V>
where
    M: Send + Sync + 'static,
    V: MessageValidator<M>,
{
    fn message_key(&self) -> MessageKey {
        MessageKey::of::<M>()
    }

    fn validate_erased<'a>(
        &'a self,
        ctx: &'a CallContext,
        message: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<Vec<Failure>>> {
        match message.downcast_ref::<M>() {
            Some(message) => self.inner.validate(ctx, message),
            None => Box::pin(ready(Err(ErrorEnvelope::invariant(
                ErrorCode::internal(),
                "message payload does not match the registered message key",
            )
            .with_metadata("message_type", MessageKey::of::<M>().type_name())))),
        }
    }
}

/// Inline validator: a rule closure captured at registration time.
///
/// Inline validators capture no per-call dependencies and are always bound as
/// [`Singleton`](grpc_validate_domain::Lifetime::Singleton); the registration
/// APIs accept no lifetime for them.
pub struct InlineValidator<M> {
    rules: Arc<dyn Fn(&M) -> Vec<Failure> + Send + Sync>,
}

impl<M> InlineValidator<M> {
    /// Capture a rule closure.
    pub fn new(rules: impl Fn(&M) -> Vec<Failure> + Send + Sync + 'static) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }
}

impl<M: Send + Sync> MessageValidator<M> for InlineValidator<M> {
    fn validate<'a>(
        &'a self,
        _ctx: &'a CallContext,
        message: &'a M,
    ) -> BoxFuture<'a, Result<Vec<Failure>>> {
        let failures = (self.rules)(message);
        Box::pin(ready(Ok(failures)))
    }
}

/// Factory constructing an erased validator instance against an injector.
///
/// The injector passed in depends on the binding's lifetime: singletons are
/// constructed against the provider root, everything else against the call
/// scope.
pub type ValidatorFactory =
    Arc<dyn Fn(&dyn InjectorPort) -> Result<ErasedValidator> + Send + Sync>;

/// Build a [`ValidatorFactory`] from a typed validator constructor.
pub fn erased_factory<M, V, F>(build: F) -> ValidatorFactory
where
    M: Send + Sync + 'static,
    V: MessageValidator<M> + 'static,
    F: Fn(&dyn InjectorPort) -> Result<V> + Send + Sync + 'static,
{
    Arc::new(move |injector| {
        let validator = build(injector)?;
        let erased: ErasedValidator = Arc::new(TypedValidator::new(validator));
        Ok(erased)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hello {
        name: String,
    }

    struct NameNotEmpty;

    impl MessageValidator<Hello> for NameNotEmpty {
        fn validate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            message: &'a Hello,
        ) -> BoxFuture<'a, Result<Vec<Failure>>> {
            let failures = if message.name.trim().is_empty() {
                vec![Failure::new("name", "must not be empty")]
            } else {
                Vec::new()
            };
            Box::pin(ready(Ok(failures)))
        }
    }

    #[tokio::test]
    async fn typed_validator_downcasts_and_delegates() {
        let ctx = CallContext::new_call();
        let erased = TypedValidator::<Hello, _>::new(NameNotEmpty);
        let message = Hello {
            name: String::new(),
        };

        let erased_message: &(dyn Any + Send + Sync) = &message;
        let failures = erased.validate_erased(&ctx, erased_message).await;
        assert_eq!(failures.map(|failures| failures.len()), Ok(1));
    }

    #[tokio::test]
    async fn typed_validator_rejects_mismatched_payload() {
        let ctx = CallContext::new_call();
        let erased = TypedValidator::<Hello, _>::new(NameNotEmpty);

        let wrong: &(dyn Any + Send + Sync) = &42u32;
        let result = erased.validate_erased(&ctx, wrong).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn inline_validator_runs_rule_closure() {
        let ctx = CallContext::new_call();
        let inline = InlineValidator::new(|message: &Hello| {
            if message.name.is_empty() {
                vec![Failure::new("name", "must not be empty")]
            } else {
                Vec::new()
            }
        });

        let valid = Hello {
            name: "world".to_owned(),
        };
        let failures = inline.validate(&ctx, &valid).await;
        assert_eq!(failures.map(|failures| failures.len()), Ok(0));
    }
}
