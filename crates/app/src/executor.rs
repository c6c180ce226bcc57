//! Concurrent validator execution with deterministic failure ordering.
//!
//! All validators for a message run concurrently; each may suspend on
//! external work without blocking the others. The merged verdict reports
//! failures in registration order regardless of completion order:
//! concurrency affects when work happens, never how results are ordered.

use crate::resolver::ResolvedValidator;
use futures_util::future;
use grpc_validate_domain::ValidationVerdict;
use grpc_validate_ports::{LogFields, LoggerPort};
use grpc_validate_shared::{CallContext, ErrorCode, ErrorEnvelope, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runs resolved validators against a message instance and merges the
/// outcome into a single verdict.
#[derive(Clone, Default)]
pub struct ValidationExecutor {
    logger: Option<Arc<dyn LoggerPort>>,
}

impl ValidationExecutor {
    /// Executor without logging.
    #[must_use]
    pub const fn new() -> Self {
        Self { logger: None }
    }

    /// Attach a structured logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Execute `validators` against `message` and merge their failures.
    ///
    /// An empty validator list short-circuits to a valid verdict: absence of
    /// a validator means the message is implicitly valid. A validator that
    /// returns `Err` crashed; its error propagates as
    /// `validation:validator_crash` and is never folded into the verdict.
    pub async fn execute<M>(
        &self,
        ctx: &CallContext,
        message: &M,
        validators: &[ResolvedValidator],
    ) -> Result<ValidationVerdict>
    where
        M: Send + Sync + 'static,
    {
        if validators.is_empty() {
            return Ok(ValidationVerdict::valid());
        }
        ctx.ensure_not_cancelled("validation.execute")?;

        let erased: &(dyn Any + Send + Sync) = message;
        let work = future::join_all(
            validators
                .iter()
                .map(|validator| validator.instance.validate_erased(ctx, erased)),
        );

        // join_all returns results in input order, which is registration
        // order here; completion timing cannot reorder them.
        let results = tokio::select! {
            () = ctx.cancelled() => {
                return Err(ErrorEnvelope::cancelled("call cancelled")
                    .with_metadata("operation", "validation.execute"));
            }
            results = work => results,
        };

        let mut lists = Vec::with_capacity(results.len());
        for (validator, result) in validators.iter().zip(results) {
            match result {
                Ok(failures) => lists.push(failures),
                Err(error) => return Err(self.crash(ctx, validator, error)),
            }
        }

        let verdict = ValidationVerdict::from_failure_lists(lists);
        if let Some(logger) = self.logger.as_ref() {
            logger.debug(
                "validation.execute.done",
                "Validator execution completed",
                Some(execute_fields(ctx, validators.len(), &verdict)),
            );
        }
        Ok(verdict)
    }

    fn crash(
        &self,
        ctx: &CallContext,
        validator: &ResolvedValidator,
        error: ErrorEnvelope,
    ) -> ErrorEnvelope {
        if error.is_cancelled() {
            return error;
        }

        let crashed = ErrorEnvelope::unexpected(
            ErrorCode::validator_crash(),
            format!("validator {} crashed", validator.validator),
            error.class,
        )
        .with_metadata("cause", error.message.clone())
        .with_metadata("correlation_id", ctx.correlation_id().as_str());

        if let Some(logger) = self.logger.as_ref() {
            let mut fields = LogFields::new();
            fields.insert(
                "validator".into(),
                validator.validator.type_name().into(),
            );
            fields.insert(
                "correlation_id".into(),
                ctx.correlation_id().as_str().into(),
            );
            logger.error(
                "validation.execute.crashed",
                &error.message,
                Some(fields),
            );
        }
        crashed
    }
}

impl fmt::Debug for ValidationExecutor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidationExecutor")
            .field("logging", &self.logger.is_some())
            .finish()
    }
}

fn execute_fields(
    ctx: &CallContext,
    validator_count: usize,
    verdict: &ValidationVerdict,
) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "correlation_id".into(),
        ctx.correlation_id().as_str().into(),
    );
    fields.insert("validators".into(), validator_count.into());
    fields.insert("failures".into(), verdict.failures().len().into());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use crate::resolver::ValidatorResolver;
    use grpc_validate_domain::{Failure, Lifetime, MessageKey};
    use grpc_validate_ports::{
        BoxFuture, ErasedInstance, InjectorPort, MessageValidator, ProviderPort, ServiceKey,
    };
    use std::future::ready;
    use std::time::Duration;

    struct Hello {
        name: String,
    }

    struct SlowNameCheck;

    impl MessageValidator<Hello> for SlowNameCheck {
        fn validate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            message: &'a Hello,
        ) -> BoxFuture<'a, Result<Vec<Failure>>> {
            let empty = message.name.is_empty();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(40)).await;
                if empty {
                    Ok(vec![Failure::new("name", "slow check failed")])
                } else {
                    Ok(Vec::new())
                }
            })
        }
    }

    struct FastNameCheck;

    impl MessageValidator<Hello> for FastNameCheck {
        fn validate<'a>(
            &'a self,
            _ctx: &'a CallContext,
            message: &'a Hello,
        ) -> BoxFuture<'a, Result<Vec<Failure>>> {
            let failures = if message.name.is_empty() {
                vec![Failure::new("name", "fast check failed")]
            } else {
                Vec::new()
            };
            Box::pin(ready(Ok(failures)))
        }
    }

    struct NullProvider;

    struct NullInjector;

    impl InjectorPort for NullInjector {
        fn resolve_any(&self, key: &ServiceKey) -> Result<ErasedInstance> {
            Err(ErrorEnvelope::invariant(
                ErrorCode::resolution(),
                format!("service not registered: {key}"),
            ))
        }
    }

    impl ProviderPort for NullProvider {
        fn root(&self) -> Arc<dyn InjectorPort> {
            Arc::new(NullInjector)
        }

        fn open_scope(&self) -> Arc<dyn InjectorPort> {
            Arc::new(NullInjector)
        }
    }

    async fn resolve_all(builder: RegistryBuilder) -> Vec<ResolvedValidator> {
        let resolver = ValidatorResolver::new(Arc::new(builder.freeze()), Arc::new(NullProvider));
        let scope = resolver.open_scope();
        match resolver.resolve(MessageKey::of::<Hello>(), &scope).await {
            Ok(resolved) => resolved,
            Err(error) => unreachable!("resolution must succeed in tests: {error}"),
        }
    }

    #[tokio::test]
    async fn no_validators_means_implicitly_valid() {
        let executor = ValidationExecutor::new();
        let ctx = CallContext::new_call();
        let message = Hello {
            name: String::new(),
        };

        let verdict = executor.execute(&ctx, &message, &[]).await;
        assert_eq!(verdict.map(|verdict| verdict.is_valid()), Ok(true));
    }

    #[tokio::test]
    async fn failure_order_follows_registration_not_completion() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_validator::<Hello, SlowNameCheck, _>(
                Lifetime::Singleton,
                |_| Ok(SlowNameCheck),
            );
        builder
            .register_validator::<Hello, FastNameCheck, _>(
                Lifetime::Singleton,
                |_| Ok(FastNameCheck),
            );
        let validators = resolve_all(builder).await;

        let executor = ValidationExecutor::new();
        let ctx = CallContext::new_call();
        let message = Hello {
            name: String::new(),
        };

        let verdict = executor.execute(&ctx, &message, &validators).await;
        let Ok(verdict) = verdict else {
            unreachable!("execution must succeed");
        };
        let messages: Vec<&str> = verdict
            .failures()
            .iter()
            .map(Failure::message)
            .collect();
        assert_eq!(messages, vec!["slow check failed", "fast check failed"]);
    }

    #[tokio::test]
    async fn validator_crash_propagates_as_fatal() {
        struct CrashingCheck;

        impl MessageValidator<Hello> for CrashingCheck {
            fn validate<'a>(
                &'a self,
                _ctx: &'a CallContext,
                _message: &'a Hello,
            ) -> BoxFuture<'a, Result<Vec<Failure>>> {
                Box::pin(ready(Err(ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    "store unavailable",
                    grpc_validate_shared::ErrorClass::Retriable,
                ))))
            }
        }

        let mut builder = RegistryBuilder::new();
        builder.register_validator::<Hello, CrashingCheck, _>(
            Lifetime::Singleton,
            |_| Ok(CrashingCheck),
        );
        let validators = resolve_all(builder).await;

        let executor = ValidationExecutor::new();
        let ctx = CallContext::new_call();
        let message = Hello {
            name: "ok".to_owned(),
        };

        let result = executor.execute(&ctx, &message, &validators).await;
        let Err(error) = result else {
            unreachable!("crash must propagate");
        };
        assert_eq!(error.code, ErrorCode::validator_crash());
        assert_eq!(
            error.metadata.get("cause").map(String::as_str),
            Some("store unavailable")
        );
    }

    #[tokio::test]
    async fn cancellation_interrupts_inflight_validation() {
        let mut builder = RegistryBuilder::new();
        builder.register_validator::<Hello, SlowNameCheck, _>(
            Lifetime::Singleton,
            |_| Ok(SlowNameCheck),
        );
        let validators = resolve_all(builder).await;

        let executor = ValidationExecutor::new();
        let ctx = CallContext::new_call();
        let message = Hello {
            name: String::new(),
        };

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            canceller.cancel();
        });

        let result = executor.execute(&ctx, &message, &validators).await;
        assert!(matches!(result, Err(ref error) if error.is_cancelled()));
    }
}
