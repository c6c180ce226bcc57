//! # grpc-validate-facade
//!
//! Facade API for integrators. Configure validation with
//! [`ValidationOptions`], enable it with [`enable_validation`], and wire the
//! returned [`ValidationInterceptor`] into your tonic service methods.
//!
//! ```
//! use grpc_validate_facade::{ValidationOptions, enable_validation, Failure};
//!
//! struct Hello {
//!     name: String,
//! }
//!
//! let options = ValidationOptions::new().add_inline::<Hello>(|message| {
//!     if message.name.trim().is_empty() {
//!         vec![Failure::new("name", "must not be empty")]
//!     } else {
//!         Vec::new()
//!     }
//! });
//! let (interceptor, report) = enable_validation(options);
//! assert!(report.is_clean());
//! # let _ = interceptor;
//! ```

use grpc_validate_app::{RegistryBuilder, ValidatorResolver};
use std::sync::Arc;

pub use grpc_validate_adapters::{
    JoinedFormatter, JsonLogger, LogSink, StaticProvider, StaticProviderBuilder, StderrSink,
};
pub use grpc_validate_app::{CallScope, ValidationExecutor, ValidationProfile};
pub use grpc_validate_domain::{
    BindingId, Failure, Lifetime, MessageKey, ServiceKey, ValidationVerdict,
};
pub use grpc_validate_interceptor::{ValidatedStream, ValidationInterceptor};
pub use grpc_validate_ports::{
    BoxFuture, DiscoveryIssue, DiscoveryReport, ErasedInstance, FailureFormatterPort,
    FormatterFactory, InjectorPort, LogEvent, LogFields, LogLevel, LoggerPort, ManifestEntry,
    MessageValidator, ProviderPort, ValidatorDescriptor, ValidatorFactory, ValidatorManifest,
    resolve_typed,
};
pub use grpc_validate_shared::{CallContext, CorrelationId, ErrorCode, ErrorEnvelope, Result};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Configuration surface for enabling validation.
///
/// Direct registrations (validators, inline rules, profiles) are applied in
/// call order. Manifests are scanned when validation is enabled, after the
/// direct registrations.
pub struct ValidationOptions {
    registry: RegistryBuilder,
    manifests: Vec<ValidatorManifest>,
    provider: Option<Arc<dyn ProviderPort>>,
    formatter: Option<FormatterFactory>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl ValidationOptions {
    /// Empty options: nothing registered, default provider and formatter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RegistryBuilder::new(),
            manifests: Vec::new(),
            provider: None,
            formatter: None,
            logger: None,
        }
    }

    /// Register a validator for the message type `M` with an explicit
    /// lifetime.
    #[must_use]
    pub fn add_validator<M, V, F>(mut self, lifetime: Lifetime, build: F) -> Self
    where
        M: Send + Sync + 'static,
        V: MessageValidator<M> + 'static,
        F: Fn(&dyn InjectorPort) -> Result<V> + Send + Sync + 'static,
    {
        self.registry.register_validator::<M, V, F>(lifetime, build);
        self
    }

    /// Register a validator with the default Scoped lifetime.
    #[must_use]
    pub fn add_scoped_validator<M, V, F>(self, build: F) -> Self
    where
        M: Send + Sync + 'static,
        V: MessageValidator<M> + 'static,
        F: Fn(&dyn InjectorPort) -> Result<V> + Send + Sync + 'static,
    {
        self.add_validator::<M, V, F>(Lifetime::Scoped, build)
    }

    /// Register an inline rule closure for the message type `M`.
    ///
    /// Inline validators are always Singleton; there is no lifetime to
    /// choose.
    #[must_use]
    pub fn add_inline<M>(
        mut self,
        rules: impl Fn(&M) -> Vec<Failure> + Send + Sync + 'static,
    ) -> Self
    where
        M: Send + Sync + 'static,
    {
        self.registry.register_inline::<M>(rules);
        self
    }

    /// Merge a buffered profile.
    #[must_use]
    pub fn add_profile(mut self, profile: ValidationProfile) -> Self {
        self.registry.merge(profile);
        self
    }

    /// Queue a manifest for scanning at enable time.
    #[must_use]
    pub fn scan(mut self, manifest: ValidatorManifest) -> Self {
        self.manifests.push(manifest);
        self
    }

    /// Use the host's dependency container instead of the built-in static
    /// provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ProviderPort>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Plug in a rejection-body formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterFactory) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Attach a structured logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the interceptor from options.
///
/// Scans queued manifests, freezes the registry, and wires the resolver and
/// interceptor together. The returned report covers every queued manifest;
/// skipped entries are diagnostics, never a reason to fail startup.
#[must_use]
pub fn enable_validation(options: ValidationOptions) -> (ValidationInterceptor, DiscoveryReport) {
    let ValidationOptions {
        mut registry,
        manifests,
        provider,
        formatter,
        logger,
    } = options;

    let mut report = DiscoveryReport::default();
    for manifest in manifests {
        report.extend(registry.scan(manifest, logger.as_deref()));
    }

    let provider = provider.unwrap_or_else(|| StaticProviderBuilder::new().build());
    let resolver = Arc::new(ValidatorResolver::new(Arc::new(registry.freeze()), provider));

    let mut interceptor = ValidationInterceptor::new(resolver);
    if let Some(formatter) = formatter {
        interceptor = interceptor.with_formatter(formatter);
    }
    if let Some(logger) = logger {
        interceptor = interceptor.with_logger(logger);
    }
    (interceptor, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grpc_validate_shared::{ErrorCode, ErrorEnvelope};
    use tonic::{Code, Request, Response, Status};

    #[derive(Clone)]
    struct Hello {
        name: String,
    }

    fn name_not_empty(message: &Hello) -> Vec<Failure> {
        if message.name.trim().is_empty() {
            vec![Failure::new("name", "must not be empty")]
        } else {
            Vec::new()
        }
    }

    async fn greet(request: Request<Hello>) -> Result<Response<String>, Status> {
        Ok(Response::new(format!("hello, {}", request.into_inner().name)))
    }

    #[tokio::test]
    async fn enabled_validation_gates_unary_calls() {
        let options = ValidationOptions::new().add_inline::<Hello>(name_not_empty);
        let (interceptor, report) = enable_validation(options);
        assert!(report.is_clean());

        let ctx = CallContext::new_call();
        let rejected = interceptor
            .intercept_unary(
                &ctx,
                Request::new(Hello {
                    name: String::new(),
                }),
                greet,
            )
            .await;
        assert!(matches!(
            rejected,
            Err(ref status) if status.code() == Code::InvalidArgument
        ));

        let forwarded = interceptor
            .intercept_unary(
                &ctx,
                Request::new(Hello {
                    name: "world".to_owned(),
                }),
                greet,
            )
            .await;
        assert!(forwarded.is_ok());
    }

    #[tokio::test]
    async fn queued_manifests_are_scanned_at_enable_time() {
        let manifest = ValidatorManifest::new().with_entry(ManifestEntry::new("Broken", || {
            Err(ErrorEnvelope::invariant(
                ErrorCode::discovery(),
                "candidate declares no message type",
            ))
        }));

        let options = ValidationOptions::new()
            .add_inline::<Hello>(name_not_empty)
            .scan(manifest);
        let (_, report) = enable_validation(options);

        assert_eq!(report.skipped.len(), 1);
        assert!(report.registered.is_empty());
    }
}
