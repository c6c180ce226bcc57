//! The validation call wrapper.
//!
//! Per call the interceptor walks a small state machine: extract the request
//! message, resolve and execute the bound validators, then either reject the
//! call with an `invalid argument` status or forward the original, unmodified
//! request to the real handler. Request-streaming calls gate every inbound
//! message through the same machine (see [`crate::stream`]).

use crate::status::{map_envelope_to_status, rejection_status};
use crate::stream::{StreamGate, ValidatedStream};
use futures_util::Stream;
use grpc_validate_app::{CallScope, ValidationExecutor, ValidatorResolver};
use grpc_validate_domain::{Failure, MessageKey, ValidationVerdict};
use grpc_validate_ports::{
    BoxFuture, FailureFormatterPort, FormatterFactory, LogFields, LoggerPort,
};
use grpc_validate_shared::{CallContext, ErrorEnvelope, Result as SharedResult};
use std::future::{Future, ready};
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// Formatter used when the integrator plugs nothing in: the rejection body
/// stays empty and the caller only sees the status code.
struct DefaultBody;

impl FailureFormatterPort for DefaultBody {
    fn format<'a>(&'a self, _failures: &'a [Failure]) -> BoxFuture<'a, SharedResult<Box<str>>> {
        Box::pin(ready(Ok("".into())))
    }
}

fn default_formatter() -> FormatterFactory {
    Arc::new(|_| {
        let formatter: Arc<dyn FailureFormatterPort> = Arc::new(DefaultBody);
        Ok(formatter)
    })
}

/// Wires the validation dispatch core into tonic calls.
#[derive(Clone)]
pub struct ValidationInterceptor {
    resolver: Arc<ValidatorResolver>,
    executor: ValidationExecutor,
    formatter: FormatterFactory,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl ValidationInterceptor {
    /// Create an interceptor over a resolver, with the default (empty-body)
    /// rejection formatter and no logging.
    #[must_use]
    pub fn new(resolver: Arc<ValidatorResolver>) -> Self {
        Self {
            resolver,
            executor: ValidationExecutor::new(),
            formatter: default_formatter(),
            logger: None,
        }
    }

    /// Plug in a rejection-body formatter.
    ///
    /// The factory runs against the call scope, so the formatter may depend
    /// on call-scoped services.
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterFactory) -> Self {
        self.formatter = formatter;
        self
    }

    /// Attach a structured logger to the interceptor and its executor.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.executor = self.executor.with_logger(Arc::clone(&logger));
        self.logger = Some(logger);
        self
    }

    /// Gate a unary call.
    ///
    /// On a valid verdict the original request is forwarded to `handler`
    /// unmodified. On an invalid verdict the handler is never invoked and the
    /// caller receives `invalid argument` with the formatter's body.
    /// Resolution failures and validator crashes surface as internal errors.
    pub async fn intercept_unary<M, R, F, Fut>(
        &self,
        ctx: &CallContext,
        request: Request<M>,
        handler: F,
    ) -> Result<Response<R>, Status>
    where
        M: Send + Sync + 'static,
        F: FnOnce(Request<M>) -> Fut,
        Fut: Future<Output = Result<Response<R>, Status>>,
    {
        let scope = self.resolver.open_scope();
        let verdict = self
            .validate(ctx, &scope, request.get_ref())
            .await
            .map_err(|error| self.fail(ctx, error))?;

        if verdict.is_valid() {
            if let Some(logger) = self.logger.as_ref() {
                logger.debug(
                    "validation.call.forwarded",
                    "Message passed validation",
                    Some(call_fields(ctx, MessageKey::of::<M>(), None)),
                );
            }
            return handler(request).await;
        }

        let body = self
            .format(&scope, verdict.failures())
            .await
            .map_err(|error| self.fail(ctx, error))?;
        if let Some(logger) = self.logger.as_ref() {
            logger.info(
                "validation.call.rejected",
                "Message failed validation",
                Some(call_fields(
                    ctx,
                    MessageKey::of::<M>(),
                    Some(verdict.failures().len()),
                )),
            );
        }
        Err(rejection_status(&body))
    }

    /// Gate a request-streaming call.
    ///
    /// Each inbound message is validated before it is handed to the handler's
    /// stream. The first invalid message terminates the stream with a
    /// rejection status: later messages are never read, and messages already
    /// forwarded are not retracted.
    pub fn intercept_streaming<M, S>(
        &self,
        ctx: CallContext,
        request: Request<S>,
    ) -> Request<ValidatedStream<M, S>>
    where
        M: Send + Sync + 'static,
        S: Stream<Item = Result<M, Status>>,
    {
        let (metadata, extensions, inner) = request.into_parts();
        let gate = StreamGate::new(
            Arc::clone(&self.resolver),
            self.executor.clone(),
            Arc::clone(&self.formatter),
            self.logger.clone(),
            ctx,
            self.resolver.open_scope(),
        );
        Request::from_parts(metadata, extensions, ValidatedStream::new(inner, gate))
    }

    async fn validate<M>(
        &self,
        ctx: &CallContext,
        scope: &CallScope,
        message: &M,
    ) -> SharedResult<ValidationVerdict>
    where
        M: Send + Sync + 'static,
    {
        let validators = self.resolver.resolve(MessageKey::of::<M>(), scope).await?;
        self.executor.execute(ctx, message, &validators).await
    }

    async fn format(
        &self,
        scope: &CallScope,
        failures: &[Failure],
    ) -> SharedResult<Box<str>> {
        let formatter = (self.formatter)(scope.injector())?;
        formatter.format(failures).await
    }

    fn fail(&self, ctx: &CallContext, error: ErrorEnvelope) -> Status {
        if let Some(logger) = self.logger.as_ref() {
            let mut fields = LogFields::new();
            fields.insert(
                "correlation_id".into(),
                ctx.correlation_id().as_str().into(),
            );
            fields.insert("code".into(), error.code.to_string().into());
            logger.error("validation.call.failed", &error.message, Some(fields));
        }
        map_envelope_to_status(&error)
    }
}

fn call_fields(ctx: &CallContext, message: MessageKey, failures: Option<usize>) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "correlation_id".into(),
        ctx.correlation_id().as_str().into(),
    );
    fields.insert("message_type".into(), message.type_name().into());
    if let Some(failures) = failures {
        fields.insert("failures".into(), failures.into());
    }
    fields
}
