//! Per-message gating for request-streaming calls.
//!
//! Each inbound message passes through validate-then-yield before the handler
//! sees it. The first invalid message yields the rejection status and fuses
//! the stream: later messages are never pulled from the inner stream, and
//! messages already yielded are not retracted. Validation is a pure gate, not
//! a transactional boundary.

use crate::status::{map_envelope_to_status, rejection_status};
use futures_util::Stream;
use grpc_validate_app::{CallScope, ValidationExecutor, ValidatorResolver};
use grpc_validate_domain::{Failure, MessageKey};
use grpc_validate_ports::{BoxFuture, FormatterFactory, LogFields, LoggerPort};
use grpc_validate_shared::{CallContext, ErrorEnvelope, Result as SharedResult};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tonic::Status;

/// Shared per-call gate state.
///
/// The call scope lives here, so scoped validator and formatter instances are
/// reused across the stream's messages and released when the stream drops.
pub(crate) struct StreamGate {
    resolver: Arc<ValidatorResolver>,
    executor: ValidationExecutor,
    formatter: FormatterFactory,
    logger: Option<Arc<dyn LoggerPort>>,
    ctx: CallContext,
    scope: CallScope,
}

impl StreamGate {
    pub(crate) fn new(
        resolver: Arc<ValidatorResolver>,
        executor: ValidationExecutor,
        formatter: FormatterFactory,
        logger: Option<Arc<dyn LoggerPort>>,
        ctx: CallContext,
        scope: CallScope,
    ) -> Self {
        Self {
            resolver,
            executor,
            formatter,
            logger,
            ctx,
            scope,
        }
    }
}

enum StepOutcome<M> {
    /// The message passed validation; hand it to the handler.
    Forward(M),
    /// The message failed validation; terminate with the rejection status.
    Reject(Status),
    /// Resolution/execution/formatting failed; terminate with that status.
    Fail(Status),
}

async fn gate_message<M>(gate: Arc<StreamGate>, message: M) -> StepOutcome<M>
where
    M: Send + Sync + 'static,
{
    let key = MessageKey::of::<M>();
    let validators = match gate.resolver.resolve(key, &gate.scope).await {
        Ok(validators) => validators,
        Err(error) => return StepOutcome::Fail(fail(&gate, &error)),
    };

    let verdict = match gate.executor.execute(&gate.ctx, &message, &validators).await {
        Ok(verdict) => verdict,
        Err(error) => return StepOutcome::Fail(fail(&gate, &error)),
    };

    if verdict.is_valid() {
        return StepOutcome::Forward(message);
    }

    let body = match format_body(&gate, verdict.failures()).await {
        Ok(body) => body,
        Err(error) => return StepOutcome::Fail(fail(&gate, &error)),
    };
    if let Some(logger) = gate.logger.as_ref() {
        logger.info(
            "validation.stream.rejected",
            "Stream message failed validation; terminating stream",
            Some(stream_fields(&gate.ctx, key, verdict.failures().len())),
        );
    }
    StepOutcome::Reject(rejection_status(&body))
}

async fn format_body(gate: &StreamGate, failures: &[Failure]) -> SharedResult<Box<str>> {
    let formatter = (gate.formatter)(gate.scope.injector())?;
    formatter.format(failures).await
}

fn fail(gate: &StreamGate, error: &ErrorEnvelope) -> Status {
    if let Some(logger) = gate.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert(
            "correlation_id".into(),
            gate.ctx.correlation_id().as_str().into(),
        );
        fields.insert("code".into(), error.code.to_string().into());
        logger.error("validation.stream.failed", &error.message, Some(fields));
    }
    map_envelope_to_status(error)
}

fn stream_fields(ctx: &CallContext, message: MessageKey, failures: usize) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "correlation_id".into(),
        ctx.correlation_id().as_str().into(),
    );
    fields.insert("message_type".into(), message.type_name().into());
    fields.insert("failures".into(), failures.into());
    fields
}

enum StreamState<M> {
    /// Waiting for the next inbound message.
    Pulling,
    /// A message is being validated.
    Validating(BoxFuture<'static, StepOutcome<M>>),
    /// Terminated: rejection yielded, inner error passed through, or the
    /// inner stream ended.
    Done,
}

/// A request stream whose messages are validated before the handler sees
/// them.
pub struct ValidatedStream<M, S> {
    inner: S,
    gate: Arc<StreamGate>,
    state: StreamState<M>,
}

impl<M, S> ValidatedStream<M, S> {
    pub(crate) fn new(inner: S, gate: StreamGate) -> Self {
        Self {
            inner,
            gate: Arc::new(gate),
            state: StreamState::Pulling,
        }
    }
}

impl<M, S> Stream for ValidatedStream<M, S>
where
    M: Send + Sync + 'static,
    S: Stream<Item = Result<M, Status>> + Unpin,
{
    type Item = Result<M, Status>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                StreamState::Done => return Poll::Ready(None),
                StreamState::Validating(step) => match step.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(StepOutcome::Forward(message)) => {
                        this.state = StreamState::Pulling;
                        return Poll::Ready(Some(Ok(message)));
                    },
                    Poll::Ready(StepOutcome::Reject(status) | StepOutcome::Fail(status)) => {
                        this.state = StreamState::Done;
                        return Poll::Ready(Some(Err(status)));
                    },
                },
                StreamState::Pulling => match Pin::new(&mut this.inner).poll_next(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(None) => {
                        this.state = StreamState::Done;
                        return Poll::Ready(None);
                    },
                    Poll::Ready(Some(Err(status))) => {
                        this.state = StreamState::Done;
                        return Poll::Ready(Some(Err(status)));
                    },
                    Poll::Ready(Some(Ok(message))) => {
                        this.state = StreamState::Validating(Box::pin(gate_message(
                            Arc::clone(&this.gate),
                            message,
                        )));
                    },
                },
            }
        }
    }
}
