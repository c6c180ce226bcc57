//! Per-call context: correlation identifiers and cooperative cancellation.
//!
//! Every intercepted call carries a [`CallContext`]. Validator execution and
//! formatter work observe its cancellation token so that a cancelled or
//! deadline-expired call never reaches the real handler.

use crate::{ErrorCode, ErrorEnvelope, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// A correlation identifier used for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Parse a correlation identifier from caller input.
    ///
    /// The value is trimmed; empty values are rejected.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_argument(),
                "correlation id must be non-empty",
            ));
        }
        Ok(Self(Arc::<str>::from(trimmed)))
    }

    /// Create a new call id, best-effort unique within this process.
    #[must_use]
    pub fn new_call_id() -> Self {
        let n = CALL_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let id: Box<str> = format!("call_{n}").into_boxed_str();
        Self(Arc::<str>::from(id))
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Call-scoped context passed across boundaries.
#[derive(Debug, Clone)]
pub struct CallContext {
    correlation_id: CorrelationId,
    cancellation: CancellationToken,
}

impl CallContext {
    /// Create a new context with a fresh cancellation token.
    #[must_use]
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            cancellation: CancellationToken::new(),
        }
    }

    /// Convenience constructor: create a context with an auto-generated `call_*` id.
    #[must_use]
    pub fn new_call() -> Self {
        Self::new(CorrelationId::new_call_id())
    }

    /// Create a context with an explicit cancellation token.
    ///
    /// Use this to tie validation to the host framework's deadline handling.
    #[must_use]
    pub const fn with_cancellation(
        correlation_id: CorrelationId,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            correlation_id,
            cancellation,
        }
    }

    /// Return the correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Return a clone of the cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns true if the call was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel this call.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Await cancellation.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Return a cancellation error when cancelled, including operation metadata.
    pub fn ensure_not_cancelled(&self, operation: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(
                ErrorEnvelope::cancelled("call cancelled").with_metadata("operation", operation)
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn correlation_id_rejects_empty_input() {
        assert!(CorrelationId::parse("  ").is_err());
        assert!(CorrelationId::parse("abc").is_ok());
    }

    #[test]
    fn call_ids_are_unique() {
        let first = CorrelationId::new_call_id();
        let second = CorrelationId::new_call_id();
        assert_ne!(first, second);
    }

    #[test]
    fn ensure_not_cancelled_reports_operation() {
        let ctx = CallContext::new_call();
        assert!(ctx.ensure_not_cancelled("validation.execute").is_ok());

        ctx.cancel();
        let error = ctx.ensure_not_cancelled("validation.execute").err();
        let Some(error) = error else {
            unreachable!("cancelled context must produce an error");
        };
        assert!(error.is_cancelled());
        assert_eq!(
            error.metadata.get("operation").map(String::as_str),
            Some("validation.execute")
        );
    }

    #[tokio::test]
    async fn cancellation_wakes_waiters() {
        let ctx = CallContext::new_call();
        let waiter = ctx.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        // The waiter should be blocked until the context is cancelled.
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();

        let woke = tokio::time::timeout(Duration::from_millis(100), handle).await;
        assert!(matches!(woke, Ok(Ok(true))));
    }
}
