//! Rejection-body formatter adapters.

use grpc_validate_domain::Failure;
use grpc_validate_ports::{BoxFuture, FailureFormatterPort};
use grpc_validate_shared::Result;
use std::future::ready;

/// Joins failures as `field: message` entries separated by `; `.
#[derive(Debug, Clone)]
pub struct JoinedFormatter {
    separator: Box<str>,
}

impl JoinedFormatter {
    /// Formatter with the default `; ` separator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            separator: "; ".into(),
        }
    }

    /// Override the separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<Box<str>>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for JoinedFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureFormatterPort for JoinedFormatter {
    fn format<'a>(&'a self, failures: &'a [Failure]) -> BoxFuture<'a, Result<Box<str>>> {
        let body = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&self.separator);
        Box::pin(ready(Ok(body.into_boxed_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn joins_failures_in_order() {
        let formatter = JoinedFormatter::new();
        let failures = vec![
            Failure::new("name", "must not be empty"),
            Failure::new("age", "must be positive"),
        ];

        let body = formatter.format(&failures).await;
        assert_eq!(
            body.as_deref(),
            Ok("name: must not be empty; age: must be positive")
        );
    }

    #[tokio::test]
    async fn empty_failure_list_formats_to_empty_body() {
        let formatter = JoinedFormatter::new().with_separator(", ");
        let body = formatter.format(&[]).await;
        assert_eq!(body.as_deref(), Ok(""));
    }
}
