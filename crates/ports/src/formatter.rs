//! Rejection-body formatting boundary contract.

use crate::BoxFuture;
use crate::provider::InjectorPort;
use grpc_validate_domain::Failure;
use grpc_validate_shared::Result;
use std::sync::Arc;

/// Converts an ordered failure list into a single display string.
///
/// The formatter may perform asynchronous work (e.g. message catalogues) and
/// may depend on call-scoped services: it is constructed against the same
/// scope injector as the call's validators.
pub trait FailureFormatterPort: Send + Sync {
    /// Produce the rejection body for the given failures.
    fn format<'a>(&'a self, failures: &'a [Failure]) -> BoxFuture<'a, Result<Box<str>>>;
}

/// Factory constructing a formatter against the call scope.
pub type FormatterFactory =
    Arc<dyn Fn(&dyn InjectorPort) -> Result<Arc<dyn FailureFormatterPort>> + Send + Sync>;
