//! Mapping from the shared error envelope onto the transport status surface.

use grpc_validate_shared::ErrorEnvelope;
use tonic::Status;

/// Build the rejection status for an invalid message.
///
/// The body is whatever the formatter produced; the default formatter
/// produces an empty body, so the caller only sees the status code.
#[must_use]
pub fn rejection_status(body: &str) -> Status {
    Status::invalid_argument(body)
}

/// Map a non-validation envelope onto a transport status.
///
/// Everything that is not a validation rejection is either a cancellation or
/// an internal/configuration failure: resolution errors and validator crashes
/// must surface loudly, never as a pass and never as `invalid argument`.
#[must_use]
pub fn map_envelope_to_status(error: &ErrorEnvelope) -> Status {
    if error.is_cancelled() {
        return Status::cancelled(error.message.clone());
    }
    Status::internal(error.message.clone())
}
