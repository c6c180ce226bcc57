//! # grpc-validate-interceptor
//!
//! The tonic call wrapper: extracts the request message, runs the validation
//! dispatch core, and either short-circuits the call with an
//! `invalid argument` status or forwards the unmodified request to the real
//! handler. Unary and request-streaming calls are gated uniformly.

pub mod interceptor;
pub mod status;
pub mod stream;

pub use interceptor::ValidationInterceptor;
pub use status::{map_envelope_to_status, rejection_status};
pub use stream::ValidatedStream;

/// Returns the interceptor crate version.
#[must_use]
pub const fn interceptor_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
