//! # grpc-validate-domain
//!
//! Validation data model for the grpc-validate workspace: failures, verdicts,
//! lifetimes, and the identity keys used to look validators up at runtime.
//!
//! Types here are plain values. The dispatch behavior built on top of them
//! lives in `grpc-validate-app`.

pub mod failure;
pub mod keys;
pub mod lifetime;
pub mod verdict;

pub use failure::Failure;
pub use keys::{BindingId, MessageKey, ServiceKey};
pub use lifetime::Lifetime;
pub use verdict::ValidationVerdict;

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
