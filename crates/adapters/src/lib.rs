//! # grpc-validate-adapters
//!
//! Default implementations of the grpc-validate ports:
//!
//! - [`StaticProvider`] - an in-memory dependency container with scoped
//!   acquisition, for hosts without their own container
//! - [`JoinedFormatter`] - a simple "field: message" rejection-body formatter
//! - [`JsonLogger`] - structured JSON logging to a pluggable sink

pub mod formatter;
pub mod logger;
pub mod provider;

pub use formatter::JoinedFormatter;
pub use logger::{JsonLogger, LogSink, StderrSink};
pub use provider::{StaticProvider, StaticProviderBuilder};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
