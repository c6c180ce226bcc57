//! # grpc-validate-app
//!
//! The validation dispatch core: the mapping from a runtime message type to
//! its validator instances, the lifetime discipline for resolving them, and
//! the execution rule that combines their results.
//!
//! - [`RegistryBuilder`] / [`ValidatorRegistry`] - message-type → bindings,
//!   construct-then-freeze
//! - [`ValidatorResolver`] / [`CallScope`] - live instances per call,
//!   honoring Transient/Scoped/Singleton lifetimes
//! - [`ValidationExecutor`] - concurrent execution with deterministic
//!   failure ordering
//! - [`ValidationProfile`] - buffered registration batches
//! - manifest scanning with per-entry failure isolation

pub mod executor;
pub mod profile;
pub mod registry;
pub mod resolver;
mod scan;

pub use executor::ValidationExecutor;
pub use profile::ValidationProfile;
pub use registry::{RegistryBuilder, ValidatorBinding, ValidatorRegistry};
pub use resolver::{CallScope, ResolvedValidator, ValidatorResolver};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
