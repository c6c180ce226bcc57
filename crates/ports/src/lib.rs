//! # grpc-validate-ports
//!
//! Boundary traits for the grpc-validate hexagonal architecture.
//!
//! This crate defines the interfaces between the dispatch core and its
//! external collaborators: validator implementations, the host dependency
//! container, failure formatters, structured logging, and the discovery
//! manifest. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// We deliberately use boxed futures for boundary traits (I/O-bound work);
/// validator bodies may suspend on external stores without blocking peers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod discovery;
pub mod formatter;
pub mod logger;
pub mod provider;
pub mod validator;

pub use discovery::*;
pub use formatter::*;
pub use logger::*;
pub use provider::*;
pub use validator::*;

// Re-export the domain types used in port signatures, so adapter crates can
// implement ports without directly depending on `grpc-validate-domain`.
pub use grpc_validate_domain::{BindingId, Failure, Lifetime, MessageKey, ServiceKey};

#[cfg(test)]
mod tests {
    use super::*;
    use grpc_validate_domain::domain_crate_version;
    use grpc_validate_shared::shared_crate_version;

    #[test]
    fn ports_crate_compiles() {
        let version = ports_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
