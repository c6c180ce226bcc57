//! Instance-reuse policy for container-resolved services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Governs how often a validator (or other container service) is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifetime {
    /// A fresh instance per use.
    Transient,
    /// One instance per call scope, reused within the call.
    Scoped,
    /// One instance for the process lifetime, shared across all calls.
    ///
    /// Singleton instances are shared concurrently and must be stateless or
    /// internally thread-safe. That contract binds validator authors; the
    /// dispatch core only guarantees single-flight construction.
    Singleton,
}

impl Lifetime {
    /// Stable identifier string, used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Scoped => "scoped",
            Self::Singleton => "singleton",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_displays_stable_names() {
        assert_eq!(Lifetime::Transient.to_string(), "transient");
        assert_eq!(Lifetime::Scoped.to_string(), "scoped");
        assert_eq!(Lifetime::Singleton.to_string(), "singleton");
    }
}
