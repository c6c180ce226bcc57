//! Validator discovery manifest.
//!
//! There is no runtime reflection scan: the integrator supplies a manifest of
//! validator candidates built at compile time. Describing one candidate may
//! fail independently (bad wiring, unsupported lifetime) without poisoning the
//! rest of the scan.

use crate::validator::ValidatorFactory;
use grpc_validate_domain::{Lifetime, MessageKey, ServiceKey};
use grpc_validate_shared::{ErrorEnvelope, Result};
use std::fmt;

/// A fully-described validator candidate produced by a manifest entry.
pub struct ValidatorDescriptor {
    /// Validator type identity.
    pub validator: ServiceKey,
    /// Message type the validator inspects.
    pub message: MessageKey,
    /// Requested instance lifetime.
    pub lifetime: Lifetime,
    /// Constructor against an injector.
    pub factory: ValidatorFactory,
}

impl fmt::Debug for ValidatorDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ValidatorDescriptor")
            .field("validator", &self.validator)
            .field("message", &self.message)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// One manifest candidate. Describing it is fallible per candidate.
pub struct ManifestEntry {
    type_name: Box<str>,
    describe: Box<dyn Fn() -> Result<ValidatorDescriptor> + Send + Sync>,
}

impl ManifestEntry {
    /// Create an entry from a candidate type name and a describe function.
    pub fn new(
        type_name: impl Into<Box<str>>,
        describe: impl Fn() -> Result<ValidatorDescriptor> + Send + Sync + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            describe: Box::new(describe),
        }
    }

    /// Candidate type name, used in scan diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Describe the candidate, producing its registration descriptor.
    pub fn describe(&self) -> Result<ValidatorDescriptor> {
        (self.describe)()
    }
}

impl fmt::Debug for ManifestEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ManifestEntry")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Caller-supplied validator catalogue, replacing runtime reflection scans.
#[derive(Debug, Default)]
pub struct ValidatorManifest {
    entries: Vec<ManifestEntry>,
}

impl ValidatorManifest {
    /// An empty manifest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a candidate entry.
    #[must_use]
    pub fn with_entry(mut self, entry: ManifestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Borrow the candidate entries.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Consume the manifest, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }
}

/// Reason a manifest entry was skipped during a scan.
#[derive(Debug)]
pub struct DiscoveryIssue {
    /// Candidate type name.
    pub type_name: Box<str>,
    /// The describe error.
    pub error: ErrorEnvelope,
}

/// Outcome of a manifest scan.
///
/// Per-entry failures never abort the scan; they are collected here and
/// reported after the scan completes.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Type names registered successfully, in scan order.
    pub registered: Vec<Box<str>>,
    /// Entries skipped, with reasons.
    pub skipped: Vec<DiscoveryIssue>,
}

impl DiscoveryReport {
    /// Returns true when no entry was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Fold another report into this one, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.registered.extend(other.registered);
        self.skipped.extend(other.skipped);
    }
}
