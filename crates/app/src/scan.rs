//! Manifest scanning with per-entry failure isolation.

use crate::registry::RegistryBuilder;
use grpc_validate_ports::{
    DiscoveryIssue, DiscoveryReport, LogFields, LoggerPort, ValidatorManifest,
};

impl RegistryBuilder {
    /// Register every describable entry of a manifest.
    ///
    /// A failing entry is skipped and recorded in the report; it never aborts
    /// the scan or poisons its siblings. Skips are surfaced through the
    /// diagnostic channel (report + warn log), not as the scan's result.
    pub fn scan(
        &mut self,
        manifest: ValidatorManifest,
        logger: Option<&dyn LoggerPort>,
    ) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();

        for entry in manifest.into_entries() {
            match entry.describe() {
                Ok(descriptor) => {
                    self.register(
                        descriptor.message,
                        descriptor.validator,
                        descriptor.lifetime,
                        descriptor.factory,
                    );
                    if let Some(logger) = logger {
                        logger.debug(
                            "validation.scan.registered",
                            "Validator registered from manifest",
                            Some(scan_fields(entry.type_name())),
                        );
                    }
                    report.registered.push(entry.type_name().into());
                },
                Err(error) => {
                    if let Some(logger) = logger {
                        logger.warn(
                            "validation.scan.skipped",
                            &format!("Manifest entry skipped: {error}"),
                            Some(scan_fields(entry.type_name())),
                        );
                    }
                    report.skipped.push(DiscoveryIssue {
                        type_name: entry.type_name().into(),
                        error,
                    });
                },
            }
        }

        report
    }
}

fn scan_fields(type_name: &str) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("candidate".into(), type_name.into());
    fields
}
