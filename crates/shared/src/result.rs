//! Result alias for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCode, ErrorEnvelope};

    #[test]
    fn result_defaults_to_envelope_error() {
        let failing: Result<u32> = Err(ErrorEnvelope::expected(
            ErrorCode::invalid_argument(),
            "bad input",
        ));
        assert!(failing.is_err());
    }
}
