//! Error types for Wiggum
//!
//! Centralized error handling using thiserror. Only ledger and setup failures
//! live here; per-invocation failures are `InvocationError` in the invoker module
//! because they never abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal error types that can occur in Wiggum
#[derive(Debug, Error)]
pub enum WiggumError {
    /// Ledger document does not exist at the expected location
    #[error("Ledger not found: {}", .0.display())]
    LedgerMissing(PathBuf),

    /// Ledger document exists but is not a usable structured document
    #[error("Ledger malformed: {}: {reason}", path.display())]
    LedgerMalformed { path: PathBuf, reason: String },

    /// Work-group selector is empty or escapes the work root
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Configuration values that cannot drive a run
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WiggumError {
    /// Returns true for a missing or malformed ledger
    pub fn is_ledger_error(&self) -> bool {
        matches!(self, WiggumError::LedgerMissing(_) | WiggumError::LedgerMalformed { .. })
    }
}

/// Result type alias for Wiggum operations
pub type Result<T> = std::result::Result<T, WiggumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_missing_error() {
        let err = WiggumError::LedgerMissing(PathBuf::from(".wiggum/auth/prd.json"));
        assert_eq!(err.to_string(), "Ledger not found: .wiggum/auth/prd.json");
        assert!(err.is_ledger_error());
    }

    #[test]
    fn test_ledger_malformed_error() {
        let err = WiggumError::LedgerMalformed {
            path: PathBuf::from("prd.json"),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ledger malformed: prd.json: expected value at line 1 column 1"
        );
        assert!(err.is_ledger_error());
    }

    #[test]
    fn test_invalid_selector_error() {
        let err = WiggumError::InvalidSelector("../etc".to_string());
        assert_eq!(err.to_string(), "Invalid selector: ../etc");
        assert!(!err.is_ledger_error());
    }

    #[test]
    fn test_invalid_config_error() {
        let err = WiggumError::InvalidConfig("sentinel must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid config: sentinel must not be empty");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: WiggumError = io_err.into();
        assert!(matches!(err, WiggumError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
