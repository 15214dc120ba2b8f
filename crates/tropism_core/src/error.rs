//! Error types for the orchestration engine.
//!
//! Fatal configuration problems surface as `EngineError`; transient
//! conditions (shutdown, pause, try-termination) are flags, not errors,
//! and collaborator failures are boolean returns logged by their callers.

use thiserror::Error;

/// Main error type for engine configuration and initialization.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A world was registered without an evolution algorithm.
    #[error("world `{0}` has no evolution algorithm")]
    MissingEvolutionAlgorithm(String),

    /// The orchestrator was used before (re-)initialization.
    #[error("orchestrator is not initialized")]
    NotInitialized,

    /// A value path resolved to a different variant than requested.
    #[error("value `{path}` is not of type {expected}")]
    ValueType {
        path: String,
        expected: &'static str,
    },

    /// A required value path is not registered.
    #[error("value `{0}` is not registered")]
    UnknownValue(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::MissingEvolutionAlgorithm("main".to_string());
        assert_eq!(err.to_string(), "world `main` has no evolution algorithm");
    }

    #[test]
    fn test_value_type_display() {
        let err = EngineError::ValueType {
            path: "/control/pause".to_string(),
            expected: "bool",
        };
        assert!(err.to_string().contains("/control/pause"));
        assert!(err.to_string().contains("bool"));
    }
}
