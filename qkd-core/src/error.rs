// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Error types for the QKD toolkit
//!
//! Provides a unified error taxonomy using `thiserror` for ergonomic error handling.
//! A QBER computed over zero sifted positions is not an error: it is defined as `0.0`.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for QKD operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected before any simulation ran
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation requested in a state where its inputs are not meaningful
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error stems from invalid configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if error is a precondition the caller should report as a warning
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::Config("negative".into()).is_config_error());
        assert!(!Error::Config("negative".into()).is_precondition());
        assert!(Error::Precondition("run first".into()).is_precondition());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
