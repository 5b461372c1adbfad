//! Result and error types for Showreel.

use thiserror::Error;

/// Result type for Showreel operations
pub type ShowreelResult<T> = Result<T, ShowreelError>;

/// Errors that can occur in Showreel
///
/// Every variant raised while a cycle is running counts as a cycle fault:
/// the scheduler logs it, backs off and starts the next cycle from a reset.
#[derive(Debug, Error)]
pub enum ShowreelError {
    /// Script failed validation
    #[error("Invalid script: {message}")]
    InvalidScript {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The presentation surface rejected an operation
    #[error("Presentation port error on {region}: {message}")]
    Port {
        /// Region or item the operation targeted
        region: String,
        /// Error message
        message: String,
    },

    /// Auto-filled contact form did not validate
    #[error("Invalid contact details: {message}")]
    InvalidContact {
        /// Error message
        message: String,
    },

    /// Booking flow reached an inconsistent state
    #[error("Booking flow error: {message}")]
    Booking {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShowreelError {
    /// Create an invalid script error
    #[must_use]
    pub fn invalid_script(message: impl Into<String>) -> Self {
        Self::InvalidScript {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a port error
    #[must_use]
    pub fn port(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Port {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Create an invalid contact error
    #[must_use]
    pub fn invalid_contact(message: impl Into<String>) -> Self {
        Self::InvalidContact {
            message: message.into(),
        }
    }

    /// Create a booking flow error
    #[must_use]
    pub fn booking(message: impl Into<String>) -> Self {
        Self::Booking {
            message: message.into(),
        }
    }
}
