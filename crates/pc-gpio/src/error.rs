//! Error types for line control

use thiserror::Error;

/// Errors that can occur while driving control lines
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Level vector length does not match the handle
    #[error("invalid arity: handle has {expected} lines, got {actual} levels")]
    InvalidArity { expected: usize, actual: usize },

    /// Value does not fit in the serial mux selector width
    #[error("value {value} does not fit in {bits} bits")]
    EncodingOverflow { value: u8, bits: usize },

    /// Pin is outside the GPO register
    #[error("pin {pin} outside {width}-bit GPO register")]
    PinOutOfRange { pin: u8, width: u8 },

    /// Underlying chip, bus or register device could not be reached
    #[error("{resource} unavailable: {reason}")]
    BackendUnavailable { resource: String, reason: String },
}

impl LineError {
    /// Create a [`LineError::BackendUnavailable`]
    pub fn unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Check a level vector against a handle's arity
pub(crate) fn check_arity(expected: usize, levels: &[u8]) -> Result<(), LineError> {
    if levels.len() != expected {
        return Err(LineError::InvalidArity {
            expected,
            actual: levels.len(),
        });
    }
    Ok(())
}
