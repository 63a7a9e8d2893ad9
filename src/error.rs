//! Error module for the Rusty LIF library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum LifError {
    /// Error for invalid parameters, e.g., non-positive membrane time constant or time step.
    InvalidParameters(String),
    /// Error for a membrane potential leaving the guard interval during a simulation run.
    VoltageOutOfBounds { step: usize, voltage: f64 },
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for LifError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LifError::InvalidParameters(e) => write!(f, "Invalid parameters: {}", e),
            LifError::VoltageOutOfBounds { step, voltage } => write!(
                f,
                "Voltage out of bounds at step {}: v={}, consider reducing the time step or the input strength",
                step, voltage
            ),
            LifError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for LifError {}
