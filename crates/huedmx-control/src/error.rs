//! Error types for the control system
use crate::hue::HueError;
use huedmx_core::{ConfigError, RenderError};
use thiserror::Error;

/// How an error should be handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bridge or bus unreachable; the next attempt may succeed
    TransientConnectivity,
    /// A single event or light state could not be used; drop that unit of work
    MalformedInput,
    /// Startup configuration is wrong; the process must exit
    Configuration,
    /// Bus timing or write failure; the next mirrored update heals it
    ProtocolFraming,
}

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Hue bridge error
    #[error("Hue error: {0}")]
    Hue(#[from] HueError),

    /// Fixture could not be rendered
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Static configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serial port could not be opened or enumerated
    #[error("DMX port unavailable: {0}")]
    PortUnavailable(#[from] serialport::Error),

    /// Break or packet write failed on an open port
    #[error("DMX framing error: {0}")]
    Framing(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Frame does not fit in the universe at this address
    #[error("DMX address {address} with {len} channels is outside 1..=512")]
    AddressOutOfRange { address: u16, len: usize },

    /// Background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl ControlError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ControlError::Hue(e) => e.class(),
            ControlError::Render(_) => ErrorClass::MalformedInput,
            ControlError::Config(_) | ControlError::AddressOutOfRange { .. } => {
                ErrorClass::Configuration
            }
            ControlError::PortUnavailable(_) => ErrorClass::TransientConnectivity,
            ControlError::Framing(_) | ControlError::IoError(_) | ControlError::Task(_) => {
                ErrorClass::ProtocolFraming
            }
        }
    }

    /// Only configuration errors stop the process
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let render = ControlError::Render(RenderError::MissingGamut {
            fixture: "Spot".to_string(),
            light_id: "l1".to_string(),
        });
        assert_eq!(render.class(), ErrorClass::MalformedInput);
        assert!(!render.is_fatal());

        let config = ControlError::Config(ConfigError::NoSerialPort);
        assert!(config.is_fatal());

        let framing = ControlError::Framing("break failed".to_string());
        assert_eq!(framing.class(), ErrorClass::ProtocolFraming);

        let timeout = ControlError::Hue(HueError::StreamClosed);
        assert_eq!(timeout.class(), ErrorClass::TransientConnectivity);
    }
}
