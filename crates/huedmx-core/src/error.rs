//! Error types for rendering and configuration
use std::path::PathBuf;
use thiserror::Error;

/// A fixture could not be rendered from the light state it was given.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Colour fixture tracking a light without a usable gamut
    #[error("No gamut info for {fixture}, tracking light {light_id}")]
    MissingGamut { fixture: String, light_id: String },

    /// Colour fixture tracking a light that never reported a colour
    #[error("No colour info for {fixture}, tracking light {light_id}")]
    MissingColor { fixture: String, light_id: String },

    /// White LED temperature has no entry in the kelvin table
    #[error("No RGB reference for the {kelvin}K white LED of {fixture}")]
    UntabulatedWhite { fixture: String, kelvin: u32 },
}

/// Static configuration is unusable; the process cannot start.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing bridge setting: {0}")]
    MissingBridgeSetting(&'static str),

    #[error("Invalid pipeline setting: {0}")]
    InvalidPipeline(String),

    #[error("Fixture '{fixture}' has address {address}, must be between 1 and 512")]
    AddressOutOfRange { fixture: String, address: u16 },

    #[error("Fixture '{fixture}' at address {address} needs {channels} channels and runs past 512")]
    FootprintOutOfRange {
        fixture: String,
        address: u16,
        channels: usize,
    },

    #[error("Fixtures '{first}' and '{second}' occupy overlapping addresses")]
    AddressConflict { first: String, second: String },

    #[error("Fixture name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("Light id for fixture '{fixture}' cannot be found: {light_id}")]
    UnknownLight { fixture: String, light_id: String },

    #[error("No FTDI serial port found for the DMX bus")]
    NoSerialPort,
}
