//! Hue-DMX Core - Domain Model
//!
//! This crate contains the pure part of the Hue to DMX bridge:
//! - Colour conversion from CIE `xy` chromaticity to RGB / RGBW / HSI
//! - Light state with partial-update merge semantics
//! - Fixture models and their frame renderers
//! - Static configuration and its validation

pub mod color;
pub mod config;
pub mod error;
pub mod fixture;
pub mod light;
pub mod logging;

pub use color::{Gamut, Hsi, Rgb, Rgbw, XyPoint};
pub use config::{AppConfig, BridgeConfig, DmxConfig, FixtureConfig, PipelineConfig};
pub use error::{ConfigError, RenderError};
pub use fixture::{Fixture, FixtureKind, Frame};
pub use light::{GamutReport, LightState, LightUpdate};
pub use logging::LogConfig;
