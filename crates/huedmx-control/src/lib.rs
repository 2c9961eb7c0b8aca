//! Hue-DMX Control - Bridge and Bus Integration
//!
//! This crate connects the pure domain model in `huedmx-core` to the outside world:
//! - **Hue**: CLIP v2 REST client and the server-sent event feed
//! - **DMX**: the 513-byte universe and its RS-485 serial transport
//! - **Pipeline**: debounced change aggregation and bounded update scheduling
//!
//! ## Modules
//!
//! - [`hue`] - Philips Hue bridge client and events
//! - [`dmx`] - DMX512 output over a serial adapter
//! - [`pipeline`] - Aggregator, fixture registry and scheduler
//! - [`error`] - Error types

#![allow(missing_docs)]

/// DMX output
pub mod dmx;
/// Error types
pub mod error;
/// Philips Hue integration
pub mod hue;
/// Event-to-bus pipeline
pub mod pipeline;

// Re-exports
pub use error::{ControlError, ErrorClass, Result};
pub use pipeline::LightStateSource;
