//! Philips Hue bridge integration
//!
//! Covers the CLIP v2 REST calls the bridge needs ([`client`]), the JSON resource
//! shapes ([`models`]), and the server-sent event feed ([`events`], [`stream`]).

pub mod client;
pub mod error;
pub mod events;
pub mod models;
pub mod stream;

pub use client::HueBridge;
pub use error::HueError;
pub use events::{BridgeEvent, EventResource, SseDecoder};
pub use stream::EventSource;
