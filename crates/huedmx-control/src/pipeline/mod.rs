//! Event-to-bus update pipeline
//!
//! ```text
//! EventSource ──► ChangeAggregator ──(debounced batch)──► UpdateScheduler ──► FrameSink
//!                                                           │
//!                                                           └─ LightStateSource (bridge GET)
//! ```

pub mod aggregator;
pub mod registry;
pub mod scheduler;

pub use aggregator::{ChangeAggregator, ChangeBatch, ChangeReceiver};
pub use registry::{FixtureRegistry, PatchedFixture};
pub use scheduler::{BatchReport, UpdateScheduler};

use crate::error::ControlError;
use huedmx_core::LightUpdate;
use std::future::Future;

/// Where the scheduler reads authoritative light state from
pub trait LightStateSource: Send + Sync + 'static {
    fn fetch_light(
        &self,
        light_id: &str,
    ) -> impl Future<Output = Result<LightUpdate, ControlError>> + Send;
}
