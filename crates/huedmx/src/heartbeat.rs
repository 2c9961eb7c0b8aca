//! Keep-alive for the bridge event stream
//!
//! The bridge goes quiet when nothing changes, and a quiet stream is
//! indistinguishable from a dead one. Flipping a harmless metadata field on a
//! mirrored light produces an event every interval.

use huedmx_control::hue::{HueBridge, HueError};
use std::time::Duration;
use tracing::{debug, warn};

const FUNCTION_MIXED: &str = "mixed";
const FUNCTION_UNKNOWN: &str = "unknown";

/// Value to write after reading `current`
pub fn toggled_function(current: Option<&str>) -> &'static str {
    if current == Some(FUNCTION_MIXED) {
        FUNCTION_UNKNOWN
    } else {
        FUNCTION_MIXED
    }
}

async fn beat(bridge: &HueBridge, light_id: &str) -> Result<(), HueError> {
    let light = bridge.get_light(light_id).await?;
    let next = toggled_function(light.metadata.function.as_deref());
    bridge.set_light_function(light_id, next).await?;
    debug!("Heartbeat: light {} function set to {}", light_id, next);
    Ok(())
}

/// Runs forever; failures are logged and retried on the next tick.
pub async fn run(bridge: HueBridge, light_id: String, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = beat(&bridge, &light_id).await {
            warn!("Heartbeat on light {} failed: {}", light_id, e);
        }
    }
}
