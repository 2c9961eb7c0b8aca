//! Long-lived subscription to the bridge event feed

use super::client::HueBridge;
use super::error::HueError;
use super::events::{parse_block, BridgeEvent, SseDecoder};
use futures::StreamExt;
use huedmx_core::BridgeConfig;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

enum StreamEnd {
    /// Nobody listens any more
    ReceiverClosed,
}

/// Reads bridge events and forwards them, reconnecting forever
pub struct EventSource {
    bridge: HueBridge,
    idle_timeout: Duration,
    backoff: Duration,
}

impl EventSource {
    pub fn new(bridge: HueBridge, config: &BridgeConfig) -> Self {
        Self {
            bridge,
            idle_timeout: config.event_timeout(),
            backoff: config.reconnect_backoff(),
        }
    }

    /// Runs until `events` has no receiver.
    pub async fn run(self, events: mpsc::Sender<BridgeEvent>) {
        let mut decoder = SseDecoder::new();
        loop {
            match self.stream_once(&mut decoder, &events).await {
                Ok(StreamEnd::ReceiverClosed) => break,
                Err(e) => error!("Lost connection to Hue bridge: {}", e),
            }
            if events.is_closed() {
                break;
            }
            decoder.reset();
            tokio::time::sleep(self.backoff).await;
            info!("Reconnecting to Hue bridge event stream");
        }
        info!("Event source stopped");
    }

    async fn stream_once(
        &self,
        decoder: &mut SseDecoder,
        events: &mpsc::Sender<BridgeEvent>,
    ) -> Result<StreamEnd, HueError> {
        let response = self.bridge.open_event_stream().await?;
        info!("Listening for events from {}", self.bridge.base_url());
        let mut body = response.bytes_stream();

        loop {
            let chunk = match tokio::time::timeout(self.idle_timeout, body.next()).await {
                Err(_) => return Err(HueError::StreamTimeout(self.idle_timeout)),
                Ok(None) => return Err(HueError::StreamClosed),
                Ok(Some(chunk)) => chunk?,
            };

            for block in decoder.push(&chunk) {
                let parsed = match parse_block(&block) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Skipping malformed event: {}", e);
                        continue;
                    }
                };
                for event in parsed {
                    debug!("Bridge event: {} ({} resources)", event.event_type, event.data.len());
                    if events.send(event).await.is_err() {
                        return Ok(StreamEnd::ReceiverClosed);
                    }
                }
            }
        }
    }
}
