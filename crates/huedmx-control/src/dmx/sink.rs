//! Shared access to the single DMX bus

use super::transport::DmxTransport;
use super::universe::{Universe, UNIVERSE_SIZE};
use crate::{error::ControlError, Result};
use huedmx_core::Frame;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct Bus {
    universe: Universe,
    transport: Box<dyn DmxTransport>,
}

impl Bus {
    fn apply_and_transmit(&mut self, address: u16, frame: &[u8]) -> Result<()> {
        self.universe.apply(address, frame)?;
        self.transport.transmit(self.universe.as_bytes())
    }
}

/// Writes fixture frames into the universe and pushes the whole packet out
///
/// Writers are serialized: the buffer update and the physical transmission
/// happen under one lock, so two packets never interleave on the wire.
/// Clones share the same bus.
#[derive(Clone)]
pub struct FrameSink {
    bus: Arc<Mutex<Bus>>,
}

impl FrameSink {
    pub fn new(transport: Box<dyn DmxTransport>) -> Self {
        Self {
            bus: Arc::new(Mutex::new(Bus {
                universe: Universe::new(),
                transport,
            })),
        }
    }

    /// Patch `frame` in at `address` and transmit the full universe.
    ///
    /// A failed transmission is reported, not retried. The buffer keeps the
    /// new bytes, so the next successful write carries them.
    pub async fn write(&self, address: u16, frame: &Frame) -> Result<()> {
        let mut bus = self.bus.clone().lock_owned().await;
        let bytes = frame.as_bytes().to_vec();
        debug!("Writing {} channels at address {}", bytes.len(), address);

        tokio::task::spawn_blocking(move || bus.apply_and_transmit(address, &bytes))
            .await
            .map_err(|e| ControlError::Task(e.to_string()))?
    }

    /// Copy of the current buffer
    pub async fn snapshot(&self) -> [u8; UNIVERSE_SIZE] {
        *self.bus.lock().await.universe.as_bytes()
    }
}
