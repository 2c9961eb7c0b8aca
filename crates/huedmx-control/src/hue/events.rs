//! Bridge event messages and the server-sent event framing around them
//!
//! The bridge pushes blocks of `field: value` lines separated by a blank line.
//! Each `data:` line carries a JSON array of events:
//!
//! ```text
//! id: 1700000000:0
//! data: [{"type":"update","data":[{"id":"…","type":"light","dimming":{"brightness":40.0}}]}]
//! ```

use super::error::HueError;
use serde::Deserialize;

pub const UPDATE_EVENT: &str = "update";
pub const BUTTON_RESOURCE: &str = "button";
pub const SHORT_RELEASE: &str = "short_release";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ButtonReport {
    pub last_event: Option<String>,
}

/// One changed resource inside an event
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EventResource {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub button: Option<ButtonReport>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BridgeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Vec<EventResource>,
}

impl BridgeEvent {
    pub fn is_update(&self) -> bool {
        self.event_type == UPDATE_EVENT
    }

    /// Identifiers of every resource carried by this event
    pub fn changed_ids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().filter_map(|r| r.id.as_deref())
    }

    /// A button resource reported a short press release
    pub fn has_short_release(&self) -> bool {
        self.data.iter().any(|r| {
            r.resource_type.as_deref() == Some(BUTTON_RESOURCE)
                && r
                    .button
                    .as_ref()
                    .and_then(|b| b.last_event.as_deref())
                    == Some(SHORT_RELEASE)
        })
    }
}

/// Parse one complete block. Blocks without `data:` (keep-alive comments) yield nothing.
pub fn parse_block(block: &str) -> Result<Vec<BridgeEvent>, HueError> {
    let mut events = Vec::new();
    for line in block.lines() {
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let batch: Vec<BridgeEvent> = serde_json::from_str(payload.trim_start())?;
        events.extend(batch);
    }
    Ok(events)
}

/// Splits a byte stream into event blocks
///
/// Chunk boundaries are arbitrary; a partial line (or a partial UTF-8
/// sequence) is held until the rest arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    block: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every block completed by them
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut blocks = Vec::new();
        for &byte in chunk {
            if byte != b'\n' {
                self.line.push(byte);
                continue;
            }

            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
            if self.line.is_empty() {
                if !self.block.is_empty() {
                    blocks.push(std::mem::take(&mut self.block));
                }
            } else {
                self.block.push_str(&String::from_utf8_lossy(&self.line));
                self.block.push('\n');
                self.line.clear();
            }
        }
        blocks
    }

    /// Drop any partial data, used after a reconnect
    pub fn reset(&mut self) {
        self.line.clear();
        self.block.clear();
    }
}
