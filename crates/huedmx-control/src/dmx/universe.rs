//! Transmission buffer for one DMX universe

use crate::{error::ControlError, Result};
use huedmx_core::config::MAX_DMX_ADDRESS;

/// Start code for dimmer data
pub const START_CODE: u8 = 0x00;

/// Start code plus 512 channels
pub const UNIVERSE_SIZE: usize = MAX_DMX_ADDRESS as usize + 1;

/// Last value written to every channel
///
/// Byte 0 is the start code; channel `n` lives at index `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    data: [u8; UNIVERSE_SIZE],
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// All channels at zero
    pub fn new() -> Self {
        let mut data = [0u8; UNIVERSE_SIZE];
        data[0] = START_CODE;
        Self { data }
    }

    /// Overwrite channels `address..address + frame.len()`, leaving everything else untouched
    pub fn apply(&mut self, address: u16, frame: &[u8]) -> Result<()> {
        let start = usize::from(address);
        let end = start + frame.len();
        if address == 0 || end > UNIVERSE_SIZE {
            return Err(ControlError::AddressOutOfRange {
                address,
                len: frame.len(),
            });
        }
        self.data[start..end].copy_from_slice(frame);
        Ok(())
    }

    /// Value of channel `address` (1-based)
    pub fn channel(&self, address: u16) -> Option<u8> {
        if address == 0 {
            return None;
        }
        self.data.get(usize::from(address)).copied()
    }

    /// The full packet, start code included
    pub fn as_bytes(&self) -> &[u8; UNIVERSE_SIZE] {
        &self.data
    }
}
