//! DMX512 output over an RS-485 serial adapter
//!
//! A single [`Universe`] buffer holds the last value written to every channel.
//! Each fixture update patches its slice of the buffer and then the whole
//! packet goes out on the wire:
//!
//! - break (line held low, at least 88 µs)
//! - mark-after-break (at least 8 µs)
//! - 513 bytes at 250 kbaud, 8 data bits, 2 stop bits: start code `0x00`, then channels 1..=512
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use huedmx_control::dmx::{FrameSink, StubTransport};
//! use huedmx_core::Frame;
//!
//! # async fn run() -> huedmx_control::Result<()> {
//! let sink = FrameSink::new(Box::new(StubTransport::new()));
//! sink.write(5, &Frame::from(vec![255, 0, 0, 128])).await?;
//! # Ok(())
//! # }
//! ```

pub mod sink;
pub mod transport;
pub mod universe;

pub use sink::FrameSink;
pub use transport::{find_ftdi_port, DmxTransport, SerialDmxPort, StubTransport};
pub use universe::{Universe, START_CODE, UNIVERSE_SIZE};
