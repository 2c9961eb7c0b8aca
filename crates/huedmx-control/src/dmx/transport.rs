//! Physical output for the DMX packet

use super::universe::UNIVERSE_SIZE;
use crate::{error::ControlError, Result};
use huedmx_core::DmxConfig;
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// DMX512 line rate
pub const DMX_BAUD_RATE: u32 = 250_000;

/// USB vendor id of Future Technology Devices International
pub const FTDI_VENDOR_ID: u16 = 0x0403;

const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Sends one complete packet. Called from a blocking context.
pub trait DmxTransport: Send {
    fn transmit(&mut self, packet: &[u8; UNIVERSE_SIZE]) -> Result<()>;
}

/// RS-485 adapter on a serial device
///
/// The port is opened on first use and reopened on the next transmit after
/// any failure, so an unplugged adapter recovers without a restart.
pub struct SerialDmxPort {
    path: String,
    break_duration: Duration,
    mark_after_break: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialDmxPort {
    pub fn new(path: impl Into<String>, config: &DmxConfig) -> Self {
        Self {
            path: path.into(),
            break_duration: config.break_duration(),
            mark_after_break: config.mark_after_break(),
            port: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn open(&self) -> Result<Box<dyn SerialPort>> {
        let port = serialport::new(&self.path, DMX_BAUD_RATE)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::Two)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()?;
        info!("Opened DMX port {} at {} baud", self.path, DMX_BAUD_RATE);
        Ok(port)
    }
}

impl DmxTransport for SerialDmxPort {
    fn transmit(&mut self, packet: &[u8; UNIVERSE_SIZE]) -> Result<()> {
        let mut port = match self.port.take() {
            Some(port) => port,
            None => self.open()?,
        };

        let result = send_packet(
            port.as_mut(),
            packet,
            self.break_duration,
            self.mark_after_break,
        );
        match &result {
            // Dropping the handle closes the port; the next transmit reopens it
            Err(e) => warn!("DMX write to {} failed, closing port: {}", self.path, e),
            Ok(()) => self.port = Some(port),
        }
        result
    }
}

fn send_packet(
    port: &mut dyn SerialPort,
    packet: &[u8; UNIVERSE_SIZE],
    break_duration: Duration,
    mark_after_break: Duration,
) -> Result<()> {
    port.set_break()
        .map_err(|e| ControlError::Framing(format!("set break: {}", e)))?;
    std::thread::sleep(break_duration);
    port.clear_break()
        .map_err(|e| ControlError::Framing(format!("clear break: {}", e)))?;
    std::thread::sleep(mark_after_break);

    port.write_all(packet)
        .map_err(|e| ControlError::Framing(format!("write: {}", e)))?;
    port.flush()
        .map_err(|e| ControlError::Framing(format!("flush: {}", e)))?;
    Ok(())
}

/// Renders but never touches hardware
#[derive(Debug, Default)]
pub struct StubTransport {
    sent: u64,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets accepted so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl DmxTransport for StubTransport {
    fn transmit(&mut self, packet: &[u8; UNIVERSE_SIZE]) -> Result<()> {
        self.sent += 1;
        let lit: Vec<String> = packet
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, v)| **v > 0)
            .map(|(ch, v)| format!("{}={}", ch, v))
            .collect();
        info!("Stub DMX packet #{}: [{}]", self.sent, lit.join(" "));
        Ok(())
    }
}

/// First USB serial port made by FTDI, if any
pub fn find_ftdi_port() -> Result<Option<String>> {
    let ports = serialport::available_ports()?;
    for port in ports {
        if let SerialPortType::UsbPort(usb) = &port.port_type {
            let by_name = usb
                .manufacturer
                .as_deref()
                .is_some_and(|m| m.contains("FTDI"));
            debug!(
                "Serial port {} vid={:04x} manufacturer={:?}",
                port.port_name, usb.vid, usb.manufacturer
            );
            if by_name || usb.vid == FTDI_VENDOR_ID {
                return Ok(Some(port.port_name));
            }
        }
    }
    Ok(None)
}
