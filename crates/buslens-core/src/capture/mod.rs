//! Captured bus packets and the sources that produce them.
//!
//! Packets arrive already bit-recovered: the capture pipeline has turned
//! edges into bytes. What is left for decoders is byte-stream framing plus a
//! read-only view of the capture (`CaptureContext`) for chips that need to
//! correlate with other channels.

mod json;
mod trace;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::JsonCaptureSource;
pub use trace::DigitalTrace;
pub(crate) use trace::ChannelMap;

/// Bus kind a packet was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bus {
    Uart,
    Spi,
    I2c,
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bus::Uart => "UART",
            Bus::Spi => "SPI",
            Bus::I2c => "I2C",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UartPacket {
    pub data: Vec<u8>,
    /// Baud rate the bytes were recovered at. Updated only through
    /// `DecodeOutcome::BaudRateChanged`.
    pub baud_rate: u32,
    pub channel: String,
    pub start_sample: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiPacket {
    /// Controller-out bytes (MOSI).
    pub mosi: Vec<u8>,
    /// Controller-in bytes (MISO).
    pub miso: Vec<u8>,
    pub cs_asserted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cPacket {
    /// 7-bit target address.
    pub address: u8,
    pub is_write: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedPacket {
    Uart(UartPacket),
    Spi(SpiPacket),
    I2c(I2cPacket),
}

impl CapturedPacket {
    pub fn bus(&self) -> Bus {
        match self {
            CapturedPacket::Uart(_) => Bus::Uart,
            CapturedPacket::Spi(_) => Bus::Spi,
            CapturedPacket::I2c(_) => Bus::I2c,
        }
    }
}

/// Read-only view of the capture a packet belongs to.
pub trait CaptureContext {
    fn has_channel(&self, name: &str) -> bool;
    fn trace(&self, name: &str) -> Option<&DigitalTrace>;
}

/// Capture without any digital channels.
impl CaptureContext for () {
    fn has_channel(&self, _name: &str) -> bool {
        false
    }

    fn trace(&self, _name: &str) -> Option<&DigitalTrace> {
        None
    }
}

pub trait CaptureSource {
    fn context(&self) -> &dyn CaptureContext;
    fn next_packet(&mut self) -> Result<Option<CapturedPacket>, CaptureError>;
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid capture ({context}): {message}")]
    Invalid {
        context: String,
        message: String,
    },
}
