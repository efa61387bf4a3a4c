use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::{Bus, CaptureContext, I2cPacket, SpiPacket, UartPacket};
use crate::output::OutputSink;
use crate::protocols::iso7816::Iso7816Channels;
use crate::protocols::{iso7816, iso14230, pn532};

/// What a decoder did with one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The packet was interpreted; lines may have been emitted.
    Decoded,
    /// The packet was accepted but produced nothing (waiting for more data,
    /// wrong target, decoder finished).
    Ignored,
    /// Like `Decoded`, and the UART baud rate must change to the value for
    /// the rest of the capture.
    BaudRateChanged(u32),
    /// Framing or checksum check failed; the packet was dropped silently.
    Malformed,
    /// The decoder has no capability for this bus kind.
    Unsupported,
}

impl DecodeOutcome {
    pub fn baud_rate(self) -> Option<u32> {
        match self {
            DecodeOutcome::BaudRateChanged(baud) => Some(baud),
            _ => None,
        }
    }
}

/// Internal decoder fault. Malformed input is not a fault; it is reported as
/// `DecodeOutcome::Malformed`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{decoder}: {message}")]
    Internal {
        decoder: &'static str,
        message: String,
    },
}

/// Capability set of a chip decoder. Buses a chip does not speak keep the
/// default `Unsupported` implementation.
pub trait ChipDecoder {
    fn name(&self) -> &'static str;

    fn supports(&self, bus: Bus) -> bool;

    fn decode_uart(
        &mut self,
        packet: &UartPacket,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        let _ = (packet, capture, sink);
        Ok(DecodeOutcome::Unsupported)
    }

    fn decode_spi(
        &mut self,
        packet: &SpiPacket,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        let _ = (packet, capture, sink);
        Ok(DecodeOutcome::Unsupported)
    }

    fn decode_i2c(
        &mut self,
        packet: &I2cPacket,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        let _ = (packet, capture, sink);
        Ok(DecodeOutcome::Unsupported)
    }
}

/// Registered chip set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chip {
    /// ISO 14230 / KWP2000 diagnostics on a K-line UART.
    Iso14230,
    /// ISO 7816 smartcard ATR baud switch detection.
    Iso7816,
    /// NXP PN532 NFC controller (SPI or I2C host interface).
    Pn532,
}

impl Chip {
    pub const ALL: [Chip; 3] = [Chip::Iso14230, Chip::Iso7816, Chip::Pn532];

    pub fn name(self) -> &'static str {
        match self {
            Chip::Iso14230 => "iso14230",
            Chip::Iso7816 => "iso7816",
            Chip::Pn532 => "pn532",
        }
    }

    pub fn supports(self, bus: Bus) -> bool {
        matches!(
            (self, bus),
            (Chip::Iso14230, Bus::Uart)
                | (Chip::Iso7816, Bus::Uart)
                | (Chip::Pn532, Bus::Spi)
                | (Chip::Pn532, Bus::I2c)
        )
    }

    /// Fresh decoder instance with no session state.
    pub fn instantiate(self, iso7816_channels: &Iso7816Channels) -> Box<dyn ChipDecoder> {
        match self {
            Chip::Iso14230 => Box::new(iso14230::Iso14230Decoder::new()),
            Chip::Iso7816 => Box::new(iso7816::Iso7816Decoder::new(iso7816_channels.clone())),
            Chip::Pn532 => Box::new(pn532::Pn532Decoder::new()),
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chip {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso14230" | "kwp2000" => Ok(Chip::Iso14230),
            "iso7816" => Ok(Chip::Iso7816),
            "pn532" => Ok(Chip::Pn532),
            other => Err(format!("unknown chip '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Chip, DecodeOutcome};
    use crate::capture::Bus;

    #[test]
    fn chip_bus_matrix() {
        assert!(Chip::Iso14230.supports(Bus::Uart));
        assert!(!Chip::Iso14230.supports(Bus::Spi));
        assert!(Chip::Iso7816.supports(Bus::Uart));
        assert!(!Chip::Iso7816.supports(Bus::I2c));
        assert!(Chip::Pn532.supports(Bus::Spi));
        assert!(Chip::Pn532.supports(Bus::I2c));
        assert!(!Chip::Pn532.supports(Bus::Uart));
    }

    #[test]
    fn instances_agree_with_chip_table() {
        let channels = Default::default();
        for chip in Chip::ALL {
            let decoder = chip.instantiate(&channels);
            assert_eq!(decoder.name(), chip.name());
            for bus in [Bus::Uart, Bus::Spi, Bus::I2c] {
                assert_eq!(decoder.supports(bus), chip.supports(bus), "{chip} on {bus}");
            }
        }
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("KWP2000".parse::<Chip>(), Ok(Chip::Iso14230));
        assert_eq!("pn532".parse::<Chip>(), Ok(Chip::Pn532));
        assert!("mfrc522".parse::<Chip>().is_err());
    }

    #[test]
    fn only_baud_change_carries_rate() {
        assert_eq!(DecodeOutcome::BaudRateChanged(38_400).baud_rate(), Some(38_400));
        assert_eq!(DecodeOutcome::Decoded.baud_rate(), None);
    }
}
