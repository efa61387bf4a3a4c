use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::{Bus, CaptureContext, CapturedPacket, I2cPacket, SpiPacket, UartPacket};
use crate::decoder::{Chip, ChipDecoder, DecodeError, DecodeOutcome};
use crate::output::{ColorTag, OutputSink};
use crate::protocols::iso7816::Iso7816Channels;

/// Chip selection per bus kind. `None` disables decoding on that bus.
///
/// # Examples
/// ```
/// use buslens_core::{Chip, DecoderConfig};
///
/// let base = DecoderConfig { uart: Some(Chip::Iso7816), ..Default::default() };
/// let overrides = DecoderConfig { spi: Some(Chip::Pn532), ..Default::default() };
/// let merged = base.merged_with(&overrides);
/// assert_eq!(merged.uart, Some(Chip::Iso7816));
/// assert_eq!(merged.spi, Some(Chip::Pn532));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default)]
    pub uart: Option<Chip>,
    #[serde(default)]
    pub spi: Option<Chip>,
    #[serde(default)]
    pub i2c: Option<Chip>,
    /// Channel names the ISO 7816 decoder correlates with.
    #[serde(default)]
    pub iso7816: Iso7816Channels,
}

impl DecoderConfig {
    pub fn selection(&self, bus: Bus) -> Option<Chip> {
        match bus {
            Bus::Uart => self.uart,
            Bus::Spi => self.spi,
            Bus::I2c => self.i2c,
        }
    }

    /// Selections present in `overrides` replace ours; channel names are
    /// taken from `overrides` only when they differ from the defaults.
    pub fn merged_with(&self, overrides: &DecoderConfig) -> DecoderConfig {
        DecoderConfig {
            uart: overrides.uart.or(self.uart),
            spi: overrides.spi.or(self.spi),
            i2c: overrides.i2c.or(self.i2c),
            iso7816: if overrides.iso7816 != Iso7816Channels::default() {
                overrides.iso7816.clone()
            } else {
                self.iso7816.clone()
            },
        }
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        for bus in [Bus::Uart, Bus::Spi, Bus::I2c] {
            if let Some(chip) = self.selection(bus) {
                if !chip.supports(bus) {
                    return Err(RegistryError::UnsupportedBus { chip, bus });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("chip {chip} cannot decode {bus} traffic")]
    UnsupportedBus { chip: Chip, bus: Bus },
    #[error("decoder {decoder} cannot decode {bus} traffic")]
    UnsupportedDecoder { decoder: &'static str, bus: Bus },
}

/// Routes captured packets to the decoder configured for their bus.
///
/// Instances are created on first dispatch and dropped on `reset` or
/// `reconfigure`. Dispatch never fails: malformed packets are silent and
/// decoder faults turn into a single `Error` line.
///
/// # Examples
/// ```
/// use buslens_core::{DecoderConfig, DecoderRegistry, LineBuffer, SpiPacket};
///
/// let mut registry = DecoderRegistry::new(DecoderConfig::default())?;
/// let mut sink = LineBuffer::new();
/// let packet = SpiPacket { mosi: vec![0x02], miso: vec![0x00, 0x01], cs_asserted: true };
/// registry.decode_spi(Some(&packet), &(), &mut sink);
/// assert!(sink.is_empty());
/// # Ok::<(), buslens_core::RegistryError>(())
/// ```
pub struct DecoderRegistry {
    config: DecoderConfig,
    uart: Option<Box<dyn ChipDecoder>>,
    spi: Option<Box<dyn ChipDecoder>>,
    i2c: Option<Box<dyn ChipDecoder>>,
}

impl DecoderRegistry {
    pub fn new(config: DecoderConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        Ok(Self {
            config,
            uart: None,
            spi: None,
            i2c: None,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Replace the chip selection; all decoder state is discarded.
    pub fn reconfigure(&mut self, config: DecoderConfig) -> Result<(), RegistryError> {
        config.validate()?;
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Start a new capture session with the same selection.
    pub fn reset(&mut self) {
        self.uart = None;
        self.spi = None;
        self.i2c = None;
    }

    /// Register an extension decoder for `bus`, replacing any instance there.
    pub fn install(&mut self, bus: Bus, decoder: Box<dyn ChipDecoder>) -> Result<(), RegistryError> {
        if !decoder.supports(bus) {
            return Err(RegistryError::UnsupportedDecoder {
                decoder: decoder.name(),
                bus,
            });
        }
        log::debug!("installing decoder {} for {}", decoder.name(), bus);
        *self.slot_mut(bus) = Some(decoder);
        Ok(())
    }

    pub fn dispatch(
        &mut self,
        packet: &CapturedPacket,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> DecodeOutcome {
        match packet {
            CapturedPacket::Uart(packet) => self.decode_uart(Some(packet), capture, sink),
            CapturedPacket::Spi(packet) => self.decode_spi(Some(packet), capture, sink),
            CapturedPacket::I2c(packet) => self.decode_i2c(Some(packet), capture, sink),
        }
    }

    pub fn decode_uart(
        &mut self,
        packet: Option<&UartPacket>,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> DecodeOutcome {
        let Some(packet) = packet else {
            return DecodeOutcome::Ignored;
        };
        self.run(Bus::Uart, sink, |decoder, sink| {
            decoder.decode_uart(packet, capture, sink)
        })
    }

    pub fn decode_spi(
        &mut self,
        packet: Option<&SpiPacket>,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> DecodeOutcome {
        let Some(packet) = packet else {
            return DecodeOutcome::Ignored;
        };
        self.run(Bus::Spi, sink, |decoder, sink| {
            decoder.decode_spi(packet, capture, sink)
        })
    }

    pub fn decode_i2c(
        &mut self,
        packet: Option<&I2cPacket>,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> DecodeOutcome {
        let Some(packet) = packet else {
            return DecodeOutcome::Ignored;
        };
        self.run(Bus::I2c, sink, |decoder, sink| {
            decoder.decode_i2c(packet, capture, sink)
        })
    }

    fn slot_mut(&mut self, bus: Bus) -> &mut Option<Box<dyn ChipDecoder>> {
        match bus {
            Bus::Uart => &mut self.uart,
            Bus::Spi => &mut self.spi,
            Bus::I2c => &mut self.i2c,
        }
    }

    fn run<F>(&mut self, bus: Bus, sink: &mut dyn OutputSink, decode: F) -> DecodeOutcome
    where
        F: FnOnce(
            &mut dyn ChipDecoder,
            &mut dyn OutputSink,
        ) -> Result<DecodeOutcome, DecodeError>,
    {
        let selection = self.config.selection(bus);
        let channels = self.config.iso7816.clone();
        let slot = self.slot_mut(bus);
        if slot.is_none() {
            let Some(chip) = selection else {
                return DecodeOutcome::Ignored;
            };
            log::debug!("creating {} decoder for {}", chip, bus);
            *slot = Some(chip.instantiate(&channels));
        }
        let Some(decoder) = slot.as_mut() else {
            return DecodeOutcome::Ignored;
        };
        let name = decoder.name();

        let result = panic::catch_unwind(AssertUnwindSafe(|| decode(decoder.as_mut(), &mut *sink)));
        match result {
            Ok(Ok(DecodeOutcome::Malformed)) => {
                log::trace!("{} dropped malformed {} packet", name, bus);
                DecodeOutcome::Malformed
            }
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                log::warn!("{} decoder fault on {}: {}", name, bus, err);
                sink.append_formatted(ColorTag::Error, format_args!("{err}"));
                DecodeOutcome::Malformed
            }
            Err(_) => {
                log::warn!("{} decoder panicked on {}; instance dropped", name, bus);
                *slot = None;
                sink.append_formatted(
                    ColorTag::Error,
                    format_args!("{name}: internal decoder error, packet skipped"),
                );
                DecodeOutcome::Malformed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecoderConfig, DecoderRegistry, RegistryError};
    use crate::capture::{Bus, I2cPacket, SpiPacket, UartPacket};
    use crate::decoder::{Chip, DecodeOutcome};
    use crate::output::LineBuffer;

    fn uart(data: &[u8]) -> UartPacket {
        UartPacket {
            data: data.to_vec(),
            baud_rate: 10400,
            channel: "K".to_string(),
            start_sample: 0,
        }
    }

    #[test]
    fn rejects_chip_on_wrong_bus() {
        let config = DecoderConfig {
            spi: Some(Chip::Iso7816),
            ..Default::default()
        };
        let err = DecoderRegistry::new(config).err().expect("unmapped pair");
        assert_eq!(
            err,
            RegistryError::UnsupportedBus {
                chip: Chip::Iso7816,
                bus: Bus::Spi
            }
        );
    }

    #[test]
    fn absent_packet_is_a_no_op() {
        let config = DecoderConfig {
            uart: Some(Chip::Iso14230),
            ..Default::default()
        };
        let mut registry = DecoderRegistry::new(config).unwrap();
        let mut sink = LineBuffer::new();
        assert_eq!(
            registry.decode_uart(None, &(), &mut sink),
            DecodeOutcome::Ignored
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn none_selection_emits_nothing() {
        let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
        let mut sink = LineBuffer::new();
        registry.decode_uart(Some(&uart(&[0x81, 0x10, 0xF1, 0x81, 0x03])), &(), &mut sink);
        registry.decode_spi(
            Some(&SpiPacket {
                mosi: vec![0x02],
                miso: vec![0x00, 0x01],
                cs_asserted: true,
            }),
            &(),
            &mut sink,
        );
        registry.decode_i2c(
            Some(&I2cPacket {
                address: 0x24,
                is_write: false,
                data: vec![0x01],
            }),
            &(),
            &mut sink,
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn reconfigure_validates_before_applying() {
        let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
        let bad = DecoderConfig {
            uart: Some(Chip::Pn532),
            ..Default::default()
        };
        assert!(registry.reconfigure(bad).is_err());
        assert_eq!(registry.config(), &DecoderConfig::default());
    }

    #[test]
    fn merged_overrides_keep_base_channels() {
        let mut base = DecoderConfig::default();
        base.iso7816.smartcard = "SIM".to_string();
        let merged = base.merged_with(&DecoderConfig::default());
        assert_eq!(merged.iso7816.smartcard, "SIM");
    }
}
