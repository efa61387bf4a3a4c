use crate::capture::{Bus, CaptureContext, I2cPacket, SpiPacket};
use crate::decoder::{ChipDecoder, DecodeError, DecodeOutcome};
use crate::output::{ColorTag, OutputSink};

use super::frame::{Frame, extract_frame};
use super::layout;
use super::parser::{Direction, describe, status_text};

/// Stateless PN532 decoder for the SPI and I2C host interfaces.
#[derive(Debug, Default)]
pub struct Pn532Decoder;

impl Pn532Decoder {
    pub fn new() -> Self {
        Self
    }
}

fn emit_ready(ready: bool, sink: &mut dyn OutputSink) -> DecodeOutcome {
    sink.append_line(
        ColorTag::Status,
        if ready { "status: ready" } else { "status: busy" },
    );
    DecodeOutcome::Decoded
}

fn emit_frame(direction: Direction, bytes: &[u8], sink: &mut dyn OutputSink) -> DecodeOutcome {
    let frame = match extract_frame(bytes) {
        Ok(frame) => frame,
        Err(err) => {
            log::trace!("pn532 {} frame rejected: {err}", direction.label());
            return DecodeOutcome::Malformed;
        }
    };
    match frame {
        Frame::Ack => sink.append_line(ColorTag::Status, "ACK"),
        Frame::Nack => sink.append_line(ColorTag::Status, "NACK"),
        Frame::Error(layout::APPLICATION_ERROR) => {
            sink.append_line(ColorTag::Error, "error frame: application level error")
        }
        Frame::Error(code) => sink.append_formatted(
            ColorTag::Error,
            format_args!("error frame: {}", status_text(code)),
        ),
        Frame::Data(payload) => match describe(direction, payload) {
            Ok(description) => sink.append_line(description.color, &description.text),
            Err(err) => {
                log::trace!("pn532 {} payload rejected: {err}", direction.label());
                return DecodeOutcome::Malformed;
            }
        },
    }
    DecodeOutcome::Decoded
}

impl ChipDecoder for Pn532Decoder {
    fn name(&self) -> &'static str {
        "pn532"
    }

    fn supports(&self, bus: Bus) -> bool {
        matches!(bus, Bus::Spi | Bus::I2c)
    }

    fn decode_spi(
        &mut self,
        packet: &SpiPacket,
        _capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        if !packet.cs_asserted {
            return Ok(DecodeOutcome::Ignored);
        }
        let Some((&operation, frame)) = packet.mosi.split_first() else {
            return Ok(DecodeOutcome::Ignored);
        };
        let outcome = match operation {
            layout::SPI_DATA_WRITE => emit_frame(Direction::Command, frame, sink),
            layout::SPI_DATA_READ => emit_frame(Direction::Response, &packet.miso, sink),
            layout::SPI_STATUS_READ => {
                if packet.miso.len() != layout::SPI_STATUS_REPLY_LEN {
                    return Ok(DecodeOutcome::Malformed);
                }
                emit_ready(packet.miso[1] & layout::READY_FLAG != 0, sink)
            }
            _ => DecodeOutcome::Ignored,
        };
        Ok(outcome)
    }

    fn decode_i2c(
        &mut self,
        packet: &I2cPacket,
        _capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        if packet.address != layout::I2C_ADDRESS {
            return Ok(DecodeOutcome::Ignored);
        }
        if packet.is_write {
            return Ok(emit_frame(Direction::Command, &packet.data, sink));
        }
        let Some((&status, frame)) = packet.data.split_first() else {
            return Ok(DecodeOutcome::Ignored);
        };
        let ready = status & layout::READY_FLAG != 0;
        if frame.is_empty() || !ready {
            return Ok(emit_ready(ready, sink));
        }
        Ok(emit_frame(Direction::Response, frame, sink))
    }
}
