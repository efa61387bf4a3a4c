use std::fmt;

use crate::capture::{Bus, CaptureContext, UartPacket};
use crate::decoder::{ChipDecoder, DecodeError, DecodeOutcome};
use crate::output::{ColorTag, OutputSink};

use super::parser::{KwpMessage, parse_frame, parse_message};
use super::tables;

/// Stateless K-line decoder: one UART packet is one frame.
#[derive(Debug, Default)]
pub struct Iso14230Decoder;

impl Iso14230Decoder {
    pub fn new() -> Self {
        Self
    }
}

struct ServiceLabel {
    service: u8,
    sub_function: Option<u8>,
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match tables::service_name(self.service) {
            Some(name) => f.write_str(name)?,
            None => write!(f, "unknown service 0x{:02X}", self.service)?,
        }
        if let Some(suffix) = tables::sub_function_suffix(self.service, self.sub_function) {
            write!(f, " ({suffix})")?;
        }
        Ok(())
    }
}

impl ChipDecoder for Iso14230Decoder {
    fn name(&self) -> &'static str {
        "iso14230"
    }

    fn supports(&self, bus: Bus) -> bool {
        bus == Bus::Uart
    }

    fn decode_uart(
        &mut self,
        packet: &UartPacket,
        _capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        let frame = match parse_frame(&packet.data) {
            Ok(frame) => frame,
            Err(err) => {
                log::trace!("kwp2000 frame rejected: {err}");
                return Ok(DecodeOutcome::Malformed);
            }
        };
        let message = match parse_message(frame.payload) {
            Ok(message) => message,
            Err(err) => {
                log::trace!("kwp2000 payload rejected: {err}");
                return Ok(DecodeOutcome::Malformed);
            }
        };

        let (src, dst) = (frame.source, frame.target);
        match message {
            KwpMessage::Request {
                service,
                sub_function,
            } => sink.append_formatted(
                ColorTag::Command,
                format_args!(
                    "{src:02X} -> {dst:02X} command: {}",
                    ServiceLabel {
                        service,
                        sub_function
                    }
                ),
            ),
            KwpMessage::PositiveResponse {
                service,
                sub_function,
            } => sink.append_formatted(
                ColorTag::Response,
                format_args!(
                    "{src:02X} -> {dst:02X} response: {}",
                    ServiceLabel {
                        service,
                        sub_function
                    }
                ),
            ),
            KwpMessage::NegativeResponse {
                rejected_service,
                code,
            } => {
                let service = match tables::service_name(rejected_service) {
                    Some(name) => name.to_string(),
                    None => format!("service 0x{rejected_service:02X}"),
                };
                let reason = match tables::response_code_name(code) {
                    Some(name) => name.to_string(),
                    None => format!("unknown code 0x{code:02X}"),
                };
                sink.append_formatted(
                    ColorTag::Error,
                    format_args!("{src:02X} -> {dst:02X} negative response to {service}: {reason}"),
                );
            }
        }
        Ok(DecodeOutcome::Decoded)
    }
}
