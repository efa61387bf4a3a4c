use crate::capture::{Bus, CaptureContext, UartPacket};
use crate::decoder::{ChipDecoder, DecodeError, DecodeOutcome};
use crate::output::{ColorTag, OutputSink};

use super::Iso7816Channels;
use super::error::Iso7816Error;
use super::layout;
use super::parser::{baud_switch, is_initial_character};

/// Watches one capture session for the card's ATR and reports the TA1 baud
/// switch once. Any configuration or ATR error finishes the session.
#[derive(Debug)]
pub struct Iso7816Decoder {
    channels: Iso7816Channels,
    channels_checked: bool,
    finished: bool,
    atr: Vec<u8>,
}

impl Iso7816Decoder {
    pub fn new(channels: Iso7816Channels) -> Self {
        Self {
            channels,
            channels_checked: false,
            finished: false,
            atr: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn fail(&mut self, err: Iso7816Error, sink: &mut dyn OutputSink) -> DecodeOutcome {
        log::debug!("iso7816 decoder stopped: {err}");
        sink.append_formatted(ColorTag::Error, format_args!("iso7816: {err}"));
        self.finished = true;
        self.atr.clear();
        DecodeOutcome::Decoded
    }

    fn reset_pulsed(&self, capture: &dyn CaptureContext, start_sample: u64) -> bool {
        capture
            .trace(&self.channels.reset)
            .is_some_and(|trace| trace.driven_low_from(start_sample))
    }
}

impl ChipDecoder for Iso7816Decoder {
    fn name(&self) -> &'static str {
        "iso7816"
    }

    fn supports(&self, bus: Bus) -> bool {
        bus == Bus::Uart
    }

    fn decode_uart(
        &mut self,
        packet: &UartPacket,
        capture: &dyn CaptureContext,
        sink: &mut dyn OutputSink,
    ) -> Result<DecodeOutcome, DecodeError> {
        if self.finished {
            return Ok(DecodeOutcome::Ignored);
        }

        if !self.channels_checked {
            self.channels_checked = true;
            let missing = self
                .channels
                .names()
                .into_iter()
                .find(|name| !capture.has_channel(name))
                .map(str::to_string);
            if let Some(name) = missing {
                return Ok(self.fail(Iso7816Error::MissingChannel { name }, sink));
            }
        }

        let Some(&first) = packet.data.first() else {
            return Ok(DecodeOutcome::Ignored);
        };
        let on_card = packet.channel == self.channels.smartcard;

        if self.atr.is_empty() {
            if !on_card {
                let err = Iso7816Error::WrongChannel {
                    channel: packet.channel.clone(),
                    expected: self.channels.smartcard.clone(),
                };
                return Ok(self.fail(err, sink));
            }
            if !is_initial_character(first) {
                return Ok(self.fail(Iso7816Error::InvalidInitialByte(first), sink));
            }
        } else if !on_card {
            return Ok(DecodeOutcome::Ignored);
        }

        self.atr.extend_from_slice(&packet.data);
        if self.atr.len() < layout::MIN_ATR_LEN {
            return Ok(DecodeOutcome::Ignored);
        }

        // A reset pulse after this packet means the card restarts its ATR.
        if self.reset_pulsed(capture, packet.start_sample) {
            log::debug!(
                "iso7816 reset asserted after sample {}; discarding {} ATR bytes",
                packet.start_sample,
                self.atr.len()
            );
            self.atr.clear();
            return Ok(DecodeOutcome::Ignored);
        }

        let ta1 = self.atr[layout::TA1_OFFSET];
        let baud = packet.baud_rate;
        if ta1 == 0 {
            self.finished = true;
            sink.append_formatted(
                ColorTag::Info,
                format_args!("ATR TA1=0x00: baud rate {baud} unchanged"),
            );
            return Ok(DecodeOutcome::Decoded);
        }

        match baud_switch(baud, ta1) {
            Ok(switch) => {
                self.finished = true;
                sink.append_formatted(
                    ColorTag::Info,
                    format_args!(
                        "ATR TA1=0x{ta1:02X} (Fi={}, Di={}): baud rate {baud} -> {}",
                        switch.fi, switch.di, switch.baud_rate
                    ),
                );
                Ok(DecodeOutcome::BaudRateChanged(switch.baud_rate))
            }
            Err(err @ Iso7816Error::BaudOverflow { .. }) => {
                self.finished = true;
                Err(DecodeError::Internal {
                    decoder: "iso7816",
                    message: err.to_string(),
                })
            }
            Err(err) => Ok(self.fail(err, sink)),
        }
    }
}
