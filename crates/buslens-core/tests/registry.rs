use std::cell::Cell;
use std::rc::Rc;

use buslens_core::{
    Bus, CaptureContext, CapturedPacket, Chip, ChipDecoder, ColorTag, DecodeError, DecodeOutcome,
    DecoderConfig, DecoderRegistry, LineBuffer, OutputSink, RegistryError, SpiPacket, UartPacket,
};

fn uart(data: &[u8]) -> UartPacket {
    UartPacket {
        data: data.to_vec(),
        baud_rate: 10_400,
        channel: "K".to_string(),
        start_sample: 0,
    }
}

/// Panics on the first packet it sees; counts how many instances exist.
struct Flaky {
    created: Rc<Cell<u32>>,
    calls: u32,
}

impl Flaky {
    fn new(created: Rc<Cell<u32>>) -> Self {
        created.set(created.get() + 1);
        Self { created, calls: 0 }
    }
}

impl ChipDecoder for Flaky {
    fn name(&self) -> &'static str {
        "flaky"
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
        self.calls += 1;
        if packet.data.first() == Some(&0xEE) {
            panic!("decoder bug");
        }
        if packet.data.first() == Some(&0xEF) {
            return Err(DecodeError::Internal {
                decoder: "flaky",
                message: "state corrupted".to_string(),
            });
        }
        sink.append_formatted(
            ColorTag::Info,
            format_args!("call {} of instance {}", self.calls, self.created.get()),
        );
        Ok(DecodeOutcome::Decoded)
    }
}

#[test]
fn all_none_registry_is_silent() {
    let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
    let mut sink = LineBuffer::new();
    for packet in [
        CapturedPacket::Uart(uart(&[0xC1, 0x33, 0xF1, 0x81, 0x66])),
        CapturedPacket::Spi(SpiPacket {
            mosi: vec![0x01, 0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00],
            miso: vec![],
            cs_asserted: true,
        }),
    ] {
        assert_eq!(registry.dispatch(&packet, &(), &mut sink), DecodeOutcome::Ignored);
    }
    assert!(sink.is_empty());
}

#[test]
fn configured_chip_decodes() {
    let config = DecoderConfig {
        uart: Some(Chip::Iso14230),
        ..Default::default()
    };
    let mut registry = DecoderRegistry::new(config).unwrap();
    let mut sink = LineBuffer::new();
    let packet = CapturedPacket::Uart(uart(&[0xC1, 0x33, 0xF1, 0x81, 0x66]));
    assert_eq!(registry.dispatch(&packet, &(), &mut sink), DecodeOutcome::Decoded);
    assert_eq!(sink.lines()[0].text, "F1 -> 33 command: StartCommunication");
}

#[test]
fn malformed_packets_produce_no_lines() {
    let config = DecoderConfig {
        uart: Some(Chip::Iso14230),
        ..Default::default()
    };
    let mut registry = DecoderRegistry::new(config).unwrap();
    let mut sink = LineBuffer::new();
    let outcome = registry.decode_uart(Some(&uart(&[0xC1, 0x33])), &(), &mut sink);
    assert_eq!(outcome, DecodeOutcome::Malformed);
    assert!(sink.is_empty());
}

#[test]
fn install_rejects_wrong_bus() {
    let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
    let created = Rc::new(Cell::new(0));
    let err = registry
        .install(Bus::Spi, Box::new(Flaky::new(created)))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnsupportedDecoder {
            decoder: "flaky",
            bus: Bus::Spi
        }
    );
}

#[test]
fn decoder_fault_becomes_one_error_line() {
    let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
    let created = Rc::new(Cell::new(0));
    registry
        .install(Bus::Uart, Box::new(Flaky::new(created)))
        .unwrap();
    let mut sink = LineBuffer::new();
    let outcome = registry.decode_uart(Some(&uart(&[0xEF])), &(), &mut sink);
    assert_eq!(outcome, DecodeOutcome::Malformed);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.lines()[0].color, ColorTag::Error);
    assert_eq!(sink.lines()[0].text, "flaky: state corrupted");

    // The instance survives an error result.
    registry.decode_uart(Some(&uart(&[0x01])), &(), &mut sink);
    assert_eq!(sink.lines()[1].text, "call 2 of instance 1");
}

#[test]
fn panicking_decoder_is_dropped() {
    let config = DecoderConfig {
        uart: Some(Chip::Iso14230),
        ..Default::default()
    };
    let mut registry = DecoderRegistry::new(config).unwrap();
    let created = Rc::new(Cell::new(0));
    registry
        .install(Bus::Uart, Box::new(Flaky::new(created.clone())))
        .unwrap();

    let mut sink = LineBuffer::new();
    let outcome = registry.decode_uart(Some(&uart(&[0xEE])), &(), &mut sink);
    assert_eq!(outcome, DecodeOutcome::Malformed);
    assert_eq!(sink.len(), 1);
    assert_eq!(
        sink.lines()[0].text,
        "flaky: internal decoder error, packet skipped"
    );

    // The configured chip takes the slot over on the next packet.
    let outcome = registry.decode_uart(
        Some(&uart(&[0xC1, 0x33, 0xF1, 0x81, 0x66])),
        &(),
        &mut sink,
    );
    assert_eq!(outcome, DecodeOutcome::Decoded);
    assert_eq!(sink.lines()[1].text, "F1 -> 33 command: StartCommunication");
    assert_eq!(created.get(), 1);
}

#[test]
fn reset_starts_a_new_session() {
    let config = DecoderConfig {
        uart: Some(Chip::Iso7816),
        ..Default::default()
    };
    let mut registry = DecoderRegistry::new(config).unwrap();
    let mut sink = LineBuffer::new();
    // No channels in the capture: the decoder reports once and finishes.
    let packet = uart(&[0x3B]);
    registry.decode_uart(Some(&packet), &(), &mut sink);
    registry.decode_uart(Some(&packet), &(), &mut sink);
    assert_eq!(sink.len(), 1);

    registry.reset();
    registry.decode_uart(Some(&packet), &(), &mut sink);
    assert_eq!(sink.len(), 2);
}

#[test]
fn reconfigure_swaps_chip() {
    let mut registry = DecoderRegistry::new(DecoderConfig::default()).unwrap();
    registry
        .reconfigure(DecoderConfig {
            spi: Some(Chip::Pn532),
            ..Default::default()
        })
        .unwrap();
    let mut sink = LineBuffer::new();
    let packet = SpiPacket {
        mosi: vec![0x02, 0x00],
        miso: vec![0x00, 0x01],
        cs_asserted: true,
    };
    registry.decode_spi(Some(&packet), &(), &mut sink);
    assert_eq!(sink.lines()[0].text, "status: ready");
}
