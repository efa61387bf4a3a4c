use std::path::Path;

use thiserror::Error;

use crate::capture::{CaptureError, CaptureSource, CapturedPacket, JsonCaptureSource};
use crate::output::LineBuffer;
use crate::registry::{DecoderConfig, DecoderRegistry, RegistryError};
use crate::{DecodeReport, make_stub_report};

mod counters;

use counters::SessionCounters;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Decoder configuration error: {0}")]
    Registry(#[from] RegistryError),
}

/// Decode a JSON capture file. Chip selections in `overrides` replace the
/// ones stored in the capture.
pub fn decode_capture_file(
    path: &Path,
    overrides: &DecoderConfig,
) -> Result<DecodeReport, AnalysisError> {
    let source = JsonCaptureSource::open(path)?;
    let config = source
        .decoders()
        .cloned()
        .unwrap_or_default()
        .merged_with(overrides);
    decode_source(path, source, config)
}

/// Run one capture session over `source` with a fresh registry.
pub fn decode_source<S: CaptureSource>(
    path: &Path,
    mut source: S,
    config: DecoderConfig,
) -> Result<DecodeReport, AnalysisError> {
    let mut registry = DecoderRegistry::new(config.clone())?;
    let mut counters = SessionCounters::default();
    let mut sink = LineBuffer::new();
    let mut packet_index = 0u64;

    while let Some(mut packet) = source.next_packet()? {
        counters.add_packet(packet.bus());
        if let CapturedPacket::Uart(uart) = &mut packet {
            if let Some(baud) = counters.baud_override(&uart.channel) {
                uart.baud_rate = baud;
            }
        }

        let outcome = registry.dispatch(&packet, source.context(), &mut sink);
        counters.add_outcome(outcome);

        if let (Some(to), CapturedPacket::Uart(uart)) = (outcome.baud_rate(), &mut packet) {
            log::info!(
                "packet {}: {} baud rate {} -> {}",
                packet_index,
                uart.channel,
                uart.baud_rate,
                to
            );
            counters.add_baud_change(packet_index, &uart.channel, uart.baud_rate, to);
            uart.baud_rate = to;
        }
        packet_index += 1;
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len(), config);
    report.summary = counters.into_summary();
    report.lines = sink.into_lines();
    log::debug!(
        "decoded {} packets into {} lines",
        report.summary.packets_total,
        report.lines.len()
    );
    Ok(report)
}
