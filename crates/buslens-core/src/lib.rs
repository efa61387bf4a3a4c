//! buslens core library: protocol decoding for captured bus traffic and the
//! instrument transport layer.
//!
//! Captured packets (UART, SPI, I2C) come from a `CaptureSource`, are routed
//! by the `DecoderRegistry` to the chip decoder configured for their bus, and
//! the decoders append `(color, text)` lines to an `OutputSink`. Decoders are
//! byte-oriented and side-effect free apart from the explicit baud-rate side
//! channel reported by the ISO 7816 decoder. All file I/O lives in `capture`
//! and all device I/O lives in `transport`.
//!
//! Invariants:
//! - Dispatch never panics or returns an error to the caller; malformed
//!   packets are dropped silently and decoder faults become one error line.
//! - Decoder state lives for one capture session and is never shared.
//! - A transport operation that times out is cancelled before the error is
//!   returned.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use buslens_core::{DecoderConfig, decode_capture_file};
//!
//! let report = decode_capture_file(Path::new("capture.json"), &DecoderConfig::default())?;
//! for line in &report.lines {
//!     println!("{}", line.text);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod capture;
mod decoder;
mod output;
pub mod protocols;
mod registry;
pub mod transport;

pub use analysis::{AnalysisError, decode_capture_file, decode_source};
pub use capture::{
    Bus, CaptureContext, CaptureError, CaptureSource, CapturedPacket, DigitalTrace, I2cPacket,
    JsonCaptureSource, SpiPacket, UartPacket,
};
pub use decoder::{Chip, ChipDecoder, DecodeError, DecodeOutcome};
pub use output::{ColorTag, DecodedLine, LineBuffer, OutputSink};
pub use protocols::iso7816::Iso7816Channels;
pub use registry::{DecoderConfig, DecoderRegistry, RegistryError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Result of decoding one capture, in packet order.
///
/// # Examples
/// ```
/// use buslens_core::{DecoderConfig, make_stub_report};
///
/// let report = make_stub_report("capture.json", 42, DecoderConfig::default());
/// assert_eq!(report.report_version, buslens_core::REPORT_VERSION);
/// assert!(report.lines.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input capture metadata.
    pub input: InputInfo,
    /// Effective decoder selection after overrides were applied.
    pub decoders: DecoderConfig,
    /// Packet counters and side-channel events.
    pub summary: DecodeSummary,
    /// Decoded lines in emission order.
    pub lines: Vec<DecodedLine>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Per-capture counters.
///
/// # Examples
/// ```
/// use buslens_core::DecodeSummary;
///
/// let summary = DecodeSummary::default();
/// assert_eq!(summary.packets_total, 0);
/// assert!(summary.baud_changes.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Total packets read from the capture.
    pub packets_total: u64,
    pub uart_packets: u64,
    pub spi_packets: u64,
    pub i2c_packets: u64,
    /// Packets a decoder rejected as malformed or irrelevant framing.
    pub malformed_packets: u64,
    /// Baud-rate switches reported by decoders, in packet order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub baud_changes: Vec<BaudChange>,
}

/// A baud-rate switch reported through the decoder side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaudChange {
    /// Zero-based index of the packet that completed the switch.
    pub packet_index: u64,
    /// UART channel the packet was captured on.
    pub channel: String,
    pub from: u32,
    pub to: u32,
}

/// Build a report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64, decoders: DecoderConfig) -> DecodeReport {
    DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "buslens".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        decoders,
        summary: DecodeSummary::default(),
        lines: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_empty_baud_changes() {
        let report = make_stub_report("capture.json", 1, DecoderConfig::default());
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value["summary"].get("baud_changes").is_none());
        assert_eq!(value["decoders"]["uart"], serde_json::Value::Null);
    }

    #[test]
    fn report_keeps_baud_changes() {
        let mut report = make_stub_report("capture.json", 1, DecoderConfig::default());
        report.summary.baud_changes.push(BaudChange {
            packet_index: 3,
            channel: "CARD".to_string(),
            from: 9600,
            to: 223_200,
        });
        let value = serde_json::to_value(&report).expect("report json");
        assert_eq!(value["summary"]["baud_changes"][0]["to"], 223_200);
    }
}
