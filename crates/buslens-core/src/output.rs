use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic color class of a decoded line. Rendering is left to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    /// Neutral information (baud switches, summaries).
    Info,
    /// Host-to-device traffic.
    Command,
    /// Device-to-host traffic.
    Response,
    /// Link-level status (ACK/NACK, ready/busy).
    Status,
    /// Protocol error frames and decoder configuration errors.
    Error,
}

impl ColorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::Info => "info",
            ColorTag::Command => "command",
            ColorTag::Response => "response",
            ColorTag::Status => "status",
            ColorTag::Error => "error",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted output line. Never mutated after emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLine {
    pub color: ColorTag,
    pub text: String,
}

/// Receiver of decoded lines.
///
/// Implementations must not panic; there is no return value to signal
/// failure.
pub trait OutputSink {
    fn append_line(&mut self, color: ColorTag, text: &str);

    fn append_formatted(&mut self, color: ColorTag, args: fmt::Arguments<'_>) {
        self.append_line(color, &args.to_string());
    }
}

impl OutputSink for Vec<DecodedLine> {
    fn append_line(&mut self, color: ColorTag, text: &str) {
        self.push(DecodedLine {
            color,
            text: text.to_string(),
        });
    }
}

/// Append-only line collector.
///
/// # Examples
/// ```
/// use buslens_core::{ColorTag, LineBuffer, OutputSink};
///
/// let mut sink = LineBuffer::new();
/// sink.append_formatted(ColorTag::Status, format_args!("status: {}", "ready"));
/// assert_eq!(sink.lines()[0].text, "status: ready");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: Vec<DecodedLine>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[DecodedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<DecodedLine> {
        self.lines
    }
}

impl OutputSink for LineBuffer {
    fn append_line(&mut self, color: ColorTag, text: &str) {
        self.lines.append_line(color, text);
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorTag, LineBuffer, OutputSink};

    #[test]
    fn lines_are_kept_in_order() {
        let mut sink = LineBuffer::new();
        sink.append_line(ColorTag::Command, "first");
        sink.append_formatted(ColorTag::Response, format_args!("second {}", 2));
        let lines = sink.into_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].color, ColorTag::Response);
        assert_eq!(lines[1].text, "second 2");
    }

    #[test]
    fn color_tag_serializes_snake_case() {
        let value = serde_json::to_value(ColorTag::Error).unwrap();
        assert_eq!(value, "error");
    }
}
