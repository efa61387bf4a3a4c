use thiserror::Error;

/// Errors returned by PN532 frame and payload parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Pn532Error {
    #[error("no frame start code")]
    NoStartCode,
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("data checksum mismatch: sum 0x{sum:02X}, frame carries 0x{dcs:02X}")]
    ChecksumMismatch { sum: u8, dcs: u8 },
    #[error("unexpected frame identifier 0x{actual:02X}, expected 0x{expected:02X}")]
    UnexpectedTfi { expected: u8, actual: u8 },
}
