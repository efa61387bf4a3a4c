use thiserror::Error;

/// Errors returned by KWP2000 frame parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Iso14230Error {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("checksum mismatch: computed 0x{computed:02X}, frame carries 0x{carried:02X}")]
    ChecksumMismatch { computed: u8, carried: u8 },
    #[error("frame carries no service id")]
    EmptyPayload,
}
