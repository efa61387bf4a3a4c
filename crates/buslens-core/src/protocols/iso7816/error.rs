use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Iso7816Error {
    #[error("capture has no channel named '{name}'")]
    MissingChannel { name: String },
    #[error("ATR must start on channel '{expected}', got '{channel}'")]
    WrongChannel { channel: String, expected: String },
    #[error("invalid ATR initial character 0x{0:02X}")]
    InvalidInitialByte(u8),
    #[error("TA1=0x{ta1:02X} selects a reserved Fi value")]
    ReservedFi { ta1: u8 },
    #[error("TA1=0x{ta1:02X} selects a reserved Di value")]
    ReservedDi { ta1: u8 },
    #[error("baud rate {baud} with TA1=0x{ta1:02X} overflows")]
    BaudOverflow { baud: u32, ta1: u8 },
}
