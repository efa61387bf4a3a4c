//! NXP PN532 NFC controller host interface.
//!
//! Frames are shared by the SPI and I2C transports; only the framing of the
//! link differs (SPI operation byte vs. I2C ready byte).

pub mod decoder;
pub mod error;
pub mod frame;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod tables;

pub use decoder::Pn532Decoder;
pub use frame::{Frame, FrameKind, classify, extract_frame};
pub use parser::{Direction, describe};
