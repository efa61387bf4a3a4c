//! ISO 14230 (KWP2000) K-line diagnostics.
//!
//! A frame is a format byte, optional target/source addresses, an optional
//! extended length byte, the service payload and an 8-bit sum checksum.
//! Decoding stops at the service label: command parameters are not
//! interpreted.

pub mod decoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod tables;

pub use decoder::Iso14230Decoder;
pub use parser::{KwpFrame, KwpMessage, parse_frame, parse_message};
