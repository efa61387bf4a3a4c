//! JSON capture file source.
//!
//! Reads a whole capture document (channel traces, optional decoder
//! selection, packets with hex payloads), validates it and then yields the
//! packets in file order.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::JsonCaptureSource;
