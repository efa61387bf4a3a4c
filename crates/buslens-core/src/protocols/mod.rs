//! Chip protocol decoders.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and constants (source of truth)
//! - `reader`: safe byte access and framing conventions
//! - `frame`: link-level frame extraction, where a protocol has one
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `tables`: fixed code → label lookups
//! - `error`: explicit, actionable errors
//! - `decoder`: the `ChipDecoder` implementation that turns parsed frames
//!   into output lines
//!
//! Parsers are pure and contain no I/O. Decoders only emit lines; the single
//! piece of capture metadata they may change (the UART baud rate) is returned
//! as a value, never written back.

pub(crate) mod common;
pub mod iso14230;
pub mod iso7816;
pub mod pn532;
