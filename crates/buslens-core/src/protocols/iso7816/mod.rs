//! ISO 7816-3 smartcard ATR watcher.
//!
//! The decoder waits for the card's Answer To Reset on the smartcard channel,
//! reads TA1 and reports the baud rate the link switches to once the card
//! and reader have agreed on Fi/Di.

pub mod decoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod tables;

use serde::{Deserialize, Serialize};

pub use decoder::Iso7816Decoder;
pub use parser::{BaudSwitch, baud_switch};

/// Capture channel names the decoder correlates with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Iso7816Channels {
    pub reset: String,
    pub pinpad: String,
    pub smartcard: String,
}

impl Iso7816Channels {
    pub fn names(&self) -> [&str; 3] {
        [&self.reset, &self.pinpad, &self.smartcard]
    }
}

impl Default for Iso7816Channels {
    fn default() -> Self {
        Self {
            reset: "RST".to_string(),
            pinpad: "PINPAD".to_string(),
            smartcard: "CARD".to_string(),
        }
    }
}
