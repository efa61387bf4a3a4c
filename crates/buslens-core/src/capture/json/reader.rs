use serde::{Deserialize, Deserializer};

use super::error::JsonSourceError;
use super::layout;

/// Parse a hex byte string, ignoring whitespace (`"3B 96 11"`).
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use buslens_core::capture::json::reader::parse_hex_bytes;
///
/// assert_eq!(parse_hex_bytes("00 ff").unwrap(), vec![0x00, 0xFF]);
/// ```
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact)
}

pub(crate) fn hex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_hex_bytes(&text).map_err(serde::de::Error::custom)
}

pub(crate) fn default_cs_asserted() -> bool {
    layout::DEFAULT_CS_ASSERTED
}

pub(crate) fn default_initial_high() -> bool {
    layout::DEFAULT_INITIAL_HIGH
}

/// Check a channel's toggle list against the capture length.
pub fn validate_transitions(
    channel: &str,
    transitions: &[u64],
    sample_count: u64,
) -> Result<(), JsonSourceError> {
    let invalid = |message: String| JsonSourceError::Invalid {
        context: format!("channel '{channel}'"),
        message,
    };
    if let Some(pair) = transitions.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(invalid(format!(
            "transitions must be strictly increasing ({} then {})",
            pair[0], pair[1]
        )));
    }
    if let Some(&last) = transitions.last() {
        if last >= sample_count {
            return Err(invalid(format!(
                "transition at sample {last} is beyond sample_count {sample_count}"
            )));
        }
    }
    Ok(())
}

pub fn validate_i2c_address(index: usize, address: u8) -> Result<(), JsonSourceError> {
    if address > layout::MAX_I2C_ADDRESS {
        return Err(JsonSourceError::Invalid {
            context: format!("packet {index}"),
            message: format!("I2C address 0x{address:02X} is not a 7-bit address"),
        });
    }
    Ok(())
}
