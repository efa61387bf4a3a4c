use std::fmt::Write as _;

use crate::output::ColorTag;
use crate::protocols::common::format::hex_bytes;

use super::error::Pn532Error;
use super::layout;
use super::reader::Pn532Reader;
use super::tables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to PN532.
    Command,
    /// PN532 to host.
    Response,
}

impl Direction {
    pub fn tfi(self) -> u8 {
        match self {
            Direction::Command => layout::TFI_HOST_TO_PN532,
            Direction::Response => layout::TFI_PN532_TO_HOST,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Command => "command",
            Direction::Response => "response",
        }
    }

    pub fn color(self) -> ColorTag {
        match self {
            Direction::Command => ColorTag::Command,
            Direction::Response => ColorTag::Response,
        }
    }
}

/// One rendered information frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub color: ColorTag,
    pub text: String,
}

/// Render the payload of a data frame (TFI, code, parameters).
pub fn describe(direction: Direction, payload: &[u8]) -> Result<Description, Pn532Error> {
    let reader = Pn532Reader::new(payload);
    let tfi = reader.read_u8(layout::TFI_OFFSET)?;
    if tfi != direction.tfi() {
        return Err(Pn532Error::UnexpectedTfi {
            expected: direction.tfi(),
            actual: tfi,
        });
    }
    let code = reader.read_u8(layout::CODE_OFFSET)?;
    let params = Pn532Reader::new(reader.rest(layout::PARAMS_OFFSET)?);

    // Responses carry the command code plus one.
    let command = match direction {
        Direction::Command => code,
        Direction::Response => code.wrapping_sub(1),
    };

    let mut color = direction.color();
    let detail = match (direction, command) {
        (Direction::Response, layout::GET_FIRMWARE_VERSION) => Some(firmware_version(&params)?),
        (Direction::Command, layout::SAM_CONFIGURATION) => Some(sam_configuration(&params)?),
        (Direction::Command, layout::RF_CONFIGURATION) => Some(rf_configuration(&params)?),
        (Direction::Command, layout::IN_LIST_PASSIVE_TARGET) => {
            Some(list_passive_target_command(&params)?)
        }
        (Direction::Response, layout::IN_LIST_PASSIVE_TARGET) => {
            Some(list_passive_target_response(&params)?)
        }
        (Direction::Command, layout::IN_DATA_EXCHANGE) => Some(data_exchange_command(&params)?),
        (Direction::Response, layout::IN_DATA_EXCHANGE) => {
            let status = params.read_u8(0)? & layout::STATUS_ERROR_MASK;
            if status != 0 {
                color = ColorTag::Error;
            }
            Some(data_exchange_response(&params)?)
        }
        _ => None,
    };

    let mut text = format!("{}: ", direction.label());
    match tables::command_name(command) {
        Some(name) => text.push_str(name),
        None => {
            let _ = write!(text, "unknown 0x{code:02X}");
        }
    }
    if let Some(detail) = detail {
        text.push_str(": ");
        text.push_str(&detail);
    }
    Ok(Description { color, text })
}

pub fn status_text(status: u8) -> String {
    let code = status & layout::STATUS_ERROR_MASK;
    match tables::status_name(code) {
        Some(name) => name.to_string(),
        None => format!("status 0x{code:02X}"),
    }
}

fn firmware_version(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let ic = params.read_u8(0)?;
    let version = params.read_u8(1)?;
    let revision = params.read_u8(2)?;
    let support = params.read_u8(3)?;
    Ok(format!(
        "IC PN5{ic:02X}, firmware {version}.{revision}, support 0x{support:02X}"
    ))
}

fn sam_configuration(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let mode = params.read_u8(0)?;
    let mut text = match tables::sam_mode_name(mode) {
        Some(name) => format!("mode {name}"),
        None => format!("mode 0x{mode:02X}"),
    };
    if let Ok(timeout) = params.read_u8(1) {
        let _ = write!(
            text,
            ", timeout {} ms",
            u32::from(timeout) * layout::SAM_TIMEOUT_STEP_MS
        );
    }
    if let Ok(irq) = params.read_u8(2) {
        text.push_str(if irq != 0 { ", IRQ on" } else { ", IRQ off" });
    }
    Ok(text)
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn rf_configuration(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let item = params.read_u8(0)?;
    let text = match item {
        layout::RF_ITEM_FIELD => {
            let field = params.read_u8(1)?;
            format!(
                "RF field {}, auto RFCA {}",
                on_off(field & layout::RF_FIELD_ON != 0),
                on_off(field & layout::RF_FIELD_AUTO_RFCA != 0)
            )
        }
        layout::RF_ITEM_TIMINGS => {
            let atr_res = params.read_u8(2)?;
            let retry = params.read_u8(3)?;
            format!("timings: ATR_RES timeout 0x{atr_res:02X}, retry timeout 0x{retry:02X}")
        }
        layout::RF_ITEM_MAX_RTY_COM => format!("MaxRtyCOM {}", params.read_u8(1)?),
        layout::RF_ITEM_MAX_RETRIES => {
            let atr = params.read_u8(1)?;
            let psl = params.read_u8(2)?;
            let passive = params.read_u8(3)?;
            let passive = if passive == layout::INFINITE_RETRIES {
                "infinite".to_string()
            } else {
                passive.to_string()
            };
            format!("retries: ATR {atr}, PSL {psl}, passive activation {passive}")
        }
        other => match tables::analog_settings_name(other) {
            Some(name) => format!(
                "analog settings for {name} ({} bytes)",
                params.len().saturating_sub(1)
            ),
            None => format!("config item 0x{other:02X}"),
        },
    };
    Ok(text)
}

fn list_passive_target_command(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let max_targets = params.read_u8(0)?;
    let brty = params.read_u8(1)?;
    let modulation = match tables::baud_modulation_name(brty) {
        Some(name) => name.to_string(),
        None => format!("modulation 0x{brty:02X}"),
    };
    Ok(format!("max {max_targets} target(s), {modulation}"))
}

/// Target data is read as ISO 14443 type A, the common case.
fn list_passive_target_response(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let count = params.read_u8(0)?;
    if count == 0 {
        return Ok("no target".to_string());
    }
    let target = params.read_u8(1)?;
    let atqa = params.read_slice(2..4)?;
    let sak = params.read_u8(4)?;
    let uid_len = params.read_u8(5)? as usize;
    let uid = params.read_slice(6..6 + uid_len)?;
    let card = match tables::card_type(sak) {
        Some(name) => name,
        None => "unknown card",
    };
    Ok(format!(
        "{count} target(s); target {target}: ATQA {}, SAK 0x{sak:02X} ({card}), UID {}",
        hex_bytes(atqa),
        hex_bytes(uid)
    ))
}

fn data_exchange_command(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let target = params.read_u8(0)?;
    let data = params.rest(1)?;
    Ok(format!(
        "target {target}, {} bytes: {}",
        data.len(),
        hex_bytes(data)
    ))
}

fn data_exchange_response(params: &Pn532Reader<'_>) -> Result<String, Pn532Error> {
    let status = params.read_u8(0)?;
    if status & layout::STATUS_ERROR_MASK != 0 {
        return Ok(status_text(status));
    }
    let data = params.rest(1)?;
    Ok(format!(
        "status OK, {} bytes: {}",
        data.len(),
        hex_bytes(data)
    ))
}
