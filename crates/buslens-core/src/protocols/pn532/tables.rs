//! PN532 command names, status codes and card type lookups (PN532 User
//! Manual, sections 7 and 7.1).

pub fn command_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "Diagnose",
        0x02 => "GetFirmwareVersion",
        0x04 => "GetGeneralStatus",
        0x06 => "ReadRegister",
        0x08 => "WriteRegister",
        0x0C => "ReadGPIO",
        0x0E => "WriteGPIO",
        0x10 => "SetSerialBaudRate",
        0x12 => "SetParameters",
        0x14 => "SAMConfiguration",
        0x16 => "PowerDown",
        0x32 => "RFConfiguration",
        0x58 => "RFRegulationTest",
        0x56 => "InJumpForDEP",
        0x46 => "InJumpForPSL",
        0x4A => "InListPassiveTarget",
        0x50 => "InATR",
        0x4E => "InPSL",
        0x40 => "InDataExchange",
        0x42 => "InCommunicateThru",
        0x44 => "InDeselect",
        0x52 => "InRelease",
        0x54 => "InSelect",
        0x60 => "InAutoPoll",
        0x8C => "TgInitAsTarget",
        0x92 => "TgSetGeneralBytes",
        0x86 => "TgGetData",
        0x8E => "TgSetData",
        0x94 => "TgSetMetaData",
        0x88 => "TgGetInitiatorCommand",
        0x90 => "TgResponseToInitiator",
        0x8A => "TgGetTargetStatus",
        _ => return None,
    })
}

/// Error part (low six bits) of a status byte.
pub fn status_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "OK",
        0x01 => "timeout",
        0x02 => "CRC error",
        0x03 => "parity error",
        0x04 => "erroneous bit count during anticollision",
        0x05 => "framing error",
        0x06 => "abnormal bit collision",
        0x07 => "communication buffer too small",
        0x09 => "RF buffer overflow",
        0x0A => "RF field not switched on in time",
        0x0B => "RF protocol error",
        0x0D => "overheating",
        0x0E => "internal buffer overflow",
        0x10 => "invalid parameter",
        0x12 => "DEP command not supported",
        0x13 => "data format mismatch",
        0x14 => "MIFARE authentication error",
        0x23 => "UID check byte wrong",
        0x25 => "invalid device state",
        0x26 => "operation not allowed",
        0x27 => "command not acceptable in context",
        0x29 => "target released by initiator",
        0x2A => "card ID mismatch",
        0x2B => "card disappeared",
        0x2C => "NFCID3 mismatch",
        0x2D => "over-current",
        0x2E => "NAD missing",
        _ => return None,
    })
}

pub fn sam_mode_name(mode: u8) -> Option<&'static str> {
    Some(match mode {
        0x01 => "Normal",
        0x02 => "Virtual card",
        0x03 => "Wired card",
        0x04 => "Dual card",
        _ => return None,
    })
}

pub fn baud_modulation_name(brty: u8) -> Option<&'static str> {
    Some(match brty {
        0x00 => "106 kbps type A",
        0x01 => "212 kbps FeliCa",
        0x02 => "424 kbps FeliCa",
        0x03 => "106 kbps type B",
        0x04 => "106 kbps Innovision Jewel",
        _ => return None,
    })
}

pub fn card_type(sak: u8) -> Option<&'static str> {
    Some(match sak {
        0x00 => "MIFARE Ultralight/NTAG",
        0x08 => "MIFARE Classic 1K",
        0x09 => "MIFARE Mini",
        0x10 => "MIFARE Plus 2K",
        0x11 => "MIFARE Plus 4K",
        0x18 => "MIFARE Classic 4K",
        0x20 => "MIFARE DESFire/ISO 14443-4",
        0x28 => "JCOP with MIFARE Classic 1K emulation",
        0x38 => "SmartMX with MIFARE Classic 4K emulation",
        0x88 => "Infineon MIFARE Classic 1K",
        0x98 => "Gemplus MPCOS",
        _ => return None,
    })
}

pub fn analog_settings_name(item: u8) -> Option<&'static str> {
    Some(match item {
        0x0A => "106 kbps type A",
        0x0B => "212/424 kbps",
        0x0C => "type B",
        0x0D => "212/424/848 kbps ISO/IEC 14443-4",
        _ => return None,
    })
}
