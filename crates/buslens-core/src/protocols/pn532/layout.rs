pub const START_CODE: [u8; 2] = [0x00, 0xFF];
pub const LEN_OFFSET: usize = 2;
pub const LCS_OFFSET: usize = 3;
pub const PAYLOAD_OFFSET: usize = 4;
pub const LEN_ACK: u8 = 0x00;
pub const LEN_NACK: u8 = 0xFF;
pub const ERROR_FRAME_LEN: usize = 1;
/// PN532 reports application level errors with this single payload byte.
pub const APPLICATION_ERROR: u8 = 0x7F;

pub const TFI_OFFSET: usize = 0;
pub const CODE_OFFSET: usize = 1;
pub const PARAMS_OFFSET: usize = 2;
pub const TFI_HOST_TO_PN532: u8 = 0xD4;
pub const TFI_PN532_TO_HOST: u8 = 0xD5;

pub const SPI_DATA_WRITE: u8 = 0x01;
pub const SPI_STATUS_READ: u8 = 0x02;
pub const SPI_DATA_READ: u8 = 0x03;
pub const SPI_STATUS_REPLY_LEN: usize = 2;

pub const I2C_ADDRESS: u8 = 0x24;
pub const READY_FLAG: u8 = 0x01;

pub const STATUS_ERROR_MASK: u8 = 0x3F;
pub const SAM_TIMEOUT_STEP_MS: u32 = 50;
pub const INFINITE_RETRIES: u8 = 0xFF;

pub const GET_FIRMWARE_VERSION: u8 = 0x02;
pub const SAM_CONFIGURATION: u8 = 0x14;
pub const RF_CONFIGURATION: u8 = 0x32;
pub const IN_DATA_EXCHANGE: u8 = 0x40;
pub const IN_LIST_PASSIVE_TARGET: u8 = 0x4A;

pub const RF_ITEM_FIELD: u8 = 0x01;
pub const RF_ITEM_TIMINGS: u8 = 0x02;
pub const RF_ITEM_MAX_RTY_COM: u8 = 0x04;
pub const RF_ITEM_MAX_RETRIES: u8 = 0x05;
pub const RF_FIELD_AUTO_RFCA: u8 = 0x01;
pub const RF_FIELD_ON: u8 = 0x02;
