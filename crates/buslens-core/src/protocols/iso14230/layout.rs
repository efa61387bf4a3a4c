pub const MIN_FRAME_LEN: usize = 3;

pub const FORMAT_OFFSET: usize = 0;
pub const FORMAT_ADDRESS_FLAG: u8 = 0x80;
pub const FORMAT_LENGTH_MASK: u8 = 0x3F;

pub const TARGET_OFFSET: usize = 1;
pub const SOURCE_OFFSET: usize = 2;
pub const ADDRESS_LEN: usize = 2;
pub const CHECKSUM_LEN: usize = 1;

// Offsets inside the service payload.
pub const SERVICE_ID_OFFSET: usize = 0;
pub const SUB_FUNCTION_OFFSET: usize = 1;
pub const REJECTED_SERVICE_OFFSET: usize = 1;
pub const RESPONSE_CODE_OFFSET: usize = 2;

pub const NEGATIVE_RESPONSE_SID: u8 = 0x7F;
pub const RESPONSE_FLAG: u8 = 0x40;
