pub const MAX_I2C_ADDRESS: u8 = 0x7F;
pub const DEFAULT_CS_ASSERTED: bool = true;
pub const DEFAULT_INITIAL_HIGH: bool = true;
