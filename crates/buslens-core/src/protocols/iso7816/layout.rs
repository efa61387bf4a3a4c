/// Initial character values (direct and inverse convention).
pub const TS_DIRECT: u8 = 0x3B;
pub const TS_INVERSE: u8 = 0x3F;
pub const MIN_ATR_LEN: usize = 10;
pub const TA1_OFFSET: usize = 2;
/// Default Fi * Di ratio before the switch (Fi = 372, Di = 1).
pub const DEFAULT_FI: u64 = 372;
pub const FI_SHIFT: u8 = 4;
pub const DI_MASK: u8 = 0x0F;
