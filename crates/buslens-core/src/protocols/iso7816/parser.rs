use super::error::Iso7816Error;
use super::layout;
use super::tables;

/// Resolved TA1 baud switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudSwitch {
    pub fi: u32,
    pub di: u32,
    pub baud_rate: u32,
}

pub fn is_initial_character(byte: u8) -> bool {
    byte == layout::TS_DIRECT || byte == layout::TS_INVERSE
}

/// Baud rate after the card applies `ta1`: `baud * 372 * Di / Fi`.
pub fn baud_switch(baud: u32, ta1: u8) -> Result<BaudSwitch, Iso7816Error> {
    let fi = tables::fi(ta1 >> layout::FI_SHIFT).ok_or(Iso7816Error::ReservedFi { ta1 })?;
    let di = tables::di(ta1 & layout::DI_MASK).ok_or(Iso7816Error::ReservedDi { ta1 })?;
    let scaled = u64::from(baud) * layout::DEFAULT_FI * u64::from(di) / u64::from(fi);
    let baud_rate = u32::try_from(scaled).map_err(|_| Iso7816Error::BaudOverflow { baud, ta1 })?;
    Ok(BaudSwitch { fi, di, baud_rate })
}
