//! ISO 7816-3 clock rate conversion (Fi) and baud rate adjustment (Di)
//! tables. `None` marks reserved codes.

pub fn fi(code: u8) -> Option<u32> {
    match code {
        0x0 | 0x1 => Some(372),
        0x2 => Some(558),
        0x3 => Some(744),
        0x4 => Some(1116),
        0x5 => Some(1488),
        0x6 => Some(1860),
        0x9 => Some(512),
        0xA => Some(768),
        0xB => Some(1024),
        0xC => Some(1536),
        0xD => Some(2048),
        _ => None,
    }
}

pub fn di(code: u8) -> Option<u32> {
    match code {
        0x1 => Some(1),
        0x2 => Some(2),
        0x3 => Some(4),
        0x4 => Some(8),
        0x5 => Some(16),
        0x6 => Some(32),
        0x7 => Some(64),
        0x8 => Some(12),
        0x9 => Some(20),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{di, fi};

    #[test]
    fn reserved_codes() {
        for code in [0x7, 0x8, 0xE, 0xF] {
            assert_eq!(fi(code), None, "Fi code {code:X}");
        }
        assert_eq!(di(0x0), None);
        for code in 0xA..=0xF {
            assert_eq!(di(code), None, "Di code {code:X}");
        }
    }

    #[test]
    fn default_pair() {
        assert_eq!(fi(0x1), Some(372));
        assert_eq!(di(0x1), Some(1));
    }
}
