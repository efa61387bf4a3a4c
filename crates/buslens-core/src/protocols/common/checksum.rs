/// 8-bit truncating sum: overflow is discarded.
pub(crate) fn sum8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::sum8;

    #[test]
    fn sum8_empty() {
        assert_eq!(sum8(&[]), 0);
    }

    #[test]
    fn sum8_wraps() {
        assert_eq!(sum8(&[0xFF, 0x02]), 0x01);
        assert_eq!(sum8(&[0x80, 0x80, 0x10]), 0x10);
    }
}
