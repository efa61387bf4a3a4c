/// Space-separated uppercase hex (`"04 A2 3B"`).
pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::hex_bytes;

    #[test]
    fn hex_bytes_spaced() {
        assert_eq!(hex_bytes(&[0x04, 0xA2, 0x3B]), "04 A2 3B");
        assert_eq!(hex_bytes(&[]), "");
    }
}
