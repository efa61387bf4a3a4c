use crate::protocols::common::checksum::sum8;

use super::error::Pn532Error;
use super::layout;
use super::reader::Pn532Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Ack,
    Nack,
    /// Single-byte payload.
    Error(u8),
    /// TFI, command code and parameters.
    Data(&'a [u8]),
}

impl Frame<'_> {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Ack => FrameKind::Acknowledge,
            Frame::Nack => FrameKind::NegativeAcknowledge,
            Frame::Error(_) => FrameKind::Error,
            Frame::Data(_) => FrameKind::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Invalid,
    Data,
    Acknowledge,
    NegativeAcknowledge,
    Error,
}

/// Locate and validate the first frame in `bytes`. Leading bytes before the
/// start code (preamble, SPI dummy bytes) are skipped.
pub fn extract_frame(bytes: &[u8]) -> Result<Frame<'_>, Pn532Error> {
    let start = bytes
        .windows(layout::START_CODE.len())
        .position(|window| window == layout::START_CODE)
        .ok_or(Pn532Error::NoStartCode)?;
    let reader = Pn532Reader::new(&bytes[start..]);

    let len = reader.read_u8(layout::LEN_OFFSET)?;
    match len {
        layout::LEN_ACK => return Ok(Frame::Ack),
        layout::LEN_NACK => return Ok(Frame::Nack),
        _ => {}
    }

    let payload_end = layout::PAYLOAD_OFFSET + len as usize;
    let dcs = reader.read_u8(payload_end)?;
    // Start code, LEN and LCS are covered too, so a bad LCS also fails here.
    let sum = sum8(reader.read_slice(0..payload_end)?);
    if sum != !dcs {
        return Err(Pn532Error::ChecksumMismatch { sum, dcs });
    }

    let payload = reader.read_slice(layout::PAYLOAD_OFFSET..payload_end)?;
    if payload.len() == layout::ERROR_FRAME_LEN {
        Ok(Frame::Error(payload[0]))
    } else {
        Ok(Frame::Data(payload))
    }
}

pub fn classify(bytes: &[u8]) -> FrameKind {
    extract_frame(bytes)
        .map(|frame| frame.kind())
        .unwrap_or(FrameKind::Invalid)
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameKind, classify, extract_frame};
    use crate::protocols::pn532::error::Pn532Error;

    const GET_FIRMWARE_VERSION: [u8; 9] = [0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00];

    #[test]
    fn ack_and_nack() {
        assert_eq!(classify(&[0x00, 0xFF, 0x00, 0xFF, 0x00]), FrameKind::Acknowledge);
        assert_eq!(
            classify(&[0x00, 0xFF, 0xFF, 0x00, 0x00]),
            FrameKind::NegativeAcknowledge
        );
    }

    #[test]
    fn data_frame_payload() {
        assert_eq!(
            extract_frame(&GET_FIRMWARE_VERSION).unwrap(),
            Frame::Data(&[0xD4, 0x02])
        );
    }

    #[test]
    fn leading_garbage_is_skipped() {
        let mut bytes = vec![0xAA, 0x01];
        bytes.extend_from_slice(&GET_FIRMWARE_VERSION);
        assert_eq!(classify(&bytes), FrameKind::Data);
    }

    #[test]
    fn error_frame() {
        assert_eq!(
            extract_frame(&[0x00, 0x00, 0xFF, 0x01, 0xFF, 0x7F, 0x81, 0x00]).unwrap(),
            Frame::Error(0x7F)
        );
    }

    #[test]
    fn checksum_mismatch_is_invalid() {
        let mut bytes = GET_FIRMWARE_VERSION;
        bytes[7] = 0x2B;
        assert!(matches!(
            extract_frame(&bytes),
            Err(Pn532Error::ChecksumMismatch { .. })
        ));
        assert_eq!(classify(&bytes), FrameKind::Invalid);
    }

    #[test]
    fn bad_length_checksum_is_invalid() {
        let mut bytes = GET_FIRMWARE_VERSION;
        bytes[4] = 0xFD;
        assert_eq!(classify(&bytes), FrameKind::Invalid);
    }

    #[test]
    fn truncated_and_missing_start() {
        assert_eq!(classify(&GET_FIRMWARE_VERSION[..6]), FrameKind::Invalid);
        assert_eq!(extract_frame(&[0x00, 0x00, 0x00]), Err(Pn532Error::NoStartCode));
        assert_eq!(classify(&[]), FrameKind::Invalid);
    }
}
