use crate::protocols::common::checksum::sum8;

use super::error::Iso14230Error;
use super::layout;
use super::reader::Iso14230Reader;

/// Validated KWP2000 frame. Addresses are zero when the format byte carries
/// no address information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KwpFrame<'a> {
    pub target: u8,
    pub source: u8,
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KwpMessage {
    Request {
        service: u8,
        sub_function: Option<u8>,
    },
    PositiveResponse {
        /// Service id with the response flag cleared.
        service: u8,
        sub_function: Option<u8>,
    },
    NegativeResponse {
        rejected_service: u8,
        code: u8,
    },
}

/// Validate framing and checksum. Bytes after the checksum are ignored.
pub fn parse_frame(bytes: &[u8]) -> Result<KwpFrame<'_>, Iso14230Error> {
    let reader = Iso14230Reader::new(bytes);
    reader.require_len(layout::MIN_FRAME_LEN)?;

    let format = reader.read_u8(layout::FORMAT_OFFSET)?;
    let mut header_len = layout::FORMAT_OFFSET + 1;
    let (target, source) = if format & layout::FORMAT_ADDRESS_FLAG != 0 {
        header_len += layout::ADDRESS_LEN;
        (
            reader.read_u8(layout::TARGET_OFFSET)?,
            reader.read_u8(layout::SOURCE_OFFSET)?,
        )
    } else {
        (0, 0)
    };

    let mut length = (format & layout::FORMAT_LENGTH_MASK) as usize;
    if length == 0 {
        length = reader.read_u8(header_len)? as usize;
        header_len += 1;
    }

    let checksum_offset = header_len + length;
    reader.require_len(checksum_offset + layout::CHECKSUM_LEN)?;

    let computed = sum8(reader.read_slice(0..checksum_offset)?);
    let carried = reader.read_u8(checksum_offset)?;
    if computed != carried {
        return Err(Iso14230Error::ChecksumMismatch { computed, carried });
    }

    Ok(KwpFrame {
        target,
        source,
        payload: reader.read_slice(header_len..checksum_offset)?,
    })
}

/// Classify the service payload of a validated frame.
pub fn parse_message(payload: &[u8]) -> Result<KwpMessage, Iso14230Error> {
    let reader = Iso14230Reader::new(payload);
    let service = reader
        .read_u8(layout::SERVICE_ID_OFFSET)
        .map_err(|_| Iso14230Error::EmptyPayload)?;

    if service == layout::NEGATIVE_RESPONSE_SID {
        reader.require_len(layout::RESPONSE_CODE_OFFSET + 1)?;
        return Ok(KwpMessage::NegativeResponse {
            rejected_service: reader.read_u8(layout::REJECTED_SERVICE_OFFSET)?,
            code: reader.read_u8(layout::RESPONSE_CODE_OFFSET)?,
        });
    }

    let sub_function = reader.read_u8(layout::SUB_FUNCTION_OFFSET).ok();
    if service & layout::RESPONSE_FLAG != 0 {
        Ok(KwpMessage::PositiveResponse {
            service: service & !layout::RESPONSE_FLAG,
            sub_function,
        })
    } else {
        Ok(KwpMessage::Request {
            service,
            sub_function,
        })
    }
}
