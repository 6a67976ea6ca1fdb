// src/tlv.rs
//
// NDEF TLV envelope: tag byte, short (1-byte) or long (0xFF + 2-byte BE)
// length, message bytes, terminator. NULL bytes before the tag are legal
// padding with no length field.
use crate::error::NdefError;

/// TLV tag for an NDEF message.
pub const TLV_NDEF_MESSAGE: u8 = 0x03;
/// NULL TLV, padding before the message tag.
pub const TLV_NULL: u8 = 0x00;
/// Terminator TLV, written after the message bytes.
pub const TLV_TERMINATOR: u8 = 0xFE;
/// Marker byte selecting the long (2-byte) length form.
pub const TLV_LONG_LENGTH_MARKER: u8 = 0xFF;

/// Tag + 1-byte length.
pub const SHORT_TLV_SIZE: usize = 2;
/// Tag + marker + 2-byte length.
pub const LONG_TLV_SIZE: usize = 4;

/// Location of an NDEF message inside a linear memory image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvInfo {
    /// Offset of the first message byte.
    pub message_start: usize,
    /// Declared message length in bytes.
    pub message_length: usize,
}

/// Scans `image` for the NDEF message TLV and decodes its length field.
///
/// NULL padding before the tag is skipped. Any other byte in front of the
/// tag, or a scan that exhausts the image, is `NoTlv`; a length field that
/// runs past the image is `MalformedTlv`.
pub fn decode_tlv(image: &[u8]) -> Result<TlvInfo, NdefError> {
    let tag_at = ndef_tag_index(image)?;

    let length_byte = *image
        .get(tag_at + 1)
        .ok_or(NdefError::MalformedTlv {
            declared: SHORT_TLV_SIZE,
            available: image.len() - tag_at,
        })?;

    let (message_length, message_start) = if length_byte == TLV_LONG_LENGTH_MARKER {
        if tag_at + LONG_TLV_SIZE > image.len() {
            return Err(NdefError::MalformedTlv {
                declared: LONG_TLV_SIZE,
                available: image.len() - tag_at,
            });
        }
        let length = u16::from_be_bytes([image[tag_at + 2], image[tag_at + 3]]) as usize;
        (length, tag_at + LONG_TLV_SIZE)
    } else {
        (length_byte as usize, tag_at + SHORT_TLV_SIZE)
    };

    if message_start + message_length > image.len() {
        return Err(NdefError::MalformedTlv {
            declared: message_length,
            available: image.len() - message_start,
        });
    }

    Ok(TlvInfo {
        message_start,
        message_length,
    })
}

fn ndef_tag_index(image: &[u8]) -> Result<usize, NdefError> {
    for (i, &byte) in image.iter().enumerate() {
        match byte {
            TLV_NULL => continue,
            TLV_NDEF_MESSAGE => return Ok(i),
            _ => return Err(NdefError::NoTlv),
        }
    }
    Err(NdefError::NoTlv)
}

/// Bytes needed to store a TLV-wrapped message of `message_length` bytes:
/// header (short below 255, long otherwise) plus the 1-byte terminator,
/// rounded up to whole blocks.
pub fn buffer_size(message_length: usize, block_size: usize) -> usize {
    let header = if message_length < 0xFF {
        SHORT_TLV_SIZE
    } else {
        LONG_TLV_SIZE
    };
    let raw = header + message_length + 1;
    raw.div_ceil(block_size) * block_size
}

/// Wraps `message` in its TLV envelope, zero-padded to whole blocks.
///
/// The long length form carries at most 0xFFFF bytes; callers check the
/// tag's capacity first, which keeps messages far below that.
pub fn wrap(message: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!(message.len() <= 0xFFFF, "message too long for a TLV length field");

    let mut buf = vec![0u8; buffer_size(message.len(), block_size)];
    let mut at = 0;

    buf[at] = TLV_NDEF_MESSAGE;
    at += 1;
    if message.len() < 0xFF {
        buf[at] = message.len() as u8;
        at += 1;
    } else {
        buf[at] = TLV_LONG_LENGTH_MARKER;
        buf[at + 1..at + 3].copy_from_slice(&(message.len() as u16).to_be_bytes());
        at += 3;
    }

    buf[at..at + message.len()].copy_from_slice(message);
    at += message.len();
    buf[at] = TLV_TERMINATOR;

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_padding_is_skipped() {
        let image = [0x00, 0x00, 0x03, 0x05, 0xD0, 0x00, 0x00, 0xAA, 0xBB, 0xFE];
        let info = decode_tlv(&image).unwrap();
        assert_eq!(info.message_start, 4);
        assert_eq!(info.message_length, 5);
    }

    #[test]
    fn long_form_length_is_big_endian() {
        let mut image = vec![0x03, 0xFF, 0x01, 0x2C];
        image.extend_from_slice(&[0u8; 300]);
        image.push(0xFE);
        let info = decode_tlv(&image).unwrap();
        assert_eq!(info.message_start, 4);
        assert_eq!(info.message_length, 300);
    }

    #[test]
    fn non_null_byte_before_tag_is_no_tlv() {
        assert_eq!(decode_tlv(&[0x00, 0x7F, 0x03, 0x00]), Err(NdefError::NoTlv));
    }

    #[test]
    fn all_null_image_is_no_tlv() {
        assert_eq!(decode_tlv(&[0x00; 32]), Err(NdefError::NoTlv));
    }

    #[test]
    fn overrunning_length_is_malformed() {
        let image = [0x03, 0x10, 0xD0, 0x00, 0x00];
        assert!(matches!(
            decode_tlv(&image),
            Err(NdefError::MalformedTlv { declared: 16, .. })
        ));
    }

    #[test]
    fn tag_with_no_length_byte_is_malformed() {
        assert!(matches!(decode_tlv(&[0x00, 0x03]), Err(NdefError::MalformedTlv { .. })));
    }

    #[test]
    fn buffer_size_short_long_boundary() {
        // 254: 2-byte header + 254 + terminator = 257 -> 272 (17 blocks)
        assert_eq!(buffer_size(254, 16), 272);
        // 255: 4-byte header + 255 + terminator = 260 -> 272 (17 blocks)
        assert_eq!(buffer_size(255, 16), 272);
        // raw byte counts (block size 1 disables rounding): 2-byte header
        // plus terminator below 255, 4-byte header from 255 up
        assert_eq!(buffer_size(254, 1), 257);
        assert_eq!(buffer_size(255, 1), 260);
        // rounding to whole blocks
        assert_eq!(buffer_size(13, 16), 16);
        assert_eq!(buffer_size(14, 16), 32);
    }

    #[test]
    fn wrap_short_form() {
        let wrapped = wrap(&[0xD0, 0x00, 0x00], 16);
        assert_eq!(wrapped.len(), 16);
        assert_eq!(&wrapped[..6], &[0x03, 0x03, 0xD0, 0x00, 0x00, 0xFE]);
        assert!(wrapped[6..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn wrap_long_form() {
        let message = vec![0xAB; 300];
        let wrapped = wrap(&message, 16);
        assert_eq!(&wrapped[..4], &[0x03, 0xFF, 0x01, 0x2C]);
        assert_eq!(wrapped[4 + 300], 0xFE);
        assert_eq!(wrapped.len() % 16, 0);
    }

    #[test]
    fn wrap_output_decodes_back() {
        let message = vec![0x11; 80];
        let info = decode_tlv(&wrap(&message, 16)).unwrap();
        assert_eq!(info.message_start, 2);
        assert_eq!(info.message_length, 80);
    }
}
