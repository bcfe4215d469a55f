//! Length field framing.
//!
//! Two forms are supported. With a fixed `length_size` the length is a plain
//! unsigned integer of that many bytes. Without one, the self-describing form is
//! used:
//!
//! ```text
//! 0xxxxxxx                  length < 128, one byte
//! 1kkkkkkk <k length bytes> 1 <= k <= 15
//! ```

use crate::{Endian, TlvError, TlvResult};

/// Largest value that fits the short self-describing form.
pub const SHORT_FORM_MAX: usize = 0x7F;
/// Marker bit of the long self-describing form.
pub const LONG_FORM_MARKER: u8 = 0x80;
/// Most length bytes a long-form marker may announce.
pub const MAX_LONG_FORM_BYTES: usize = 15;

/// Minimum number of bytes able to hold `len`.
fn required_bytes(len: usize) -> usize {
    let bits = usize::BITS - len.leading_zeros();
    bits.div_ceil(8) as usize
}

/// Encode the length field for a payload of `len` bytes.
pub fn encode_length(len: usize, length_size: Option<usize>, endian: Endian) -> TlvResult<Vec<u8>> {
    let required = required_bytes(len);
    if required > MAX_LONG_FORM_BYTES {
        return Err(TlvError::LengthTooLarge(len));
    }
    match length_size {
        Some(width) => {
            if width < required {
                return Err(TlvError::LengthOverflow { len, width });
            }
            endian.write_uint(len as u128, width)
        }
        None if len <= SHORT_FORM_MAX => Ok(vec![len as u8]),
        None => {
            let mut field = vec![LONG_FORM_MARKER + required as u8];
            field.extend(endian.write_uint(len as u128, required)?);
            Ok(field)
        }
    }
}

/// Decode a length field at the start of `data`.
///
/// Returns the payload length and the number of bytes the field occupied.
pub fn decode_length(
    data: &[u8],
    length_size: Option<usize>,
    endian: Endian,
) -> TlvResult<(usize, usize)> {
    let truncated = |needed: usize| TlvError::Truncated {
        offset: 0,
        needed,
        available: data.len(),
    };
    let (digits, consumed) = match length_size {
        Some(width) => (data.get(..width).ok_or_else(|| truncated(width))?, width),
        None => {
            let first = *data.first().ok_or_else(|| truncated(1))?;
            if first & LONG_FORM_MARKER == 0 {
                return Ok((usize::from(first), 1));
            }
            let count = usize::from(first & !LONG_FORM_MARKER);
            if count == 0 || count > MAX_LONG_FORM_BYTES {
                return Err(TlvError::InvalidLengthMarker(first));
            }
            let digits = data.get(1..1 + count).ok_or_else(|| truncated(1 + count))?;
            (digits, 1 + count)
        }
    };
    let len = endian.read_uint(digits);
    let len = usize::try_from(len).map_err(|_| TlvError::LengthUnrepresentable {
        width: digits.len(),
    })?;
    Ok((len, consumed))
}
