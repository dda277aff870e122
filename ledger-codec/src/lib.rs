//! Varint delta codec (C1).
//!
//! Each signed integer is encoded as an unsigned-magnitude LEB128-style
//! varint (seven data bits per byte, MSB continuation) followed by a
//! one-byte sign flag (`0x00` positive/zero, `0x01` negative). A sequence
//! is the bare concatenation of element encodings — no length prefix.

use ledger_core::errors::CodecError;

/// Encode a sequence of signed integers with no length prefix.
pub fn encode(values: &[i64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for &v in values {
        encode_one(v, &mut out);
    }
    out
}

fn encode_one(v: i64, out: &mut Vec<u8>) {
    let mut magnitude = v.unsigned_abs();
    loop {
        let mut byte = (magnitude & 0x7f) as u8;
        magnitude >>= 7;
        if magnitude != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
    out.push(if v < 0 { 0x01 } else { 0x00 });
}

/// Decode a byte stream until exhausted. Fails on a truncated varint/sign
/// byte or on a sign byte outside `{0, 1}`.
pub fn decode(bytes: &[u8]) -> Result<Vec<i64>, CodecError> {
    let mut result = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let mut magnitude: u64 = 0;
        let mut shift = 0u32;
        loop {
            if i >= bytes.len() {
                return Err(CodecError::Truncated);
            }
            let byte = bytes[i];
            i += 1;
            magnitude |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }

        if i >= bytes.len() {
            return Err(CodecError::Truncated);
        }
        let sign = bytes[i];
        i += 1;

        let value = match sign {
            0x00 => magnitude as i64,
            0x01 => -(magnitude as i64),
            other => return Err(CodecError::BadSignByte { value: other }),
        };
        result.push(value);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_sequence_round_trips() {
        assert_eq!(decode(&encode(&[])).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn zero_and_small_values() {
        let values = vec![0, 1, -1, 127, -127, 128, -128];
        assert_eq!(decode(&encode(&values)).unwrap(), values);
    }

    #[test]
    fn large_magnitude() {
        let values = vec![1_000_000, -1_000_000, i32::MAX as i64, -(i32::MAX as i64)];
        assert_eq!(decode(&encode(&values)).unwrap(), values);
    }

    #[test]
    fn truncated_varint_errors() {
        // A continuation byte with no following byte.
        let bytes = vec![0x80];
        assert!(matches!(decode(&bytes), Err(CodecError::Truncated)));
    }

    #[test]
    fn missing_sign_byte_errors() {
        // A complete magnitude varint (MSB=0) but nothing after it.
        let bytes = vec![0x05];
        assert!(matches!(decode(&bytes), Err(CodecError::Truncated)));
    }

    #[test]
    fn bad_sign_byte_errors() {
        let bytes = vec![0x05, 0x02];
        assert!(matches!(decode(&bytes), Err(CodecError::BadSignByte { value: 2 })));
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(values in proptest::collection::vec(-2_147_483_647i64..=2_147_483_647i64, 0..200)) {
            let decoded = decode(&encode(&values)).unwrap();
            prop_assert_eq!(decoded, values);
        }
    }
}
