//! Packing of integer property items into raw X property payloads
//!
//! XInput properties carry items of 8, 16 or 32 bits. Payloads use native
//! byte order, one element per item, no padding.

use crate::error::CodecError;

/// Format width of a device property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyWidth {
    Bits8,
    Bits16,
    Bits32,
}

impl PropertyWidth {
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

impl TryFrom<u8> for PropertyWidth {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            other => Err(CodecError::UnsupportedWidth(other)),
        }
    }
}

/// Encode `values` at `width` bits each, truncating anything wider
pub fn encode(values: &[i32], width: u8) -> Result<Vec<u8>, CodecError> {
    Ok(encode_with(values, PropertyWidth::try_from(width)?))
}

pub fn encode_with(values: &[i32], width: PropertyWidth) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * width.bytes());
    for &v in values {
        match width {
            PropertyWidth::Bits8 => buf.push(v as u8),
            PropertyWidth::Bits16 => buf.extend_from_slice(&(v as i16).to_ne_bytes()),
            PropertyWidth::Bits32 => buf.extend_from_slice(&v.to_ne_bytes()),
        }
    }
    buf
}

/// Decode `count` sign-extended items of `width` bits from `buf`
pub fn decode(buf: &[u8], width: u8, count: usize) -> Result<Vec<i32>, CodecError> {
    decode_with(buf, PropertyWidth::try_from(width)?, count)
}

pub fn decode_with(buf: &[u8], width: PropertyWidth, count: usize) -> Result<Vec<i32>, CodecError> {
    let expected = count * width.bytes();
    if buf.len() != expected {
        return Err(CodecError::MalformedPayload {
            expected,
            actual: buf.len(),
        });
    }

    let items = match width {
        PropertyWidth::Bits8 => buf.iter().map(|&b| i32::from(b as i8)).collect(),
        PropertyWidth::Bits16 => buf
            .chunks_exact(2)
            .map(|c| i32::from(i16::from_ne_bytes([c[0], c[1]])))
            .collect(),
        PropertyWidth::Bits32 => buf
            .chunks_exact(4)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sizes() {
        assert_eq!(encode(&[1, 0], 8).unwrap().len(), 2);
        assert_eq!(encode(&[1, 0, 7], 16).unwrap().len(), 6);
        assert_eq!(encode(&[0, 4095, 0, 4095], 32).unwrap().len(), 16);
    }

    #[test]
    fn test_unsupported_width() {
        assert_eq!(encode(&[1], 24), Err(CodecError::UnsupportedWidth(24)));
        assert_eq!(encode(&[1], 0), Err(CodecError::UnsupportedWidth(0)));
        assert_eq!(decode(&[1], 4, 1), Err(CodecError::UnsupportedWidth(4)));
    }

    #[test]
    fn test_8bit_does_not_spill_into_16bit() {
        // One byte per item, nothing written past it
        let buf = encode(&[1, 1], 8).unwrap();
        assert_eq!(buf, vec![1, 1]);
    }

    #[test]
    fn test_truncation() {
        assert_eq!(encode(&[0x1ff], 8).unwrap(), vec![0xff]);
        let buf = encode(&[0x1_0002], 16).unwrap();
        assert_eq!(decode(&buf, 16, 1).unwrap(), vec![2]);
    }

    #[test]
    fn test_roundtrip_within_width() {
        let cases: [(&[i32], u8); 3] = [
            (&[0, 1, -1, 127, -128], 8),
            (&[0, 300, -300, i16::MAX as i32, i16::MIN as i32], 16),
            (&[100, 3900, 50, 4000, i32::MIN, i32::MAX], 32),
        ];
        for (values, width) in cases {
            let buf = encode(values, width).unwrap();
            assert_eq!(decode(&buf, width, values.len()).unwrap(), values);
        }
    }

    #[test]
    fn test_decode_length_mismatch() {
        let err = decode(&[0; 15], 32, 4).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedPayload {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode(&[], 32, 0).unwrap().is_empty());
    }
}
