//! Scalar values and their little-endian wire encoding.

use std::fmt;

use crate::error::MdpError;
use crate::types::MdpDataType;

/// Maximum byte length of a string parameter on the wire.
pub const MAX_STRING_LEN: usize = 255;

/// A decoded MDP parameter value.
///
/// One variant per allowed scalar type, so read/write dispatch is an
/// exhaustive match instead of runtime type inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum MdpValue {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
}

impl MdpValue {
    /// The scalar type of this value.
    pub fn data_type(&self) -> MdpDataType {
        match self {
            MdpValue::Bool(_) => MdpDataType::Bool,
            MdpValue::I16(_) => MdpDataType::I16,
            MdpValue::I32(_) => MdpDataType::I32,
            MdpValue::I64(_) => MdpDataType::I64,
            MdpValue::U8(_) => MdpDataType::U8,
            MdpValue::U16(_) => MdpDataType::U16,
            MdpValue::U32(_) => MdpDataType::U32,
            MdpValue::U64(_) => MdpDataType::U64,
            MdpValue::F32(_) => MdpDataType::F32,
            MdpValue::F64(_) => MdpDataType::F64,
            MdpValue::String(_) => MdpDataType::String,
        }
    }

    /// Encodes the value for the wire.
    ///
    /// Scalars are little-endian; strings are raw ASCII bytes with their
    /// exact length (the target pads its side of the buffer).
    pub fn to_wire(&self) -> Result<Vec<u8>, MdpError> {
        let bytes = match self {
            MdpValue::Bool(v) => vec![u8::from(*v)],
            MdpValue::U8(v) => vec![*v],
            MdpValue::I16(v) => v.to_le_bytes().to_vec(),
            MdpValue::I32(v) => v.to_le_bytes().to_vec(),
            MdpValue::I64(v) => v.to_le_bytes().to_vec(),
            MdpValue::U16(v) => v.to_le_bytes().to_vec(),
            MdpValue::U32(v) => v.to_le_bytes().to_vec(),
            MdpValue::U64(v) => v.to_le_bytes().to_vec(),
            MdpValue::F32(v) => v.to_le_bytes().to_vec(),
            MdpValue::F64(v) => v.to_le_bytes().to_vec(),
            MdpValue::String(s) => {
                if !s.is_ascii() {
                    return Err(MdpError::InvalidString(format!(
                        "'{s}' contains non-ASCII characters"
                    )));
                }
                if s.len() > MAX_STRING_LEN {
                    return Err(MdpError::InvalidString(format!(
                        "{} bytes exceeds the {MAX_STRING_LEN}-byte limit",
                        s.len()
                    )));
                }
                s.as_bytes().to_vec()
            }
        };
        Ok(bytes)
    }

    /// Decodes a scalar reply of the given type.
    ///
    /// The buffer must have exactly the encoded size of the type; string
    /// replies go through [`MdpValue::from_wire_string`] instead.
    pub fn from_wire(data_type: MdpDataType, buf: &[u8]) -> Result<Self, MdpError> {
        let Some(expected) = data_type.byte_len() else {
            return Self::from_wire_string(buf);
        };
        if buf.len() != expected {
            return Err(MdpError::ReplyLength {
                expected,
                actual: buf.len(),
            });
        }

        let value = match data_type {
            MdpDataType::Bool => MdpValue::Bool(buf[0] != 0),
            MdpDataType::U8 => MdpValue::U8(buf[0]),
            MdpDataType::I16 => MdpValue::I16(i16::from_le_bytes([buf[0], buf[1]])),
            MdpDataType::U16 => MdpValue::U16(u16::from_le_bytes([buf[0], buf[1]])),
            MdpDataType::I32 => {
                MdpValue::I32(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
            }
            MdpDataType::U32 => {
                MdpValue::U32(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
            }
            MdpDataType::F32 => {
                MdpValue::F32(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
            }
            MdpDataType::I64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(buf);
                MdpValue::I64(i64::from_le_bytes(bytes))
            }
            MdpDataType::U64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(buf);
                MdpValue::U64(u64::from_le_bytes(bytes))
            }
            MdpDataType::F64 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(buf);
                MdpValue::F64(f64::from_le_bytes(bytes))
            }
            // Handled by the early return above.
            MdpDataType::String => return Self::from_wire_string(buf),
        };
        Ok(value)
    }

    /// Decodes a fixed-length string reply: ASCII, cut at the first NUL,
    /// trailing padding trimmed.
    pub fn from_wire_string(buf: &[u8]) -> Result<Self, MdpError> {
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let content = &buf[..end];
        if !content.is_ascii() {
            return Err(MdpError::Decode(
                "string reply contains non-ASCII bytes".to_string(),
            ));
        }

        let text = std::str::from_utf8(content)
            .map_err(|e| MdpError::Decode(e.to_string()))?
            .trim_end()
            .to_string();
        Ok(MdpValue::String(text))
    }
}

impl fmt::Display for MdpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdpValue::Bool(v) => write!(f, "{v}"),
            MdpValue::I16(v) => write!(f, "{v}"),
            MdpValue::I32(v) => write!(f, "{v}"),
            MdpValue::I64(v) => write!(f, "{v}"),
            MdpValue::U8(v) => write!(f, "{v}"),
            MdpValue::U16(v) => write!(f, "{v}"),
            MdpValue::U32(v) => write!(f, "{v}"),
            MdpValue::U64(v) => write!(f, "{v}"),
            MdpValue::F32(v) => write!(f, "{v}"),
            MdpValue::F64(v) => write!(f, "{v}"),
            MdpValue::String(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MdpValue {
                fn from(v: $ty) -> Self {
                    MdpValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for MdpValue {
    fn from(v: &str) -> Self {
        MdpValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_encode_little_endian() {
        assert_eq!(MdpValue::U16(0x1234).to_wire().unwrap(), vec![0x34, 0x12]);
        assert_eq!(
            MdpValue::I32(-2).to_wire().unwrap(),
            vec![0xFE, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            MdpValue::U64(1).to_wire().unwrap(),
            vec![1, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(MdpValue::Bool(true).to_wire().unwrap(), vec![1]);
        assert_eq!(
            MdpValue::F32(123.456).to_wire().unwrap(),
            123.456f32.to_le_bytes().to_vec()
        );
    }

    #[test]
    fn scalars_round_trip() {
        let samples = [
            MdpValue::Bool(false),
            MdpValue::U8(0xAB),
            MdpValue::I16(-1234),
            MdpValue::U16(40000),
            MdpValue::I32(-7),
            MdpValue::U32(0xDEAD_BEEF),
            MdpValue::I64(i64::MIN),
            MdpValue::U64(u64::MAX),
            MdpValue::F32(1.5),
            MdpValue::F64(-2.25),
        ];
        for value in samples {
            let wire = value.to_wire().unwrap();
            let back = MdpValue::from_wire(value.data_type(), &wire).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn wrong_length_replies_are_rejected() {
        let err = MdpValue::from_wire(MdpDataType::U32, &[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            MdpError::ReplyLength {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn strings_are_trimmed_at_nul_and_padding() {
        let value = MdpValue::from_wire_string(b"em0\0\0\0garbage").unwrap();
        assert_eq!(value, MdpValue::String("em0".to_string()));

        let value = MdpValue::from_wire_string(b"hostname  ").unwrap();
        assert_eq!(value, MdpValue::String("hostname".to_string()));
    }

    #[test]
    fn non_ascii_strings_are_validation_errors() {
        let err = MdpValue::String("grüße".to_string()).to_wire().unwrap_err();
        assert!(matches!(err, MdpError::InvalidString(_)));

        let oversized = "x".repeat(MAX_STRING_LEN + 1);
        let err = MdpValue::String(oversized).to_wire().unwrap_err();
        assert!(matches!(err, MdpError::InvalidString(_)));
    }
}
