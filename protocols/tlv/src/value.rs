//! Values a node can hold.

use core::fmt;
use core::str::FromStr;

use crate::{TlvError, TlvNode, TlvResult};

/// Every kind of value with a registered codec.
///
/// Tag maps declare one of these (or a nested tag map) per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Ascii,
    Utf8,
    Utf16,
    Utf32,
    Bytes,
    Tlv,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int8 => "int8",
            ValueKind::Int16 => "int16",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Ascii => "ascii",
            ValueKind::Utf8 => "utf8",
            ValueKind::Utf16 => "utf16",
            ValueKind::Utf32 => "utf32",
            ValueKind::Bytes => "bytes",
            ValueKind::Tlv => "tlv",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = TlvError;

    /// Accepts the canonical names plus the short aliases `int`, `str` and `TLV`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" => Ok(ValueKind::Int8),
            "int16" => Ok(ValueKind::Int16),
            "int" | "int32" => Ok(ValueKind::Int32),
            "int64" => Ok(ValueKind::Int64),
            "ascii" => Ok(ValueKind::Ascii),
            "str" | "utf8" | "utf-8" => Ok(ValueKind::Utf8),
            "utf16" | "utf-16" => Ok(ValueKind::Utf16),
            "utf32" | "utf-32" => Ok(ValueKind::Utf32),
            "bytes" => Ok(ValueKind::Bytes),
            "tlv" | "TLV" => Ok(ValueKind::Tlv),
            other => Err(TlvError::InvalidTagMap(format!("unknown value type {other:?}"))),
        }
    }
}

/// Byte width of an integer value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl IntWidth {
    pub fn bytes(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> ValueKind {
        match self {
            IntWidth::One => ValueKind::Int8,
            IntWidth::Two => ValueKind::Int16,
            IntWidth::Four => ValueKind::Int32,
            IntWidth::Eight => ValueKind::Int64,
        }
    }
}

/// Unsigned integer with the width it is encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer {
    pub value: u64,
    pub width: IntWidth,
}

impl Integer {
    /// Build an integer, checking that `value` fits `width`.
    pub fn new(value: u64, width: IntWidth) -> TlvResult<Self> {
        if width != IntWidth::Eight && value >> (width.bytes() * 8) != 0 {
            return Err(TlvError::IntegerOverflow {
                value: u128::from(value),
                width: width.bytes(),
            });
        }
        Ok(Self { value, width })
    }
}

/// Character encoding of a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Ascii,
    Utf8,
    Utf16,
    Utf32,
}

impl TextEncoding {
    pub fn kind(self) -> ValueKind {
        match self {
            TextEncoding::Ascii => ValueKind::Ascii,
            TextEncoding::Utf8 => ValueKind::Utf8,
            TextEncoding::Utf16 => ValueKind::Utf16,
            TextEncoding::Utf32 => ValueKind::Utf32,
        }
    }
}

/// Text with the encoding it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Text {
    pub value: String,
    pub encoding: TextEncoding,
}

/// A value stored under a tag.
#[derive(Debug, Clone)]
pub enum Value {
    Int(Integer),
    Text(Text),
    Bytes(Vec<u8>),
    Node(TlvNode),
}

impl Value {
    pub fn int(value: u64, width: IntWidth) -> TlvResult<Self> {
        Integer::new(value, width).map(Value::Int)
    }

    pub fn text(value: impl Into<String>, encoding: TextEncoding) -> Self {
        Value::Text(Text {
            value: value.into(),
            encoding,
        })
    }

    /// Kind used to pick the codec for this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(i) => i.width.kind(),
            Value::Text(t) => t.encoding.kind(),
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Node(_) => ValueKind::Tlv,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(i) => Some(i.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(&t.value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&TlvNode> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut TlvNode> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(Integer {
            value: u64::from(v),
            width: IntWidth::One,
        })
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(Integer {
            value: u64::from(v),
            width: IntWidth::Two,
        })
    }
}

/// `u32` is the default integer width.
impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(Integer {
            value: u64::from(v),
            width: IntWidth::Four,
        })
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(Integer {
            value: v,
            width: IntWidth::Eight,
        })
    }
}

impl From<Integer> for Value {
    fn from(v: Integer) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v, TextEncoding::Utf8)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::text(v, TextEncoding::Utf8)
    }
}

impl From<Text> for Value {
    fn from(v: Text) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<TlvNode> for Value {
    fn from(v: TlvNode) -> Self {
        Value::Node(v)
    }
}
