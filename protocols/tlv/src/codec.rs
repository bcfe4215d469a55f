//! Value codec registry.
//!
//! Each [`ValueKind`] maps to exactly one [`ValueCodec`] through [`codec_for`].
//! Codecs turn a [`Value`] into its wire payload, turn a payload back into a
//! value, and render a value for [`TlvNode::render_tree`].

use crate::{
    Endian, IntWidth, Integer, TextEncoding, TlvError, TlvNode, TlvResult, Value, ValueKind,
};

/// Serialization strategy for one kind of value.
pub trait ValueCodec: Sync {
    /// Kind this codec handles.
    fn kind(&self) -> ValueKind;

    /// Wire payload of `value`.
    fn serialize(&self, value: &Value, endian: Endian) -> TlvResult<Vec<u8>>;

    /// Rebuild a value from its payload.
    ///
    /// `target` is a fresh node equivalent to the one being decoded. Nested
    /// codecs decode into it; the others only read its options.
    fn deserialize(&self, bytes: &[u8], target: TlvNode) -> TlvResult<Value>;

    /// Human readable form used in tree output.
    fn render(&self, value: &Value, offset: usize, use_names: bool) -> TlvResult<String>;

    fn mismatch(&self, value: &Value) -> TlvError {
        TlvError::TypeMismatch {
            expected: self.kind(),
            found: value.kind(),
        }
    }
}

/// Fixed width unsigned integers.
pub struct IntCodec(pub IntWidth);

/// Text in one of the supported encodings.
pub struct TextCodec(pub TextEncoding);

/// Raw bytes, rendered as hex.
pub struct BytesCodec;

/// Nested nodes.
pub struct NodeCodec;

static INT8: IntCodec = IntCodec(IntWidth::One);
static INT16: IntCodec = IntCodec(IntWidth::Two);
static INT32: IntCodec = IntCodec(IntWidth::Four);
static INT64: IntCodec = IntCodec(IntWidth::Eight);
static ASCII: TextCodec = TextCodec(TextEncoding::Ascii);
static UTF8: TextCodec = TextCodec(TextEncoding::Utf8);
static UTF16: TextCodec = TextCodec(TextEncoding::Utf16);
static UTF32: TextCodec = TextCodec(TextEncoding::Utf32);
static BYTES: BytesCodec = BytesCodec;
static NODE: NodeCodec = NodeCodec;

/// Codec registered for `kind`.
pub fn codec_for(kind: ValueKind) -> &'static dyn ValueCodec {
    match kind {
        ValueKind::Int8 => &INT8,
        ValueKind::Int16 => &INT16,
        ValueKind::Int32 => &INT32,
        ValueKind::Int64 => &INT64,
        ValueKind::Ascii => &ASCII,
        ValueKind::Utf8 => &UTF8,
        ValueKind::Utf16 => &UTF16,
        ValueKind::Utf32 => &UTF32,
        ValueKind::Bytes => &BYTES,
        ValueKind::Tlv => &NODE,
    }
}

impl ValueCodec for IntCodec {
    fn kind(&self) -> ValueKind {
        self.0.kind()
    }

    fn serialize(&self, value: &Value, endian: Endian) -> TlvResult<Vec<u8>> {
        match value {
            Value::Int(i) if i.width == self.0 => {
                endian.write_uint(u128::from(i.value), self.0.bytes())
            }
            other => Err(self.mismatch(other)),
        }
    }

    // Short payloads are accepted and read as if left padded with zeros.
    fn deserialize(&self, bytes: &[u8], target: TlvNode) -> TlvResult<Value> {
        if bytes.len() > self.0.bytes() {
            return Err(TlvError::IntegerWidth {
                width: self.0.bytes(),
                len: bytes.len(),
            });
        }
        let value = target.options().endian.read_uint(bytes) as u64;
        Ok(Value::Int(Integer {
            value,
            width: self.0,
        }))
    }

    fn render(&self, value: &Value, _offset: usize, _use_names: bool) -> TlvResult<String> {
        match value {
            Value::Int(i) => Ok(i.value.to_string()),
            other => Err(self.mismatch(other)),
        }
    }
}

fn invalid_text(encoding: &'static str, reason: impl ToString) -> TlvError {
    TlvError::InvalidText {
        encoding,
        reason: reason.to_string(),
    }
}

/// Strip a byte order mark, returning the endianness it announces.
fn split_bom<'a>(bytes: &'a [u8], be_bom: &[u8], le_bom: &[u8]) -> (Option<Endian>, &'a [u8]) {
    if let Some(rest) = bytes.strip_prefix(be_bom) {
        (Some(Endian::Big), rest)
    } else if let Some(rest) = bytes.strip_prefix(le_bom) {
        (Some(Endian::Little), rest)
    } else {
        (None, bytes)
    }
}

impl TextCodec {
    fn encode_text(&self, text: &str, endian: Endian) -> TlvResult<Vec<u8>> {
        match self.0 {
            TextEncoding::Ascii => {
                if !text.is_ascii() {
                    return Err(invalid_text("ascii", "non-ascii character"));
                }
                Ok(text.as_bytes().to_vec())
            }
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16 => Ok(text
                .encode_utf16()
                .flat_map(|unit| match endian {
                    Endian::Big => unit.to_be_bytes(),
                    Endian::Little => unit.to_le_bytes(),
                })
                .collect()),
            TextEncoding::Utf32 => Ok(text
                .chars()
                .flat_map(|c| match endian {
                    Endian::Big => u32::from(c).to_be_bytes(),
                    Endian::Little => u32::from(c).to_le_bytes(),
                })
                .collect()),
        }
    }

    fn decode_text(&self, bytes: &[u8], endian: Endian) -> TlvResult<String> {
        match self.0 {
            TextEncoding::Ascii => {
                if !bytes.is_ascii() {
                    return Err(invalid_text("ascii", "byte above 0x7f"));
                }
                String::from_utf8(bytes.to_vec()).map_err(|e| invalid_text("ascii", e))
            }
            TextEncoding::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|e| invalid_text("utf8", e))
            }
            TextEncoding::Utf16 => {
                let (bom, body) = split_bom(bytes, &[0xFE, 0xFF], &[0xFF, 0xFE]);
                if body.len() % 2 != 0 {
                    return Err(invalid_text("utf16", "odd number of bytes"));
                }
                let endian = bom.unwrap_or(endian);
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|c| endian.read_uint(c) as u16)
                    .collect();
                String::from_utf16(&units).map_err(|e| invalid_text("utf16", e))
            }
            TextEncoding::Utf32 => {
                let (bom, body) = split_bom(bytes, &[0, 0, 0xFE, 0xFF], &[0xFF, 0xFE, 0, 0]);
                if body.len() % 4 != 0 {
                    return Err(invalid_text("utf32", "length not a multiple of 4"));
                }
                let endian = bom.unwrap_or(endian);
                body.chunks_exact(4)
                    .map(|c| {
                        let scalar = endian.read_uint(c) as u32;
                        char::from_u32(scalar).ok_or_else(|| {
                            invalid_text("utf32", format!("invalid scalar {scalar:#x}"))
                        })
                    })
                    .collect()
            }
        }
    }
}

impl ValueCodec for TextCodec {
    fn kind(&self) -> ValueKind {
        self.0.kind()
    }

    fn serialize(&self, value: &Value, endian: Endian) -> TlvResult<Vec<u8>> {
        match value {
            Value::Text(t) if t.encoding == self.0 => self.encode_text(&t.value, endian),
            other => Err(self.mismatch(other)),
        }
    }

    fn deserialize(&self, bytes: &[u8], target: TlvNode) -> TlvResult<Value> {
        let text = self.decode_text(bytes, target.options().endian)?;
        Ok(Value::text(text, self.0))
    }

    fn render(&self, value: &Value, _offset: usize, _use_names: bool) -> TlvResult<String> {
        match value {
            Value::Text(t) => Ok(t.value.clone()),
            other => Err(self.mismatch(other)),
        }
    }
}

impl ValueCodec for BytesCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Bytes
    }

    fn serialize(&self, value: &Value, _endian: Endian) -> TlvResult<Vec<u8>> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(self.mismatch(other)),
        }
    }

    fn deserialize(&self, bytes: &[u8], _target: TlvNode) -> TlvResult<Value> {
        Ok(Value::Bytes(bytes.to_vec()))
    }

    fn render(&self, value: &Value, _offset: usize, _use_names: bool) -> TlvResult<String> {
        match value {
            Value::Bytes(b) => Ok(hex::encode(b)),
            other => Err(self.mismatch(other)),
        }
    }
}

impl ValueCodec for NodeCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Tlv
    }

    fn serialize(&self, value: &Value, _endian: Endian) -> TlvResult<Vec<u8>> {
        match value {
            Value::Node(node) => node.encode(),
            other => Err(self.mismatch(other)),
        }
    }

    // An empty payload is an empty child, not a short buffer.
    fn deserialize(&self, bytes: &[u8], mut target: TlvNode) -> TlvResult<Value> {
        if !bytes.is_empty() {
            target.decode(bytes)?;
        }
        Ok(Value::Node(target))
    }

    fn render(&self, value: &Value, offset: usize, use_names: bool) -> TlvResult<String> {
        match value {
            Value::Node(node) => {
                node.render_tree(offset + node.options().indent, use_names, false)
            }
            other => Err(self.mismatch(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TlvOptions;

    fn target(endian: Endian) -> TlvNode {
        TlvNode::with_options(TlvOptions::default().with_endian(endian)).unwrap()
    }

    #[test]
    fn test_registry_matches_kind() {
        for kind in [
            ValueKind::Int8,
            ValueKind::Int64,
            ValueKind::Utf16,
            ValueKind::Bytes,
            ValueKind::Tlv,
        ] {
            assert_eq!(codec_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_int_codec() {
        let codec = codec_for(ValueKind::Int32);
        let payload = codec.serialize(&Value::from(10u32), Endian::Big).unwrap();
        assert_eq!(payload, vec![0, 0, 0, 0x0A]);
        let payload = codec.serialize(&Value::from(10u32), Endian::Little).unwrap();
        assert_eq!(payload, vec![0x0A, 0, 0, 0]);

        let value = codec.deserialize(&[0, 0, 0, 0xFF], target(Endian::Big)).unwrap();
        assert_eq!(value.as_u64(), Some(255));
        let value = codec.deserialize(&[0xFF, 0, 0, 0], target(Endian::Little)).unwrap();
        assert_eq!(value.as_u64(), Some(255));
    }

    #[test]
    fn test_int_codec_rejects_other_kinds() {
        let codec = codec_for(ValueKind::Int32);
        assert_eq!(
            codec.serialize(&Value::from(1u8), Endian::Big).unwrap_err(),
            TlvError::TypeMismatch {
                expected: ValueKind::Int32,
                found: ValueKind::Int8
            }
        );
        assert!(codec.serialize(&Value::from("x"), Endian::Big).is_err());
        assert_eq!(
            codec.deserialize(&[0; 5], target(Endian::Big)).unwrap_err(),
            TlvError::IntegerWidth { width: 4, len: 5 }
        );
    }

    #[test]
    fn test_short_int_payload() {
        let value = codec_for(ValueKind::Int64)
            .deserialize(&[0x01, 0x00], target(Endian::Big))
            .unwrap();
        assert_eq!(value.as_u64(), Some(256));
        assert_eq!(value.kind(), ValueKind::Int64);
    }

    #[test]
    fn test_utf8_codec() {
        let codec = codec_for(ValueKind::Utf8);
        assert_eq!(
            codec.serialize(&Value::from("teste"), Endian::Big).unwrap(),
            b"teste".to_vec()
        );
        let err = codec.deserialize(&[0xC3, 0x28], target(Endian::Big)).unwrap_err();
        assert!(matches!(err, TlvError::InvalidText { encoding: "utf8", .. }));
    }

    #[test]
    fn test_ascii_codec() {
        let codec = codec_for(ValueKind::Ascii);
        let value = Value::text("ok", TextEncoding::Ascii);
        assert_eq!(codec.serialize(&value, Endian::Big).unwrap(), b"ok".to_vec());
        let bad = Value::text("é", TextEncoding::Ascii);
        assert!(codec.serialize(&bad, Endian::Big).is_err());
        assert!(codec.deserialize(&[0x80], target(Endian::Big)).is_err());
    }

    #[test]
    fn test_utf16_codec() {
        let codec = codec_for(ValueKind::Utf16);
        let value = Value::text("hi", TextEncoding::Utf16);
        let be = codec.serialize(&value, Endian::Big).unwrap();
        assert_eq!(be, vec![0x00, b'h', 0x00, b'i']);
        let le = codec.serialize(&value, Endian::Little).unwrap();
        assert_eq!(le, vec![b'h', 0x00, b'i', 0x00]);

        let decoded = codec.deserialize(&be, target(Endian::Big)).unwrap();
        assert_eq!(decoded.as_str(), Some("hi"));
        // a BOM wins over the node endianness
        let with_bom = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        let decoded = codec.deserialize(&with_bom, target(Endian::Big)).unwrap();
        assert_eq!(decoded.as_str(), Some("hi"));
        assert!(codec.deserialize(&[0x00], target(Endian::Big)).is_err());
    }

    #[test]
    fn test_utf32_codec() {
        let codec = codec_for(ValueKind::Utf32);
        let value = Value::text("é", TextEncoding::Utf32);
        let be = codec.serialize(&value, Endian::Big).unwrap();
        assert_eq!(be, vec![0x00, 0x00, 0x00, 0xE9]);
        let decoded = codec.deserialize(&be, target(Endian::Big)).unwrap();
        assert_eq!(decoded.as_str(), Some("é"));
        assert!(codec
            .deserialize(&[0x00, 0x11, 0x00, 0x00], target(Endian::Big))
            .is_err());
    }

    #[test]
    fn test_bytes_codec_renders_hex() {
        let codec = codec_for(ValueKind::Bytes);
        let value = Value::from(vec![0x01, 0xAB, 0xFF]);
        assert_eq!(codec.render(&value, 0, false).unwrap(), "01abff");
        assert_eq!(
            codec.serialize(&value, Endian::Big).unwrap(),
            vec![0x01, 0xAB, 0xFF]
        );
    }

    #[test]
    fn test_node_codec_empty_payload() {
        let value = codec_for(ValueKind::Tlv)
            .deserialize(&[], target(Endian::Big))
            .unwrap();
        assert!(value.as_node().unwrap().is_empty());
    }
}
