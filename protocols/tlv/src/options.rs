//! Framing options shared by every node of a tree.

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::{TlvError, TlvResult};

/// Widest tag or fixed length field supported, in bytes.
pub const MAX_FIELD_WIDTH: usize = 8;

/// Byte order applied to tags, fixed-width lengths and integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with_serde", serde(rename_all = "lowercase"))]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// Write `value` as an unsigned integer of exactly `width` bytes.
    pub fn write_uint(self, value: u128, width: usize) -> TlvResult<Vec<u8>> {
        if width < 16 && value >> (width * 8) != 0 {
            return Err(TlvError::IntegerOverflow { value, width });
        }
        let be = value.to_be_bytes();
        let mut out = vec![0u8; width.saturating_sub(be.len())];
        out.extend_from_slice(&be[be.len() - width.min(be.len())..]);
        if self == Endian::Little {
            out.reverse();
        }
        Ok(out)
    }

    /// Read an unsigned integer spanning all of `bytes`.
    ///
    /// Callers bound `bytes` to at most 16 significant bytes.
    pub fn read_uint(self, bytes: &[u8]) -> u128 {
        let fold = |acc: u128, b: &u8| (acc << 8) | u128::from(*b);
        match self {
            Endian::Big => bytes.iter().fold(0, fold),
            Endian::Little => bytes.iter().rev().fold(0, fold),
        }
    }
}

/// How `decode` treats a trailing region of at most one minimal record.
///
/// A minimal record is `tag_size + (length_size or 1)` bytes: a tag followed by a
/// zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with_serde", serde(rename_all = "lowercase"))]
pub enum BoundaryPolicy {
    /// Parse until the buffer is exhausted. Trailing minimal records are kept and
    /// a fragment shorter than a minimal record is an error.
    #[default]
    Inclusive,
    /// Stop as soon as no more than a minimal record remains and drop that tail.
    /// Matches older decoders, which lose a lone empty record.
    Legacy,
}

/// Construction parameters of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with_serde", serde(default))]
pub struct TlvOptions {
    /// Bytes per tag.
    pub tag_size: usize,
    /// Bytes per length field, `None` for the self-describing form.
    pub length_size: Option<usize>,
    pub endian: Endian,
    /// Spaces per nesting level in tree output.
    pub indent: usize,
    pub boundary: BoundaryPolicy,
}

impl Default for TlvOptions {
    fn default() -> Self {
        Self {
            tag_size: 1,
            length_size: None,
            endian: Endian::Big,
            indent: 4,
            boundary: BoundaryPolicy::Inclusive,
        }
    }
}

impl TlvOptions {
    pub fn with_tag_size(mut self, tag_size: usize) -> Self {
        self.tag_size = tag_size;
        self
    }

    pub fn with_length_size(mut self, length_size: Option<usize>) -> Self {
        self.length_size = length_size;
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Check that tag and length widths are usable.
    pub fn validate(&self) -> TlvResult<()> {
        if self.tag_size == 0 || self.tag_size > MAX_FIELD_WIDTH {
            return Err(TlvError::InvalidOptions(format!(
                "tag_size must be between 1 and {}, got {}",
                MAX_FIELD_WIDTH, self.tag_size
            )));
        }
        if let Some(len) = self.length_size {
            if len == 0 || len > MAX_FIELD_WIDTH {
                return Err(TlvError::InvalidOptions(format!(
                    "length_size must be between 1 and {}, got {}",
                    MAX_FIELD_WIDTH, len
                )));
            }
        }
        Ok(())
    }

    /// Size of the smallest record: a tag and a zero length.
    pub fn min_record_size(&self) -> usize {
        self.length_size.unwrap_or(1) + self.tag_size
    }

    /// Whether `tag` can be represented in `tag_size` bytes.
    pub fn check_tag(&self, tag: u64) -> TlvResult<()> {
        if self.tag_size < MAX_FIELD_WIDTH && tag >> (self.tag_size * 8) != 0 {
            return Err(TlvError::TagOutOfRange {
                tag,
                tag_size: self.tag_size,
            });
        }
        Ok(())
    }

    /// Tag bytes as they appear on the wire.
    pub fn encode_tag(&self, tag: u64) -> TlvResult<Vec<u8>> {
        self.check_tag(tag)?;
        self.endian.write_uint(u128::from(tag), self.tag_size)
    }
}
