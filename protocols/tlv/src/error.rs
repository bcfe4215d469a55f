//! Error types for TLV operations

use thiserror::Error;

use crate::ValueKind;

/// Broad category of a [`TlvError`].
///
/// Callers that only care about the class of failure (bad input vs. missing
/// entry, for instance) can match on this instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected configuration, tag, schema or mutation.
    Validation,
    /// Buffer or payload size outside what the framing can express.
    Size,
    /// Missing name or tag.
    Lookup,
    /// Value does not match the codec it was handed to.
    Type,
    /// Malformed wire data.
    Parse,
}

/// Errors that can occur during TLV operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("tag {tag:#x} does not fit in {tag_size} byte(s)")]
    TagOutOfRange { tag: u64, tag_size: usize },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("invalid tag map: {0}")]
    InvalidTagMap(String),
    #[error("empty-value node {0:#x} cannot hold entries")]
    EmptyNodeIsImmutable(u64),
    #[error("path must name at least one entry")]
    EmptyPath,

    #[error("data must be at least {min} bytes long, got {actual}")]
    BufferTooShort { min: usize, actual: usize },
    #[error("payload of {len} bytes does not fit in a {width}-byte length field")]
    LengthOverflow { len: usize, width: usize },
    #[error("payload of {0} bytes needs more than 15 length bytes")]
    LengthTooLarge(usize),
    #[error("{width}-byte length field holds a value beyond the addressable size")]
    LengthUnrepresentable { width: usize },

    #[error("no tag map is active, cannot resolve name {0:?}")]
    NoTagMap(String),
    #[error("name {0:?} not found in tag map")]
    UnknownName(String),
    #[error("tag {0:#x} not present")]
    MissingTag(u64),

    #[error("expected a {expected} value, got {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
    #[error("value {value} does not fit in {width} byte(s)")]
    IntegerOverflow { value: u128, width: usize },
    #[error("integer payload of {len} bytes exceeds {width} byte(s)")]
    IntegerWidth { width: usize, len: usize },
    #[error("invalid {encoding} text: {reason}")]
    InvalidText {
        encoding: &'static str,
        reason: String,
    },
    #[error("input item {0} is not a byte (0..=255)")]
    NotAByte(i64),

    #[error("record at offset {offset} needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid length marker {0:#04x}")]
    InvalidLengthMarker(u8),
}

impl TlvError {
    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TlvError::TagOutOfRange { .. }
            | TlvError::InvalidOptions(_)
            | TlvError::InvalidTagMap(_)
            | TlvError::EmptyNodeIsImmutable(_)
            | TlvError::EmptyPath => ErrorKind::Validation,
            TlvError::BufferTooShort { .. }
            | TlvError::LengthOverflow { .. }
            | TlvError::LengthTooLarge(_)
            | TlvError::LengthUnrepresentable { .. } => ErrorKind::Size,
            TlvError::NoTagMap(_) | TlvError::UnknownName(_) | TlvError::MissingTag(_) => {
                ErrorKind::Lookup
            }
            TlvError::TypeMismatch { .. }
            | TlvError::IntegerOverflow { .. }
            | TlvError::IntegerWidth { .. }
            | TlvError::InvalidText { .. }
            | TlvError::NotAByte(_) => ErrorKind::Type,
            TlvError::Truncated { .. } | TlvError::InvalidLengthMarker(_) => ErrorKind::Parse,
        }
    }
}

/// Result type for TLV operations
pub type TlvResult<T> = Result<T, TlvError>;
