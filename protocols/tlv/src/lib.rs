//! Tag-Length-Value codec
//!
//! Serializes an ordered mapping of integer tags to typed values into a compact
//! byte stream and parses such streams back, recursively for nested nodes.
//!
//! ```text
//! record := tag(tag_size bytes) length-field payload(length bytes)
//! stream := record*
//! ```
//!
//! The length field is either a fixed number of bytes or self-describing (see
//! [`length`]). Tags, fixed length fields and integers share the node's
//! [`Endian`].
//!
//! Without type information decoded payloads are kept as raw bytes. A
//! [`TagMap`] names tags and declares their [`ValueKind`] (or a nested tag map),
//! which lets [`TlvNode::decode`] rebuild integers, text and nested nodes.
//!
//! ```
//! use tlv_codec::{TagMap, TlvNode, TlvOptions, ValueKind};
//!
//! let map = TagMap::new().with(0x01, "NUM_POINTS", ValueKind::Int32);
//! let options = TlvOptions::default().with_length_size(Some(2));
//!
//! let mut node = TlvNode::with_options(options)?.with_default_tag_map(map)?;
//! node.set_by_name("NUM_POINTS", 10u32)?;
//! let bytes = node.encode()?;
//! assert_eq!(bytes, [0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x0A]);
//!
//! let mut decoded = node.new_equivalent();
//! decoded.decode(&bytes)?;
//! assert_eq!(decoded.get(0x01)?.as_u64(), Some(10));
//! # Ok::<(), tlv_codec::TlvError>(())
//! ```

pub mod codec;
pub mod empty;
pub mod error;
pub mod iter;
pub mod length;
pub mod node;
pub mod options;
pub mod schema;
pub mod value;

pub use codec::{codec_for, ValueCodec};
pub use empty::EmptyTlv;
pub use error::{ErrorKind, TlvError, TlvResult};
pub use iter::{Entries, TagIter};
pub use node::{Key, TlvNode};
pub use options::{BoundaryPolicy, Endian, TlvOptions};
pub use schema::{TagConfig, TagMap, TagType};
pub use value::{IntWidth, Integer, Text, TextEncoding, Value, ValueKind};
