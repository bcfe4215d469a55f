//! Presence markers: a tag followed by a zero length.

use std::sync::Arc;

use crate::{TagMap, TlvError, TlvOptions, TlvResult, Value};

/// A tag with a zero-length value.
///
/// It never holds entries; [`EmptyTlv::set`] always fails. It is not a
/// [`Value`] and is not stored inside a [`TlvNode`](crate::TlvNode): its encoding
/// decodes as an empty bytes entry, or an empty child under a nested tag.
#[derive(Debug, Clone)]
pub struct EmptyTlv {
    tag: u64,
    options: TlvOptions,
    tag_map: Option<Arc<TagMap>>,
}

impl EmptyTlv {
    pub fn new(tag: u64, options: TlvOptions) -> TlvResult<Self> {
        options.validate()?;
        options.check_tag(tag)?;
        Ok(Self {
            tag,
            options,
            tag_map: None,
        })
    }

    /// Tag map used to name the tag in tree output.
    pub fn with_tag_map(mut self, map: impl Into<Arc<TagMap>>) -> Self {
        self.tag_map = Some(map.into());
        self
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn options(&self) -> &TlvOptions {
        &self.options
    }

    pub fn set(&mut self, _tag: u64, _value: impl Into<Value>) -> TlvResult<()> {
        Err(TlvError::EmptyNodeIsImmutable(self.tag))
    }

    /// Tag bytes followed by a zero length of `length_size` bytes (one in auto
    /// mode).
    pub fn encode(&self) -> TlvResult<Vec<u8>> {
        let mut data = self.options.encode_tag(self.tag)?;
        let len_size = self.options.length_size.unwrap_or(1);
        data.extend(self.options.endian.write_uint(0, len_size)?);
        Ok(data)
    }

    pub fn render_tree(&self, offset: usize, use_names: bool) -> TlvResult<String> {
        let mut tree = String::new();
        if offset != 0 {
            tree.push_str("\r\n");
        }
        let mut label = hex::encode(self.options.encode_tag(self.tag)?);
        if use_names {
            if let Some(name) = self.tag_map.as_deref().and_then(|m| m.name_of(self.tag)) {
                label = name.to_string();
            }
        }
        tree.push_str(&format!("{}{}\r\n", " ".repeat(offset), label));
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TlvNode, ValueKind};

    #[test]
    fn test_empty_encoding() {
        let options = TlvOptions::default().with_length_size(Some(2));
        let empty = EmptyTlv::new(0x08, options).unwrap();
        assert_eq!(empty.encode().unwrap(), vec![0x08, 0x00, 0x00]);

        let auto = EmptyTlv::new(0x08, TlvOptions::default()).unwrap();
        assert_eq!(auto.encode().unwrap(), vec![0x08, 0x00]);
    }

    #[test]
    fn test_empty_rejects_entries() {
        let mut empty = EmptyTlv::new(0x08, TlvOptions::default()).unwrap();
        let err = empty.set(1, 10u32).unwrap_err();
        assert_eq!(err, TlvError::EmptyNodeIsImmutable(0x08));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_empty_tag_out_of_range() {
        assert!(EmptyTlv::new(0x100, TlvOptions::default()).is_err());
    }

    #[test]
    fn test_empty_tree() {
        let map = TagMap::new().with(0x09, "Empty", ValueKind::Tlv);
        let empty = EmptyTlv::new(0x09, TlvOptions::default())
            .unwrap()
            .with_tag_map(map);
        assert_eq!(empty.render_tree(0, false).unwrap(), "09\r\n");
        assert_eq!(empty.render_tree(0, true).unwrap(), "Empty\r\n");
        assert_eq!(empty.render_tree(2, false).unwrap(), "\r\n  09\r\n");
    }

    #[test]
    fn test_empty_decodes_as_zero_length_entry() {
        let options = TlvOptions::default().with_length_size(Some(2));
        let bytes = EmptyTlv::new(0x08, options).unwrap().encode().unwrap();
        let mut node = TlvNode::with_options(options).unwrap();
        node.decode(&bytes).unwrap();
        assert_eq!(node.get(0x08).unwrap().as_bytes(), Some(&[][..]));
    }

    #[test]
    fn test_empty_decodes_as_empty_child_under_nested_tag() {
        let bytes = EmptyTlv::new(0x09, TlvOptions::default())
            .unwrap()
            .encode()
            .unwrap();
        let mut node = TlvNode::new();
        node.set_local_tag_map(TagMap::new().with_nested(0x09, "Empty", TagMap::new()))
            .unwrap();
        node.decode(&bytes).unwrap();

        let child = node.get(0x09).unwrap().as_node().unwrap();
        assert!(child.is_empty());
        assert_eq!(node.encode().unwrap(), bytes);
    }
}
