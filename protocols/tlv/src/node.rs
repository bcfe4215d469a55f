//! The recursive TLV container.

use core::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::codec::codec_for;
use crate::length::{decode_length, encode_length};
use crate::{
    BoundaryPolicy, Entries, TagIter, TagMap, TagType, TlvError, TlvOptions, TlvResult, Value,
    ValueKind,
};

/// Rendered values longer than this are replaced by [`TRIMMED`].
pub const MAX_RENDERED_VALUE: usize = 300;
/// Placeholder for over-long rendered values.
pub const TRIMMED: &str = "*trimmed*";

/// Tree line terminator.
const EOL: &str = "\r\n";

/// Key for [`TlvNode::get_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Tag(u64),
    Name(&'a str),
}

impl From<u64> for Key<'_> {
    fn from(tag: u64) -> Self {
        Key::Tag(tag)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Name(name)
    }
}

/// An ordered mapping of tags to values that encodes to, and decodes from, a
/// TLV byte stream.
///
/// Entries keep their insertion order, which is also the encoding order.
/// Typed decoding relies on a tag map: the node's local one if set, otherwise the
/// default one it was built with.
///
/// Children created by [`TlvNode::set_local_tag_map`] are placeholders until
/// something is written into them. Placeholders are reachable through the
/// accessors but are neither encoded nor rendered, and the first value stored
/// under their tag takes the position of that write.
#[derive(Debug, Clone, Default)]
pub struct TlvNode {
    options: TlvOptions,
    default_map: Option<Arc<TagMap>>,
    local_map: Option<Arc<TagMap>>,
    entries: Vec<(u64, Value)>,
    placeholder: bool,
}

impl TlvNode {
    /// Node with default options and no tag map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TlvOptions) -> TlvResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Attach the default tag map, shared with every child this node creates.
    pub fn with_default_tag_map(mut self, map: impl Into<Arc<TagMap>>) -> TlvResult<Self> {
        let map = map.into();
        map.validate(&self.options)?;
        self.default_map = Some(map);
        Ok(self)
    }

    pub fn options(&self) -> &TlvOptions {
        &self.options
    }

    /// Tag map in effect: the local one, else the default one.
    pub fn tag_map(&self) -> Option<&TagMap> {
        self.local_map.as_deref().or(self.default_map.as_deref())
    }

    pub fn local_tag_map(&self) -> Option<&TagMap> {
        self.local_map.as_deref()
    }

    pub fn default_tag_map(&self) -> Option<&TagMap> {
        self.default_map.as_deref()
    }

    /// Empty node sharing this node's options and default tag map.
    pub fn new_equivalent(&self) -> TlvNode {
        TlvNode {
            options: self.options,
            default_map: self.default_map.clone(),
            local_map: None,
            entries: Vec::new(),
            placeholder: false,
        }
    }

    /// Whether this node was materialized from a tag map and nothing has been
    /// written to it or below it since.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder && self.entries.iter().all(|(_, value)| is_placeholder(value))
    }

    /// Attach a local tag map, overriding the default one.
    ///
    /// Every nested entry of `map` gets a child node carrying the nested map. A
    /// missing child is created empty. On error the node is left untouched.
    pub fn set_local_tag_map(&mut self, map: impl Into<Arc<TagMap>>) -> TlvResult<()> {
        let map = map.into();
        self.check_tag_map(&map)?;
        self.apply_tag_map(map);
        Ok(())
    }

    fn check_tag_map(&self, map: &TagMap) -> TlvResult<()> {
        for (tag, config) in map.iter() {
            self.options.check_tag(tag).map_err(|_| {
                TlvError::InvalidTagMap(format!(
                    "tag {:#x} does not fit in {} byte(s)",
                    tag, self.options.tag_size
                ))
            })?;
            let TagType::Nested(nested) = &config.tag_type else {
                continue;
            };
            match self.find(tag) {
                Some(Value::Node(child)) => child.check_tag_map(nested)?,
                Some(other) => {
                    return Err(TlvError::InvalidTagMap(format!(
                        "tag {:#x} holds a {} value, not a nested node",
                        tag,
                        other.kind()
                    )))
                }
                None => nested.validate(&self.options)?,
            }
        }
        Ok(())
    }

    fn apply_tag_map(&mut self, map: Arc<TagMap>) {
        for (tag, nested) in map.nested_entries() {
            let index = match self.position(tag) {
                Some(index) => index,
                None => {
                    debug!("Materializing nested node for tag {:#x}", tag);
                    let mut child = self.new_equivalent();
                    child.placeholder = true;
                    self.entries.push((tag, Value::Node(child)));
                    self.entries.len() - 1
                }
            };
            if let Value::Node(child) = &mut self.entries[index].1 {
                child.apply_tag_map(nested.clone());
            }
        }
        self.local_map = Some(map);
    }

    /// Tag configured under `name` in the active tag map.
    pub fn resolve(&self, name: &str) -> TlvResult<u64> {
        let map = self
            .tag_map()
            .ok_or_else(|| TlvError::NoTagMap(name.to_string()))?;
        map.tag_for_name(name)
            .ok_or_else(|| TlvError::UnknownName(name.to_string()))
    }

    fn position(&self, tag: u64) -> Option<usize> {
        self.entries.iter().position(|(t, _)| *t == tag)
    }

    fn find(&self, tag: u64) -> Option<&Value> {
        self.entries.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    // Replaces in place so the original position is kept. A placeholder gives
    // up its slot and the new value goes last.
    fn insert(&mut self, tag: u64, value: Value) {
        self.placeholder = false;
        match self.position(tag) {
            Some(index) if is_placeholder(&self.entries[index].1) => {
                self.entries.remove(index);
                self.entries.push((tag, value));
            }
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// Set the value of `tag`.
    pub fn set(&mut self, tag: u64, value: impl Into<Value>) -> TlvResult<()> {
        self.options.check_tag(tag)?;
        self.insert(tag, value.into());
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> TlvResult<()> {
        let tag = self.resolve(name)?;
        self.set(tag, value)
    }

    pub fn get(&self, tag: u64) -> TlvResult<&Value> {
        self.find(tag).ok_or(TlvError::MissingTag(tag))
    }

    pub fn get_mut(&mut self, tag: u64) -> TlvResult<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v)
            .ok_or(TlvError::MissingTag(tag))
    }

    pub fn get_by_name(&self, name: &str) -> TlvResult<&Value> {
        self.get(self.resolve(name)?)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> TlvResult<&mut Value> {
        let tag = self.resolve(name)?;
        self.get_mut(tag)
    }

    /// Follow `path` through nested nodes.
    ///
    /// Every step but the last must land on a nested node.
    pub fn get_path(&self, path: &[Key<'_>]) -> TlvResult<&Value> {
        let (last, parents) = path.split_last().ok_or(TlvError::EmptyPath)?;
        let mut node = self;
        for key in parents {
            let value = node.get_key(*key)?;
            node = value.as_node().ok_or(TlvError::TypeMismatch {
                expected: ValueKind::Tlv,
                found: value.kind(),
            })?;
        }
        node.get_key(*last)
    }

    fn get_key(&self, key: Key<'_>) -> TlvResult<&Value> {
        match key {
            Key::Tag(tag) => self.get(tag),
            Key::Name(name) => self.get_by_name(name),
        }
    }

    pub fn contains(&self, tag: u64) -> bool {
        self.position(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level tags in insertion order.
    pub fn tags(&self) -> TagIter<'_> {
        TagIter::new(&self.entries)
    }

    /// Top-level entries in insertion order.
    pub fn entries(&self) -> Entries<'_> {
        Entries::new(&self.entries)
    }

    fn written_entries(&self) -> impl Iterator<Item = &(u64, Value)> {
        self.entries.iter().filter(|(_, value)| !is_placeholder(value))
    }

    /// Serialize every entry as `tag || length || payload`.
    pub fn encode(&self) -> TlvResult<Vec<u8>> {
        let mut data = Vec::new();
        for (tag, value) in self.written_entries() {
            let payload = codec_for(value.kind()).serialize(value, self.options.endian)?;
            data.extend(self.options.encode_tag(*tag)?);
            data.extend(encode_length(
                payload.len(),
                self.options.length_size,
                self.options.endian,
            )?);
            trace!(
                "Encoded tag {:#x} ({}) with {} byte payload",
                tag,
                value.kind(),
                payload.len()
            );
            data.extend(payload);
        }
        Ok(data)
    }

    /// Parse `data` and append its records to this node.
    ///
    /// Nothing is added unless the whole buffer parses.
    pub fn decode(&mut self, data: &[u8]) -> TlvResult<()> {
        let min_size = self.options.min_record_size();
        if data.len() < min_size {
            return Err(TlvError::BufferTooShort {
                min: min_size,
                actual: data.len(),
            });
        }
        debug!("Decoding {} bytes", data.len());

        let mut parsed = Vec::new();
        let mut offset = 0;
        while self.has_next_record(data.len() - offset, min_size) {
            let (tag, value, consumed) = self.decode_record(data, offset)?;
            parsed.push((tag, value));
            offset += consumed;
        }
        if offset < data.len() {
            warn!(
                "Dropping {} trailing byte(s) at offset {}",
                data.len() - offset,
                offset
            );
        }

        debug!("Decoded {} record(s)", parsed.len());
        for (tag, value) in parsed {
            self.insert(tag, value);
        }
        Ok(())
    }

    /// Same as [`TlvNode::decode`] for input given as a list of integers.
    pub fn decode_items<I, T>(&mut self, items: I) -> TlvResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let data = items
            .into_iter()
            .map(|item| {
                let item = item.into();
                u8::try_from(item).map_err(|_| TlvError::NotAByte(item))
            })
            .collect::<TlvResult<Vec<u8>>>()?;
        self.decode(&data)
    }

    fn has_next_record(&self, remaining: usize, min_size: usize) -> bool {
        match self.options.boundary {
            BoundaryPolicy::Inclusive => remaining > 0,
            BoundaryPolicy::Legacy => remaining > min_size,
        }
    }

    fn decode_record(&self, data: &[u8], offset: usize) -> TlvResult<(u64, Value, usize)> {
        let record = &data[offset..];
        let truncated = |needed: usize| TlvError::Truncated {
            offset,
            needed,
            available: record.len(),
        };

        let tag_size = self.options.tag_size;
        let tag_bytes = record.get(..tag_size).ok_or_else(|| truncated(tag_size))?;
        let tag = self.options.endian.read_uint(tag_bytes) as u64;

        let (len, len_width) = decode_length(
            &record[tag_size..],
            self.options.length_size,
            self.options.endian,
        )
        .map_err(|e| match e {
            TlvError::Truncated { needed, .. } => truncated(tag_size + needed),
            other => other,
        })?;

        let start = tag_size + len_width;
        let end = start.checked_add(len).ok_or(TlvError::LengthTooLarge(len))?;
        let payload = record.get(start..end).ok_or_else(|| truncated(end))?;
        trace!("Record at offset {}: tag {:#x}, {} byte payload", offset, tag, len);

        let value = self.decode_value(tag, payload)?;
        Ok((tag, value, end))
    }

    fn decode_value(&self, tag: u64, payload: &[u8]) -> TlvResult<Value> {
        let tag_type = self.tag_map().and_then(|m| m.get(tag)).map(|c| &c.tag_type);
        match tag_type {
            Some(TagType::Nested(nested)) => {
                let mut child = self.new_equivalent();
                child.set_local_tag_map(nested.clone())?;
                codec_for(ValueKind::Tlv).deserialize(payload, child)
            }
            Some(TagType::Kind(kind)) => {
                codec_for(*kind).deserialize(payload, self.new_equivalent())
            }
            None => Ok(Value::Bytes(payload.to_vec())),
        }
    }

    /// Whether both nodes encode to the same bytes.
    pub fn encoded_eq(&self, other: &TlvNode) -> TlvResult<bool> {
        Ok(self.encode()? == other.encode()?)
    }

    /// Render the node as an indented tree, one entry per line.
    ///
    /// Nested calls (`offset != 0`) start with a line break so the child block
    /// sits below its parent's tag. Tags are shown as hex unless `use_names` is
    /// set and the active tag map names them.
    pub fn render_tree(&self, offset: usize, use_names: bool, show_size: bool) -> TlvResult<String> {
        let mut tree = String::new();
        if offset != 0 {
            tree.push_str(EOL);
        }
        let pad = " ".repeat(offset);
        for (tag, value) in self.written_entries() {
            let codec = codec_for(value.kind());
            let mut rendered = codec.render(value, offset, use_names)?;
            if rendered.chars().count() > MAX_RENDERED_VALUE {
                rendered = TRIMMED.to_string();
            }

            let mut label = hex::encode(self.options.encode_tag(*tag)?);
            if use_names {
                if let Some(name) = self.tag_map().and_then(|m| m.name_of(*tag)) {
                    label = name.to_string();
                }
            }

            if show_size {
                let size = codec.serialize(value, self.options.endian)?.len();
                tree.push_str(&format!("{pad}{label} (len:{size}):{rendered}{EOL}"));
            } else {
                tree.push_str(&format!("{pad}{label}: {rendered}{EOL}"));
            }
        }
        Ok(tree)
    }

    /// [`TlvNode::render_tree`] from the top level, tags in hex.
    pub fn tree(&self) -> TlvResult<String> {
        self.render_tree(0, false, false)
    }
}

fn is_placeholder(value: &Value) -> bool {
    matches!(value, Value::Node(node) if node.is_placeholder())
}

impl fmt::Display for TlvNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree().map_err(|_| fmt::Error)?;
        f.write_str(&tree)
    }
}

impl<'a> IntoIterator for &'a TlvNode {
    type Item = u64;
    type IntoIter = TagIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags()
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
