//! Tag maps: per-tag names and expected value types.
//!
//! A tag map lets a node recover typed values while decoding and lets callers
//! address entries by name. Entries either name a registered [`ValueKind`] or
//! carry a nested tag map describing the payload of a nested node.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{TlvError, TlvOptions, TlvResult, ValueKind};

/// Expected type of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagType {
    Kind(ValueKind),
    Nested(Arc<TagMap>),
}

/// Configuration of a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagConfig {
    pub name: Option<String>,
    pub tag_type: TagType,
}

impl TagConfig {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: Some(name.into()),
            tag_type: TagType::Kind(kind),
        }
    }

    pub fn nested(name: impl Into<String>, map: impl Into<Arc<TagMap>>) -> Self {
        Self {
            name: Some(name.into()),
            tag_type: TagType::Nested(map.into()),
        }
    }

    /// Unnamed entry, typed only.
    pub fn unnamed(tag_type: TagType) -> Self {
        Self {
            name: None,
            tag_type,
        }
    }
}

/// Mapping from tag to [`TagConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: BTreeMap<u64, TagConfig>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`TagMap::insert`] for a registered kind.
    pub fn with(mut self, tag: u64, name: impl Into<String>, kind: ValueKind) -> Self {
        self.insert(tag, TagConfig::new(name, kind));
        self
    }

    /// Builder form of [`TagMap::insert`] for a nested tag map.
    pub fn with_nested(mut self, tag: u64, name: impl Into<String>, map: TagMap) -> Self {
        self.insert(tag, TagConfig::nested(name, map));
        self
    }

    /// Add or replace the configuration of `tag`.
    pub fn insert(&mut self, tag: u64, config: TagConfig) -> Option<TagConfig> {
        self.entries.insert(tag, config)
    }

    pub fn get(&self, tag: u64) -> Option<&TagConfig> {
        self.entries.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &TagConfig)> {
        self.entries.iter().map(|(tag, config)| (*tag, config))
    }

    /// Name configured for `tag`, if any.
    pub fn name_of(&self, tag: u64) -> Option<&str> {
        self.entries.get(&tag).and_then(|c| c.name.as_deref())
    }

    /// First tag, in ascending order, whose configured name is `name`.
    pub fn tag_for_name(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, c)| c.name.as_deref() == Some(name))
            .map(|(tag, _)| *tag)
    }

    /// Entries that describe nested nodes.
    pub fn nested_entries(&self) -> impl Iterator<Item = (u64, &Arc<TagMap>)> {
        self.entries.iter().filter_map(|(tag, c)| match &c.tag_type {
            TagType::Nested(map) => Some((*tag, map)),
            TagType::Kind(_) => None,
        })
    }

    /// Check that every tag, nested ones included, fits `options.tag_size`.
    pub fn validate(&self, options: &TlvOptions) -> TlvResult<()> {
        for (tag, config) in &self.entries {
            options.check_tag(*tag).map_err(|_| {
                TlvError::InvalidTagMap(format!(
                    "tag {:#x} does not fit in {} byte(s)",
                    tag, options.tag_size
                ))
            })?;
            if let TagType::Nested(map) = &config.tag_type {
                map.validate(options)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<(u64, TagConfig)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (u64, TagConfig)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagMap {
        TagMap::new()
            .with(0x01, "NUM_POINTS", ValueKind::Int32)
            .with(0x03, "NAME", ValueKind::Utf8)
            .with_nested(
                0x07,
                "RELATED",
                TagMap::new().with(0x01, "LEAF", ValueKind::Int8),
            )
    }

    #[test]
    fn test_name_resolution() {
        let map = sample();
        assert_eq!(map.tag_for_name("NAME"), Some(0x03));
        assert_eq!(map.tag_for_name("MISSING"), None);
        assert_eq!(map.name_of(0x01), Some("NUM_POINTS"));
        assert_eq!(map.name_of(0x02), None);
    }

    #[test]
    fn test_nested_entries() {
        let map = sample();
        let nested: Vec<u64> = map.nested_entries().map(|(tag, _)| tag).collect();
        assert_eq!(nested, vec![0x07]);
    }

    #[test]
    fn test_validate_tag_width() {
        let options = TlvOptions::default();
        assert!(sample().validate(&options).is_ok());

        let wide = TagMap::new().with(0x100, "WIDE", ValueKind::Bytes);
        assert!(matches!(
            wide.validate(&options),
            Err(TlvError::InvalidTagMap(_))
        ));
        assert!(wide.validate(&options.with_tag_size(2)).is_ok());

        let nested_wide = TagMap::new().with_nested(0x01, "OUTER", wide);
        assert!(nested_wide.validate(&options).is_err());
    }

    #[test]
    fn test_collect_from_pairs() {
        let map: TagMap = vec![(0x05, TagConfig::new("VERSION", ValueKind::Bytes))]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
    }
}
