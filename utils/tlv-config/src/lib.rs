//! Load TLV framing options and tag maps from TOML.
//!
//! ```toml
//! tag_size = 1
//! length_size = 2
//! endian = "big"
//!
//! [tags.1]
//! name = "NUM_POINTS"
//! type = "int"
//!
//! [tags.0x07]
//! name = "RELATED"
//! [tags.0x07.type.1]
//! name = "LEAF"
//! type = "int8"
//! ```
//!
//! Every top-level option is optional and falls back to [`TlvOptions::default`].
//! A tag's `type` is either a kind name or a table describing a nested tag map.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use config::{Config, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tlv_codec::{TagConfig, TagMap, TagType, TlvError, TlvNode, TlvOptions, TlvResult, ValueKind};
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid tag map: {0}")]
    InvalidSchema(String),
    #[error(transparent)]
    Tlv(#[from] TlvError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(flatten)]
    options: TlvOptions,
    #[serde(default)]
    tags: BTreeMap<String, RawTagConfig>,
}

#[derive(Debug, Deserialize)]
struct RawTagConfig {
    name: Option<String>,
    #[serde(rename = "type")]
    tag_type: RawTagType,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTagType {
    Kind(String),
    Nested(BTreeMap<String, RawTagConfig>),
}

/// Options and optional tag map read from a config file.
#[derive(Debug, Clone)]
pub struct TlvFileConfig {
    pub options: TlvOptions,
    pub tag_map: Option<Arc<TagMap>>,
}

impl TlvFileConfig {
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw: RawConfig = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        debug!("Loaded TLV config from {}", path.display());
        Self::from_raw(raw)
    }

    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(s)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        raw.options.validate()?;
        let tag_map = if raw.tags.is_empty() {
            None
        } else {
            let map = build_tag_map(&raw.tags)?;
            map.validate(&raw.options)?;
            debug!("Tag map with {} top-level tag(s)", map.len());
            Some(Arc::new(map))
        };
        Ok(Self {
            options: raw.options,
            tag_map,
        })
    }

    /// Empty root node using these options, with the tag map as its default
    /// schema.
    pub fn new_node(&self) -> TlvResult<TlvNode> {
        let node = TlvNode::with_options(self.options)?;
        match &self.tag_map {
            Some(map) => node.with_default_tag_map(map.clone()),
            None => Ok(node),
        }
    }
}

fn parse_tag(key: &str) -> ConfigResult<u64> {
    let parsed = match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => key.parse(),
    };
    parsed.map_err(|_| ConfigError::InvalidSchema(format!("invalid tag {key:?}")))
}

fn build_tag_map(raw: &BTreeMap<String, RawTagConfig>) -> ConfigResult<TagMap> {
    let mut map = TagMap::new();
    for (key, entry) in raw {
        let tag = parse_tag(key)?;
        let tag_type = match &entry.tag_type {
            RawTagType::Kind(name) => TagType::Kind(
                name.parse::<ValueKind>()
                    .map_err(|e| ConfigError::InvalidSchema(format!("tag {key}: {e}")))?,
            ),
            RawTagType::Nested(nested) => TagType::Nested(Arc::new(build_tag_map(nested)?)),
        };
        let config = TagConfig {
            name: entry.name.clone(),
            tag_type,
        };
        if map.insert(tag, config).is_some() {
            return Err(ConfigError::InvalidSchema(format!("tag {tag:#x} listed twice")));
        }
    }
    Ok(map)
}
