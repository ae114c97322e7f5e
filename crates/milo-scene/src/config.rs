use std::path::Path;

use milo_stream::{BinaryStream, DEFAULT_MAX_SYMBOL_LEN};
use milo_types::{Endian, RevisionSplit};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Ceilings applied to every count and nesting level read from a stream.
///
/// Counts are checked before anything is allocated for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Entries in one directory table.
    pub max_entries: u32,
    /// External resource symbols in a version 10 directory.
    pub max_external_resources: u32,
    /// Bytes in one symbol.
    pub max_symbol_len: u32,
    /// Nested parents in one DTB tree.
    pub max_dtb_depth: u32,
    /// Directories nested inside directory-bearing entries.
    pub max_directory_depth: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: 8192,
            max_external_resources: 1024,
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
            max_dtb_depth: milo_dtb::DEFAULT_MAX_DEPTH,
            max_directory_depth: 32,
        }
    }
}

/// Codec configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Byte order assumed before the version probe.
    pub initial_endian: Endian,
    /// How revision words split into `(revision, alt_revision)`.
    pub revision_split: RevisionSplit,
    pub limits: Limits,
}

impl SceneConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// initial_endian = "big"
    /// revision_split = "host-native"
    ///
    /// [limits]
    /// max_entries = 4096
    /// ```
    pub fn from_toml_str(text: &str) -> SceneResult<Self> {
        toml::from_str(text).map_err(|e| SceneError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SceneResult<String> {
        toml::to_string(self).map_err(|e| SceneError::Config(e.to_string()))
    }

    /// Wrap bytes in a stream set up from this configuration.
    pub fn stream_for(&self, bytes: Vec<u8>) -> BinaryStream {
        BinaryStream::from_bytes(bytes)
            .with_endian(self.initial_endian)
            .with_revision_split(self.revision_split)
            .with_max_symbol_len(self.limits.max_symbol_len)
    }
}
