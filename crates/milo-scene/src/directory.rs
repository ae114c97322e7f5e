//! Directory containers.
//!
//! A directory is a header, a `(type, name)` table, its own object, and then
//! one payload per table entry in table order. The whole table is read
//! before any payload so every entry's type is known up front.

use std::collections::BTreeSet;

use milo_stream::{capture_until_terminator, BinaryStream, ScanMode};
use milo_types::{Endian, Symbol};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Limits;
use crate::entry::Entry;
use crate::error::{SceneError, SceneResult};
use crate::metadata::MetadataBlock;
use crate::record::Record;
use crate::registry::{Frame, Handling, Registry};
use crate::summary::SceneSummary;

/// Container versions this codec reads and writes.
pub const LEGAL_VERSIONS: [u32; 7] = [6, 10, 24, 25, 26, 28, 32];

/// A version word above this was read in the wrong byte order.
pub const ENDIAN_PROBE_THRESHOLD: u32 = 50;

/// Only this version carries an external resource list.
pub const EXTERNAL_RESOURCE_VERSION: u32 = 10;

/// Whether `version` is one of [`LEGAL_VERSIONS`].
pub fn is_legal_version(version: u32) -> bool {
    LEGAL_VERSIONS.contains(&version)
}

/// The directory's own object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryObject {
    Typed(Record),
    /// Unregistered type: object header plus the bytes after it, kept
    /// verbatim up to the terminator.
    Opaque {
        metadata: Option<MetadataBlock>,
        #[serde(with = "milo_types::hex_bytes")]
        raw: Vec<u8>,
    },
}

impl DirectoryObject {
    /// The decoded record, unless the object is opaque.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Typed(record) => Some(record),
            Self::Opaque { .. } => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Self::Typed(record) => Some(record),
            Self::Opaque { .. } => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque { .. })
    }
}

/// String-table bookkeeping counters stored in the directory header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTableStats {
    /// Distinct labels.
    pub count: u32,
    /// Bytes the labels take with a NUL after each.
    pub size: u32,
}

impl StringTableStats {
    pub fn measure<'a>(labels: impl IntoIterator<Item = &'a Symbol>) -> Self {
        let distinct: BTreeSet<&str> = labels.into_iter().map(Symbol::as_str).collect();
        let size: usize = distinct.iter().map(|label| label.chars().count() + 1).sum();
        Self {
            count: u32::try_from(distinct.len()).unwrap_or(u32::MAX),
            size: u32::try_from(size).unwrap_or(u32::MAX),
        }
    }

    /// Counters for the directory's own labels and its table.
    pub fn of(dir: &Directory) -> Self {
        let labels = [&dir.type_name, &dir.name]
            .into_iter()
            .chain(dir.entries.iter().flat_map(|e| [e.type_name(), e.name()]));
        Self::measure(labels)
    }
}

/// One decoded container: header, own object, and entries in table order.
///
/// Entries that carry a nested directory own it, so a root `Directory` is
/// the whole scene tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    pub version: u32,
    /// Byte order the directory was decoded in and will be written in.
    pub endian: Endian,
    pub type_name: Symbol,
    pub name: Symbol,
    pub string_table_count: u32,
    pub string_table_size: u32,
    /// Written only when `version` is 10.
    pub external_resources: Vec<Symbol>,
    pub object: DirectoryObject,
    pub entries: Vec<Entry>,
}

impl Directory {
    /// A fresh little-endian directory with no entries. The object's type
    /// label becomes the directory type.
    pub fn new(version: u32, name: impl Into<Symbol>, object: Record) -> Self {
        let mut dir = Self {
            version,
            endian: Endian::Little,
            type_name: object.type_name.clone(),
            name: name.into(),
            string_table_count: 0,
            string_table_size: 0,
            external_resources: Vec::new(),
            object: DirectoryObject::Typed(object),
            entries: Vec::new(),
        };
        dir.refresh_string_table();
        dir
    }

    /// Set the byte order the directory is written in.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Append an entry and recount the string table.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.refresh_string_table();
    }

    /// Recompute the string-table counters from the current labels.
    pub fn refresh_string_table(&mut self) {
        let stats = StringTableStats::of(self);
        self.string_table_count = stats.count;
        self.string_table_size = stats.size;
    }

    /// Entries in table order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Direct entry by name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.name() == name)
    }

    /// Depth-first search through this directory and every nested one.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        for entry in &self.entries {
            if entry.name() == name {
                return Some(entry);
            }
            if let Some(found) = entry.directory().and_then(|dir| dir.find(name)) {
                return Some(found);
            }
        }
        None
    }

    /// Nested directories held by directory-bearing entries, one level down.
    pub fn subdirectories(&self) -> impl Iterator<Item = (&Entry, &Directory)> {
        self.entries
            .iter()
            .filter_map(|e| e.directory().map(|dir| (e, dir)))
    }

    /// Counts over this directory and everything nested in it.
    pub fn summary(&self) -> SceneSummary {
        SceneSummary::of(self)
    }

    /// Decode one directory, starting at the stream's current position.
    pub fn read(stream: &mut BinaryStream, registry: &Registry, limits: &Limits) -> SceneResult<Self> {
        Self::read_at_depth(stream, registry, limits, 0)
    }

    pub(crate) fn read_at_depth(
        stream: &mut BinaryStream,
        registry: &Registry,
        limits: &Limits,
        depth: u32,
    ) -> SceneResult<Self> {
        let version = read_version(stream)?;
        let endian = stream.endian();

        let type_name = stream.read_symbol()?;
        let name = stream.read_symbol()?;
        let string_table_count = stream.read_u32()?;
        let string_table_size = stream.read_u32()?;

        let entry_count = stream.read_count("entry count", limits.max_entries)?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let entry_type = stream.read_symbol()?;
            let entry_name = stream.read_symbol()?;
            entries.push(Entry::declared(entry_type, entry_name));
        }

        let external_resources = if version == EXTERNAL_RESOURCE_VERSION {
            stream.read_symbol_list("external resource count", limits.max_external_resources)?
        } else {
            Vec::new()
        };

        let frame = Frame::standalone(version, *limits);
        let object = match registry.resolve(type_name.as_str()) {
            Handling::Typed(handler) | Handling::Directory(handler) => {
                DirectoryObject::Typed(handler.read(stream, &frame)?)
            }
            Handling::RawCapture => {
                let metadata = MetadataBlock::read(stream, version, limits)?;
                let raw = capture_until_terminator(stream, ScanMode::AlignedWindow)?;
                debug!(%type_name, %name, len = raw.len(), "directory object kept opaque");
                DirectoryObject::Opaque { metadata, raw }
            }
        };

        for entry in &mut entries {
            entry.read_payload(stream, registry, &frame, depth)?;
        }

        Ok(Self {
            version,
            endian,
            type_name,
            name,
            string_table_count,
            string_table_size,
            external_resources,
            object,
            entries,
        })
    }

    /// Encode this directory in its recorded byte order.
    pub fn write(&self, stream: &mut BinaryStream, registry: &Registry, limits: &Limits) -> SceneResult<()> {
        self.write_at_depth(stream, registry, limits, 0)
    }

    pub(crate) fn write_at_depth(
        &self,
        stream: &mut BinaryStream,
        registry: &Registry,
        limits: &Limits,
        depth: u32,
    ) -> SceneResult<()> {
        if !is_legal_version(self.version) {
            return Err(SceneError::UnsupportedContainerVersion {
                version: self.version,
                flipped: false,
            });
        }
        stream.set_endian(self.endian);
        stream.write_u32(self.version)?;

        stream.write_symbol(&self.type_name)?;
        stream.write_symbol(&self.name)?;
        stream.write_u32(self.string_table_count)?;
        stream.write_u32(self.string_table_size)?;

        stream.write_count("entry count", self.entries.len(), limits.max_entries)?;
        for entry in &self.entries {
            stream.write_symbol(entry.type_name())?;
            stream.write_symbol(entry.name())?;
        }

        if self.version == EXTERNAL_RESOURCE_VERSION {
            stream.write_symbol_list(
                "external resource count",
                &self.external_resources,
                limits.max_external_resources,
            )?;
        }

        let frame = Frame::standalone(self.version, *limits);
        match &self.object {
            DirectoryObject::Typed(record) => {
                let handler = registry.get(self.type_name.as_str()).ok_or_else(|| {
                    SceneError::UnregisteredType {
                        type_name: self.type_name.clone(),
                    }
                })?;
                handler.write(stream, record, &frame)?;
            }
            DirectoryObject::Opaque { metadata, raw } => {
                MetadataBlock::write(metadata.as_ref(), stream, self.version, limits)?;
                stream.write_bytes(raw)?;
                stream.write_terminator()?;
            }
        }

        for entry in &self.entries {
            entry.write(stream, registry, &frame, depth)?;
        }
        Ok(())
    }
}

/// Read the version word, flipping the byte order once if it is implausible.
fn read_version(stream: &mut BinaryStream) -> SceneResult<u32> {
    let start = stream.position();
    let mut version = stream.read_u32()?;
    let mut flipped = false;
    if version > ENDIAN_PROBE_THRESHOLD {
        let endian = stream.flip_endian();
        stream.seek_to(start);
        version = stream.read_u32()?;
        flipped = true;
        debug!(offset = start, ?endian, version, "container version implausible, byte order flipped");
    }
    if !is_legal_version(version) {
        return Err(SceneError::UnsupportedContainerVersion { version, flipped });
    }
    Ok(version)
}
