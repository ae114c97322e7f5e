//! Directory entries.
//!
//! An entry is declared by the directory table as `(type, name)` and gets
//! its payload once, either while decoding or at construction. Which
//! payload it gets depends on how the registry resolves its type label.

use milo_stream::{capture_until_terminator, BinaryStream, ScanMode, StreamError};
use milo_types::Symbol;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::Directory;
use crate::error::{SceneError, SceneResult};
use crate::record::Record;
use crate::registry::{Frame, Handling, Registry, TypeHandler};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPayload {
    /// Decoded by a registered handler.
    Typed(Record),
    /// A directory-bearing record followed by its nested directory.
    Directory { record: Record, dir: Box<Directory> },
    /// Verbatim bytes of an unknown type, terminator excluded.
    Raw(#[serde(with = "milo_types::hex_bytes")] Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    type_name: Symbol,
    name: Symbol,
    payload: Option<EntryPayload>,
}

impl Entry {
    /// A table entry with no payload yet.
    pub fn declared(type_name: impl Into<Symbol>, name: impl Into<Symbol>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            payload: None,
        }
    }

    /// An entry whose type label is the record's type.
    pub fn typed(name: impl Into<Symbol>, record: Record) -> Self {
        Self {
            type_name: record.type_name.clone(),
            name: name.into(),
            payload: Some(EntryPayload::Typed(record)),
        }
    }

    /// A directory-bearing entry: the record is written first, then `dir`.
    pub fn with_directory(name: impl Into<Symbol>, record: Record, dir: Directory) -> Self {
        Self {
            type_name: record.type_name.clone(),
            name: name.into(),
            payload: Some(EntryPayload::Directory {
                record,
                dir: Box::new(dir),
            }),
        }
    }

    /// An entry kept as verbatim bytes, terminator excluded.
    pub fn raw(type_name: impl Into<Symbol>, name: impl Into<Symbol>, bytes: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            payload: Some(EntryPayload::Raw(bytes)),
        }
    }

    /// Give a declared entry its payload. Fails, handing the payload back,
    /// if one was already set.
    pub fn fill(&mut self, payload: EntryPayload) -> Result<(), EntryPayload> {
        if self.payload.is_some() {
            return Err(payload);
        }
        self.payload = Some(payload);
        Ok(())
    }

    /// Type label from the directory table.
    pub fn type_name(&self) -> &Symbol {
        &self.type_name
    }

    /// Object name from the directory table.
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    /// `None` until the entry is decoded or filled.
    pub fn payload(&self) -> Option<&EntryPayload> {
        self.payload.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.payload.is_some()
    }

    /// Raw entries are dirty: their bytes were kept without being understood.
    pub fn is_dirty(&self) -> bool {
        matches!(self.payload, Some(EntryPayload::Raw(_)))
    }

    /// The decoded record of a typed or directory-bearing entry.
    pub fn record(&self) -> Option<&Record> {
        match &self.payload {
            Some(EntryPayload::Typed(record) | EntryPayload::Directory { record, .. }) => Some(record),
            _ => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match &mut self.payload {
            Some(EntryPayload::Typed(record) | EntryPayload::Directory { record, .. }) => Some(record),
            _ => None,
        }
    }

    /// The nested directory of a directory-bearing entry.
    pub fn directory(&self) -> Option<&Directory> {
        match &self.payload {
            Some(EntryPayload::Directory { dir, .. }) => Some(dir),
            _ => None,
        }
    }

    pub fn directory_mut(&mut self) -> Option<&mut Directory> {
        match &mut self.payload {
            Some(EntryPayload::Directory { dir, .. }) => Some(dir),
            _ => None,
        }
    }

    /// Captured bytes of an entry whose type was not understood.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Some(EntryPayload::Raw(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Mutable access to captured bytes.
    ///
    /// Writing replays these bytes unchecked. If an edit introduces the
    /// `AD DE AD DE` terminator sequence, the written entry decodes as a
    /// truncated capture and everything after it is out of sync.
    pub fn raw_bytes_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.payload {
            Some(EntryPayload::Raw(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Decode this entry's payload from `stream`. `depth` is the nesting
    /// level of the directory holding the entry.
    pub(crate) fn read_payload(
        &mut self,
        stream: &mut BinaryStream,
        registry: &Registry,
        frame: &Frame,
        depth: u32,
    ) -> SceneResult<()> {
        let payload = match registry.resolve(self.type_name.as_str()) {
            Handling::Directory(handler) => {
                let record = handler.read(stream, &frame.embedded())?;
                let nested = nested_depth(depth, frame)?;
                debug!(entry = %self.name, type_name = %self.type_name, depth = nested, "entering nested directory");
                let dir = Directory::read_at_depth(stream, registry, &frame.limits, nested)?;
                EntryPayload::Directory {
                    record,
                    dir: Box::new(dir),
                }
            }
            Handling::Typed(handler) => EntryPayload::Typed(handler.read(stream, frame)?),
            Handling::RawCapture => {
                let bytes = capture_until_terminator(stream, ScanMode::ByteResync)?;
                debug!(entry = %self.name, type_name = %self.type_name, len = bytes.len(), "unknown type kept raw");
                EntryPayload::Raw(bytes)
            }
        };
        self.payload = Some(payload);
        Ok(())
    }

    pub(crate) fn write(
        &self,
        stream: &mut BinaryStream,
        registry: &Registry,
        frame: &Frame,
        depth: u32,
    ) -> SceneResult<()> {
        let payload = self.payload.as_ref().ok_or_else(|| SceneError::UnresolvedEntry {
            name: self.name.clone(),
        })?;

        match payload {
            EntryPayload::Raw(bytes) => {
                stream.write_bytes(bytes)?;
                stream.write_terminator()?;
            }
            EntryPayload::Typed(record) => {
                self.handler(registry)?.write(stream, record, frame)?;
            }
            EntryPayload::Directory { record, dir } => {
                self.handler(registry)?.write(stream, record, &frame.embedded())?;
                let nested = nested_depth(depth, frame)?;
                dir.write_at_depth(stream, registry, &frame.limits, nested)?;
            }
        }
        Ok(())
    }

    fn handler<'r>(&self, registry: &'r Registry) -> SceneResult<&'r dyn TypeHandler> {
        registry.get(self.type_name.as_str()).ok_or_else(|| SceneError::UnregisteredType {
            type_name: self.type_name.clone(),
        })
    }
}

fn nested_depth(depth: u32, frame: &Frame) -> SceneResult<u32> {
    let nested = depth + 1;
    let max = frame.limits.max_directory_depth;
    if nested > max {
        return Err(StreamError::CountSanityViolation {
            what: "directory depth",
            count: u64::from(nested),
            max: u64::from(max),
        }
        .into());
    }
    Ok(nested)
}
