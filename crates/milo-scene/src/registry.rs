//! Type dispatch.
//!
//! Every type label in a directory table is looked up here. Labels with a
//! handler decode through it; anything else falls back to a raw capture.

use std::collections::BTreeMap;
use std::fmt;

use milo_stream::BinaryStream;
use milo_types::Symbol;

use crate::catalog;
use crate::config::Limits;
use crate::error::SceneResult;
use crate::record::Record;

/// Call-site context handed to a [`TypeHandler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// A terminator follows the record at this call site.
    pub standalone: bool,
    /// Version of the directory that owns the record.
    pub dir_version: u32,
    pub limits: Limits,
}

impl Frame {
    /// A frame whose record is followed by a terminator.
    pub fn standalone(dir_version: u32, limits: Limits) -> Self {
        Self {
            standalone: true,
            dir_version,
            limits,
        }
    }

    /// Same context without the trailing terminator.
    pub fn embedded(self) -> Self {
        Self {
            standalone: false,
            ..self
        }
    }
}

/// Decoder/encoder for one type label.
///
/// `read` and `write` must consume and produce exactly the same bytes for a
/// given record, including the terminator when the frame is standalone.
pub trait TypeHandler: Send + Sync {
    /// Label this handler is registered under.
    fn type_name(&self) -> &str;

    /// Whether a nested directory follows this type's record when it appears
    /// as an entry.
    fn owns_directory(&self) -> bool {
        false
    }

    fn read(&self, stream: &mut BinaryStream, frame: &Frame) -> SceneResult<Record>;

    fn write(&self, stream: &mut BinaryStream, record: &Record, frame: &Frame) -> SceneResult<()>;
}

/// How a label will be decoded.
#[derive(Clone, Copy)]
pub enum Handling<'a> {
    Typed(&'a dyn TypeHandler),
    Directory(&'a dyn TypeHandler),
    RawCapture,
}

impl Handling<'_> {
    /// The handler behind a typed or directory-bearing label.
    pub fn handler(&self) -> Option<&dyn TypeHandler> {
        match self {
            Self::Typed(h) | Self::Directory(h) => Some(*h),
            Self::RawCapture => None,
        }
    }
}

impl fmt::Debug for Handling<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(h) => write!(f, "Typed({})", h.type_name()),
            Self::Directory(h) => write!(f, "Directory({})", h.type_name()),
            Self::RawCapture => f.write_str("RawCapture"),
        }
    }
}

/// Table of type handlers keyed by label.
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<Symbol, Box<dyn TypeHandler>>,
}

impl Registry {
    /// A registry with no handlers: every label decodes raw.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding every schema in the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for schema in catalog::BUILTIN {
            registry.register(Box::new(**schema));
        }
        registry
    }

    /// Add a handler under its own label, returning any handler it replaced.
    pub fn register(&mut self, handler: Box<dyn TypeHandler>) -> Option<Box<dyn TypeHandler>> {
        self.handlers.insert(Symbol::from(handler.type_name()), handler)
    }

    /// Remove a handler; the label then decodes raw.
    pub fn unregister(&mut self, label: &str) -> Option<Box<dyn TypeHandler>> {
        self.handlers.remove(label)
    }

    /// Handler registered under `label`, if any.
    pub fn get(&self, label: &str) -> Option<&dyn TypeHandler> {
        self.handlers.get(label).map(|h| h.as_ref())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.handlers.contains_key(label)
    }

    /// Registered labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &Symbol> {
        self.handlers.keys()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Decide how entries labelled `label` are decoded. Unknown labels fall
    /// back to [`Handling::RawCapture`].
    pub fn resolve(&self, label: &str) -> Handling<'_> {
        match self.get(label) {
            Some(h) if h.owns_directory() => Handling::Directory(h),
            Some(h) => Handling::Typed(h),
            None => Handling::RawCapture,
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milo_types::VersionTag;

    use crate::record::RecordBase;

    /// Four-byte payload with no terminator, regardless of frame.
    struct Fixed;

    impl TypeHandler for Fixed {
        fn type_name(&self) -> &str {
            "Fixed"
        }

        fn read(&self, stream: &mut BinaryStream, _frame: &Frame) -> SceneResult<Record> {
            let tag = VersionTag::primary(stream.read_u16()?);
            stream.read_u16()?;
            Ok(Record::new("Fixed", tag, RecordBase::None))
        }

        fn write(&self, stream: &mut BinaryStream, record: &Record, _frame: &Frame) -> SceneResult<()> {
            stream.write_u16(record.revision.revision)?;
            stream.write_u16(0)?;
            Ok(())
        }
    }

    #[test]
    fn builtin_labels() {
        let registry = Registry::builtin();
        let labels: Vec<&str> = registry.labels().map(Symbol::as_str).collect();
        for expected in ["ObjectDir", "RndDir", "PanelDir", "WorldDir", "BandSongPref"] {
            assert!(labels.contains(&expected), "missing {expected}");
        }
        assert_eq!(registry.len(), catalog::BUILTIN.len());
    }

    #[test]
    fn resolve_routes_by_ownership() {
        let registry = Registry::builtin();
        assert!(matches!(registry.resolve("ObjectDir"), Handling::Directory(_)));
        assert!(matches!(registry.resolve("BandSongPref"), Handling::Typed(_)));
        assert!(matches!(registry.resolve("FutureType"), Handling::RawCapture));
        assert!(registry.resolve("FutureType").handler().is_none());
    }

    #[test]
    fn empty_registry_captures_everything() {
        let registry = Registry::empty();
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve("ObjectDir"), Handling::RawCapture));
    }

    #[test]
    fn register_replaces_and_unregister_removes() {
        let mut registry = Registry::empty();
        assert!(registry.register(Box::new(Fixed)).is_none());
        assert!(registry.register(Box::new(Fixed)).is_some());
        assert!(registry.contains("Fixed"));
        assert_eq!(format!("{registry:?}"), "{Symbol(\"Fixed\")}");
        assert!(registry.unregister("Fixed").is_some());
        assert!(matches!(registry.resolve("Fixed"), Handling::RawCapture));
    }

    #[test]
    fn custom_handler_is_dispatched() {
        let mut registry = Registry::empty();
        registry.register(Box::new(Fixed));
        let frame = Frame::standalone(25, Limits::default());
        let handler = registry.get("Fixed").unwrap();

        let mut s = BinaryStream::new();
        handler
            .write(&mut s, &Record::new("Fixed", VersionTag::primary(3), RecordBase::None), &frame)
            .unwrap();
        s.seek_to(0);
        assert_eq!(handler.read(&mut s, &frame).unwrap().revision.revision, 3);
    }

    #[test]
    fn embedded_frame_keeps_context() {
        let frame = Frame::standalone(28, Limits::default()).embedded();
        assert!(!frame.standalone);
        assert_eq!(frame.dir_version, 28);
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
