//! Milo scene container codec.
//!
//! A scene file is a tree of directories. Each directory lists its entries as
//! `(type, name)` pairs, carries an object of its own, then stores one
//! payload per entry. Payloads are versioned records: a revision word
//! followed by fields whose presence depends on that revision.
//!
//! Decoding is driven by a [`Registry`] of type handlers. Types it does not
//! know are never an error: their bytes are captured verbatim up to the
//! record terminator and written back unchanged.
//!
//! # Quick Start
//!
//! ```rust
//! use milo_scene::{catalog, Directory, Entry, SceneCodec};
//! use milo_types::VersionTag;
//!
//! let codec = SceneCodec::builtin();
//! let object = catalog::OBJECT_DIR.blank(VersionTag::primary(27), 25).unwrap();
//! let mut root = Directory::new(25, "root", object);
//! root.push(Entry::raw("FutureType", "blob", vec![1, 2, 3]));
//!
//! let bytes = codec.encode(&root).unwrap();
//! let back = codec.decode(bytes).unwrap();
//! assert_eq!(back.entry("blob").unwrap().raw_bytes(), Some(&[1, 2, 3][..]));
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
pub mod directory;
pub mod entry;
pub mod error;
pub mod field;
pub mod metadata;
pub mod record;
pub mod registry;
pub mod schema;
pub mod summary;

pub use codec::SceneCodec;
pub use config::{Limits, SceneConfig};
pub use directory::{Directory, DirectoryObject, StringTableStats, LEGAL_VERSIONS};
pub use entry::{Entry, EntryPayload};
pub use error::{SceneError, SceneResult};
pub use field::{FieldCodec, FieldSpec, FieldValue, Gate};
pub use metadata::MetadataBlock;
pub use record::{Record, RecordBase};
pub use registry::{Frame, Handling, Registry, TypeHandler};
pub use schema::{RevisionRange, Schema, SchemaBase};
pub use summary::SceneSummary;
