use milo_stream::StreamError;
use milo_types::Symbol;
use thiserror::Error;

/// Errors raised while decoding or encoding a scene tree.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The container version word is outside the legal set, even after the
    /// one-shot byte-order retry.
    #[error("unsupported container version {version} (byte order flipped: {flipped})")]
    UnsupportedContainerVersion { version: u32, flipped: bool },

    #[error("{type_name} does not support revision {revision}.{alt_revision}")]
    UnsupportedNodeRevision {
        type_name: Symbol,
        revision: u16,
        alt_revision: u16,
    },

    /// A field admitted by the record's revision has no value in memory.
    #[error("{type_name} record is missing field '{field}'")]
    MissingField { type_name: Symbol, field: &'static str },

    #[error("{type_name}.{field}: expected {expected} value, found {found}")]
    FieldMismatch {
        type_name: Symbol,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The record's base part does not have the shape its schema declares.
    #[error("{type_name} base mismatch: expected {expected}, found {found}")]
    BaseMismatch {
        type_name: Symbol,
        expected: String,
        found: String,
    },

    #[error("entry '{name}' has no payload")]
    UnresolvedEntry { name: Symbol },

    #[error("no handler registered for type '{type_name}'")]
    UnregisteredType { type_name: Symbol },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneError {
    /// The reader lost its place: a terminator was missing or never found.
    pub fn is_desync(&self) -> bool {
        matches!(self, Self::Stream(e) if e.is_desync())
    }

    /// A count, length or depth exceeded its ceiling.
    pub fn is_sanity_violation(&self) -> bool {
        matches!(
            self,
            Self::Stream(StreamError::CountSanityViolation { .. })
        )
    }

    pub(crate) fn unsupported_revision(type_name: impl Into<Symbol>, tag: milo_types::VersionTag) -> Self {
        Self::UnsupportedNodeRevision {
            type_name: type_name.into(),
            revision: tag.revision,
            alt_revision: tag.alt_revision,
        }
    }
}

pub type SceneResult<T> = Result<T, SceneError>;
