use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unexpected end of stream at offset {offset:#x}: wanted {wanted} bytes")]
    UnexpectedEof { offset: u64, wanted: usize },

    #[error("missing terminator at offset {offset:#x}: expected {expected:#010x}, found {found:#010x}")]
    MissingTerminator { offset: u64, expected: u32, found: u32 },

    #[error("no terminator after capture starting at offset {start:#x} ({scanned} bytes scanned)")]
    UnterminatedCapture { start: u64, scanned: usize },

    #[error("{what} {count} exceeds ceiling {max}")]
    CountSanityViolation {
        what: &'static str,
        count: u64,
        max: u64,
    },

    #[error("symbol {text:?} contains a character outside the single-byte range")]
    UnencodableSymbol { text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Returns `true` for errors that mean the reader lost its place in the
    /// stream (a terminator was not where the layout said it would be).
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            Self::MissingTerminator { .. } | Self::UnterminatedCapture { .. }
        )
    }
}

pub type StreamResult<T> = Result<T, StreamError>;
