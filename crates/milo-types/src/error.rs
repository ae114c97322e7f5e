use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown byte order: {0} (expected \"little\" or \"big\")")]
    UnknownEndian(String),

    #[error("unknown revision split: {0} (expected \"low-word-primary\" or \"host-native\")")]
    UnknownRevisionSplit(String),
}
