//! Primitive stream codec for Milo scenes.
//!
//! [`BinaryStream`] is a seekable in-memory cursor whose byte order can be
//! switched mid-stream. On top of the scalar codecs it provides the symbol
//! codec, terminator checks, and the two terminator scanners used to capture
//! records the caller cannot interpret.
//!
//! # Layout conventions
//!
//! - integers and floats use the stream's current [`Endian`](milo_types::Endian)
//! - a symbol is a `u32` byte count followed by one byte per character
//! - the terminator is the four bytes `AD DE AD DE`

pub mod error;
pub mod scan;
pub mod stream;
pub mod symbol;
pub mod terminator;

pub use error::{StreamError, StreamResult};
pub use scan::{capture_until_terminator, ScanMode};
pub use stream::{BinaryStream, DEFAULT_MAX_SYMBOL_LEN};
