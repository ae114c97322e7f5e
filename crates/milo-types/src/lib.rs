//! Foundation types for Milo scene containers.
//!
//! Every other `milo-*` crate depends on `milo-types`. Nothing here touches a
//! byte stream; these are the plain values the codecs move around.
//!
//! # Key Types
//!
//! - [`Symbol`]: value-equal label used for every name, type tag and reference
//! - [`VersionTag`]: `(revision, alt_revision)` pair packed into one 32-bit word
//! - [`RevisionSplit`]: how that word is split into its two halves
//! - [`Endian`]: stream byte order, plus the terminator sentinel per order

pub mod endian;
pub mod error;
pub mod hex_bytes;
pub mod revision;
pub mod symbol;

pub use endian::{Endian, TERMINATOR};
pub use error::TypeError;
pub use revision::{RevisionSplit, VersionTag};
pub use symbol::Symbol;
