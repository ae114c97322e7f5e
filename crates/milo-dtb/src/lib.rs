//! Binary data trees (DTB).
//!
//! Object metadata can embed script data compiled to a small tagged tree:
//! scalars (ints, floats, symbols, strings, preprocessor markers) and three
//! parent kinds (arrays, commands, properties) holding child lists.
//!
//! - [`DtbKind`]: the 21 wire kind tags
//! - [`DtbNode`]: one node; unrecognized tags decode to [`DtbNode::Unknown`]
//! - [`DtbParent`]: id + ordered children; also the untagged tree root
//!
//! Nodes render as DTA-style script text through `Display`.

pub mod codec;
pub mod node;

pub use codec::DEFAULT_MAX_DEPTH;
pub use node::{DtbKind, DtbNode, DtbParent};
