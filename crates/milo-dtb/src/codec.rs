//! DTB wire codec.
//!
//! A node is a `u32` kind tag followed by its payload. Parent payloads are a
//! `u16` child count, a `u32` id, then the children. The tree root inside a
//! metadata block is a parent payload with no tag in front of it.

use milo_stream::{BinaryStream, StreamError, StreamResult};
use tracing::trace;

use crate::node::{DtbKind, DtbNode, DtbParent};

/// Default ceiling on DTB nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

impl DtbParent {
    /// Read an untagged parent body, allowing at most `max_depth` levels of
    /// nested parents below it.
    pub fn read(stream: &mut BinaryStream, max_depth: u32) -> StreamResult<Self> {
        read_parent(stream, 0, max_depth)
    }

    pub fn write(&self, stream: &mut BinaryStream, max_depth: u32) -> StreamResult<()> {
        write_parent(self, stream, 0, max_depth)
    }
}

impl DtbNode {
    /// Read one tagged node.
    pub fn read(stream: &mut BinaryStream, max_depth: u32) -> StreamResult<Self> {
        read_node(stream, 1, max_depth)
    }

    pub fn write(&self, stream: &mut BinaryStream, max_depth: u32) -> StreamResult<()> {
        write_node(self, stream, 1, max_depth)
    }
}

fn check_depth(depth: u32, max_depth: u32) -> StreamResult<()> {
    if depth > max_depth {
        return Err(StreamError::CountSanityViolation {
            what: "DTB depth",
            count: u64::from(depth),
            max: u64::from(max_depth),
        });
    }
    Ok(())
}

fn read_parent(stream: &mut BinaryStream, depth: u32, max_depth: u32) -> StreamResult<DtbParent> {
    check_depth(depth, max_depth)?;
    let count = stream.read_u16()?;
    let id = stream.read_u32()?;
    let mut children = Vec::with_capacity(usize::from(count).min(1024));
    for _ in 0..count {
        children.push(read_node(stream, depth + 1, max_depth)?);
    }
    Ok(DtbParent { id, children })
}

fn read_node(stream: &mut BinaryStream, depth: u32, max_depth: u32) -> StreamResult<DtbNode> {
    let code = stream.read_u32()?;
    let Some(kind) = DtbKind::from_code(code) else {
        trace!(code, offset = stream.position(), "unknown DTB kind");
        return Ok(DtbNode::Unknown(code));
    };

    Ok(match kind {
        DtbKind::Int => DtbNode::Int(stream.read_i32()?),
        DtbKind::Float => DtbNode::Float(stream.read_f32()?),
        DtbKind::Unhandled => DtbNode::Unhandled(stream.read_i32()?),
        DtbKind::Else => DtbNode::Else(stream.read_i32()?),
        DtbKind::EndIf => DtbNode::EndIf(stream.read_i32()?),
        DtbKind::Variable => DtbNode::Variable(stream.read_symbol()?),
        DtbKind::Func => DtbNode::Func(stream.read_symbol()?),
        DtbKind::Object => DtbNode::Object(stream.read_symbol()?),
        DtbKind::Symbol => DtbNode::Symbol(stream.read_symbol()?),
        DtbKind::IfDef => DtbNode::IfDef(stream.read_symbol()?),
        DtbKind::String => DtbNode::String(stream.read_symbol()?),
        DtbKind::Define => DtbNode::Define(stream.read_symbol()?),
        DtbKind::Include => DtbNode::Include(stream.read_symbol()?),
        DtbKind::Merge => DtbNode::Merge(stream.read_symbol()?),
        DtbKind::IfNDef => DtbNode::IfNDef(stream.read_symbol()?),
        DtbKind::Autorun => DtbNode::Autorun(stream.read_symbol()?),
        DtbKind::Undef => DtbNode::Undef(stream.read_symbol()?),
        DtbKind::Glob => {
            let len = stream.read_count("glob length", u32::MAX)?;
            DtbNode::Glob(stream.read_bytes(len as usize)?)
        }
        DtbKind::Array => DtbNode::Array(read_parent(stream, depth, max_depth)?),
        DtbKind::Command => DtbNode::Command(read_parent(stream, depth, max_depth)?),
        DtbKind::Property => DtbNode::Property(read_parent(stream, depth, max_depth)?),
    })
}

fn write_parent(
    parent: &DtbParent,
    stream: &mut BinaryStream,
    depth: u32,
    max_depth: u32,
) -> StreamResult<()> {
    check_depth(depth, max_depth)?;
    let count = u16::try_from(parent.children.len()).map_err(|_| {
        StreamError::CountSanityViolation {
            what: "DTB child count",
            count: parent.children.len() as u64,
            max: u64::from(u16::MAX),
        }
    })?;
    stream.write_u16(count)?;
    stream.write_u32(parent.id)?;
    for child in &parent.children {
        write_node(child, stream, depth + 1, max_depth)?;
    }
    Ok(())
}

fn write_node(
    node: &DtbNode,
    stream: &mut BinaryStream,
    depth: u32,
    max_depth: u32,
) -> StreamResult<()> {
    stream.write_u32(node.code())?;
    match node {
        DtbNode::Int(v) | DtbNode::Unhandled(v) | DtbNode::Else(v) | DtbNode::EndIf(v) => {
            stream.write_i32(*v)
        }
        DtbNode::Float(v) => stream.write_f32(*v),
        DtbNode::Variable(s)
        | DtbNode::Func(s)
        | DtbNode::Object(s)
        | DtbNode::Symbol(s)
        | DtbNode::IfDef(s)
        | DtbNode::String(s)
        | DtbNode::Define(s)
        | DtbNode::Include(s)
        | DtbNode::Merge(s)
        | DtbNode::IfNDef(s)
        | DtbNode::Autorun(s)
        | DtbNode::Undef(s) => stream.write_symbol(s),
        DtbNode::Glob(bytes) => {
            stream.write_count("glob length", bytes.len(), u32::MAX)?;
            stream.write_bytes(bytes)
        }
        DtbNode::Array(p) | DtbNode::Command(p) | DtbNode::Property(p) => {
            write_parent(p, stream, depth, max_depth)
        }
        DtbNode::Unknown(_) => Ok(()),
    }
}
