use std::fmt;

use milo_types::Symbol;
use serde::{Deserialize, Serialize};

/// Wire kind tag of a DTB node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DtbKind {
    Int,
    Float,
    Variable,
    Func,
    Object,
    Symbol,
    Unhandled,
    IfDef,
    Else,
    EndIf,
    Array,
    Command,
    String,
    Property,
    Glob,
    Define,
    Include,
    Merge,
    IfNDef,
    Autorun,
    Undef,
}

impl DtbKind {
    pub const ALL: [DtbKind; 21] = [
        DtbKind::Int,
        DtbKind::Float,
        DtbKind::Variable,
        DtbKind::Func,
        DtbKind::Object,
        DtbKind::Symbol,
        DtbKind::Unhandled,
        DtbKind::IfDef,
        DtbKind::Else,
        DtbKind::EndIf,
        DtbKind::Array,
        DtbKind::Command,
        DtbKind::String,
        DtbKind::Property,
        DtbKind::Glob,
        DtbKind::Define,
        DtbKind::Include,
        DtbKind::Merge,
        DtbKind::IfNDef,
        DtbKind::Autorun,
        DtbKind::Undef,
    ];

    /// The `u32` tag written before the node payload.
    pub const fn code(self) -> u32 {
        match self {
            Self::Int => 0x00,
            Self::Float => 0x01,
            Self::Variable => 0x02,
            Self::Func => 0x03,
            Self::Object => 0x04,
            Self::Symbol => 0x05,
            Self::Unhandled => 0x06,
            Self::IfDef => 0x07,
            Self::Else => 0x08,
            Self::EndIf => 0x09,
            Self::Array => 0x10,
            Self::Command => 0x11,
            Self::String => 0x12,
            Self::Property => 0x13,
            Self::Glob => 0x14,
            Self::Define => 0x20,
            Self::Include => 0x21,
            Self::Merge => 0x22,
            Self::IfNDef => 0x23,
            Self::Autorun => 0x24,
            Self::Undef => 0x25,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn is_parent(self) -> bool {
        matches!(self, Self::Array | Self::Command | Self::Property)
    }
}

/// One node of a DTB tree.
///
/// Each variant carries exactly the payload its wire kind defines. Tags that
/// match no known kind decode to [`DtbNode::Unknown`], which has no payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DtbNode {
    Int(i32),
    Float(f32),
    Variable(Symbol),
    Func(Symbol),
    Object(Symbol),
    Symbol(Symbol),
    Unhandled(i32),
    IfDef(Symbol),
    Else(i32),
    EndIf(i32),
    Array(DtbParent),
    Command(DtbParent),
    String(Symbol),
    Property(DtbParent),
    #[serde(with = "milo_types::hex_bytes")]
    Glob(Vec<u8>),
    Define(Symbol),
    Include(Symbol),
    Merge(Symbol),
    IfNDef(Symbol),
    Autorun(Symbol),
    Undef(Symbol),
    Unknown(u32),
}

impl DtbNode {
    /// The wire kind, or `None` for [`DtbNode::Unknown`].
    pub fn kind(&self) -> Option<DtbKind> {
        Some(match self {
            Self::Int(_) => DtbKind::Int,
            Self::Float(_) => DtbKind::Float,
            Self::Variable(_) => DtbKind::Variable,
            Self::Func(_) => DtbKind::Func,
            Self::Object(_) => DtbKind::Object,
            Self::Symbol(_) => DtbKind::Symbol,
            Self::Unhandled(_) => DtbKind::Unhandled,
            Self::IfDef(_) => DtbKind::IfDef,
            Self::Else(_) => DtbKind::Else,
            Self::EndIf(_) => DtbKind::EndIf,
            Self::Array(_) => DtbKind::Array,
            Self::Command(_) => DtbKind::Command,
            Self::String(_) => DtbKind::String,
            Self::Property(_) => DtbKind::Property,
            Self::Glob(_) => DtbKind::Glob,
            Self::Define(_) => DtbKind::Define,
            Self::Include(_) => DtbKind::Include,
            Self::Merge(_) => DtbKind::Merge,
            Self::IfNDef(_) => DtbKind::IfNDef,
            Self::Autorun(_) => DtbKind::Autorun,
            Self::Undef(_) => DtbKind::Undef,
            Self::Unknown(_) => return None,
        })
    }

    /// Tag written on the wire. `Unknown` writes back its original tag.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown(code) => *code,
            other => other.kind().map_or(0, DtbKind::code),
        }
    }

    pub fn as_parent(&self) -> Option<&DtbParent> {
        match self {
            Self::Array(p) | Self::Command(p) | Self::Property(p) => Some(p),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, counting itself.
    pub fn node_count(&self) -> usize {
        1 + self.as_parent().map_or(0, DtbParent::node_count)
    }

    /// Height of this subtree; scalars have depth 1.
    pub fn depth(&self) -> usize {
        1 + self.as_parent().map_or(0, DtbParent::depth)
    }
}

/// A parent body: id plus ordered children.
///
/// The root of a metadata tree is a bare `DtbParent` with no kind tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DtbParent {
    pub id: u32,
    pub children: Vec<DtbNode>,
}

impl DtbParent {
    pub fn new(id: u32, children: Vec<DtbNode>) -> Self {
        Self { id, children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes below this parent, not counting the parent itself.
    pub fn node_count(&self) -> usize {
        self.children.iter().map(DtbNode::node_count).sum()
    }

    /// Height below this parent; an empty parent has depth 0.
    pub fn depth(&self) -> usize {
        self.children.iter().map(DtbNode::depth).max().unwrap_or(0)
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{child}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DtbParent {
    /// Renders as an array, which is how a root reads in script form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        self.fmt_children(f)?;
        f.write_str(")")
    }
}

impl fmt::Display for DtbNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Variable(s) => write!(f, "${s}"),
            Self::Func(s) | Self::Object(s) | Self::Symbol(s) => write!(f, "{s}"),
            Self::Unhandled(_) => f.write_str("kDataUnhandled"),
            Self::IfDef(s) => write!(f, "#ifdef {s}"),
            Self::Else(_) => f.write_str("#else"),
            Self::EndIf(_) => f.write_str("#endif"),
            Self::Array(p) => write!(f, "{p}"),
            Self::Command(p) => {
                f.write_str("{")?;
                p.fmt_children(f)?;
                f.write_str("}")
            }
            Self::String(s) => write!(f, "{:?}", s.as_str()),
            Self::Property(p) => {
                f.write_str("[")?;
                p.fmt_children(f)?;
                f.write_str("]")
            }
            Self::Glob(bytes) => write!(f, "<glob {} bytes>", bytes.len()),
            Self::Define(s) => write!(f, "#define {s}"),
            Self::Include(s) => write!(f, "#include {s}"),
            Self::Merge(s) => write!(f, "#merge {s}"),
            Self::IfNDef(s) => write!(f, "#ifndef {s}"),
            Self::Autorun(s) => write!(f, "#autorun {s}"),
            Self::Undef(s) => write!(f, "#undef {s}"),
            Self::Unknown(code) => write!(f, "<kind {code:#04x}>"),
        }
    }
}
