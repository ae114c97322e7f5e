//! Versioned fields.
//!
//! A schema lists its fields in wire order as [`FieldSpec`]s. Each spec has a
//! [`Gate`] deciding, from the record's [`VersionTag`], whether the field is
//! on the wire at all, and a [`FieldCodec`] describing its encoding. Read and
//! write walk the same admitted list.

use std::fmt;

use milo_stream::{BinaryStream, StreamResult};
use milo_types::{Symbol, VersionTag};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Predicate over a record's revision pair.
#[derive(Clone, Copy, Debug)]
pub enum Gate {
    Always,
    /// `revision >= n`
    Since(u16),
    /// `revision > n`
    Above(u16),
    /// `revision < n`
    Before(u16),
    Exactly(u16),
    /// `lo <= revision <= hi`
    Between(u16, u16),
    /// `alt_revision >= n`
    AltSince(u16),
    All(&'static [Gate]),
    Any(&'static [Gate]),
    Custom(fn(VersionTag) -> bool),
}

impl Gate {
    pub fn admits(&self, tag: VersionTag) -> bool {
        let rev = tag.revision;
        match *self {
            Self::Always => true,
            Self::Since(n) => rev >= n,
            Self::Above(n) => rev > n,
            Self::Before(n) => rev < n,
            Self::Exactly(n) => rev == n,
            Self::Between(lo, hi) => (lo..=hi).contains(&rev),
            Self::AltSince(n) => tag.alt_revision >= n,
            Self::All(gates) => gates.iter().all(|g| g.admits(tag)),
            Self::Any(gates) => gates.iter().any(|g| g.admits(tag)),
            Self::Custom(predicate) => predicate(tag),
        }
    }
}

/// Wire encoding of one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCodec {
    /// One byte, nonzero is `true`.
    Bool,
    Byte,
    Int,
    UInt,
    Float,
    Symbol,
    /// `u32` count then that many symbols.
    SymbolList { max: u32 },
    /// Fixed-size opaque run.
    Bytes(usize),
}

impl FieldCodec {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Symbol => "symbol",
            Self::SymbolList { .. } => "symbol list",
            Self::Bytes(_) => "bytes",
        }
    }

    pub fn read(self, stream: &mut BinaryStream) -> StreamResult<FieldValue> {
        Ok(match self {
            Self::Bool => FieldValue::Bool(stream.read_bool()?),
            Self::Byte => FieldValue::Byte(stream.read_u8()?),
            Self::Int => FieldValue::Int(stream.read_i32()?),
            Self::UInt => FieldValue::UInt(stream.read_u32()?),
            Self::Float => FieldValue::Float(stream.read_f32()?),
            Self::Symbol => FieldValue::Symbol(stream.read_symbol()?),
            Self::SymbolList { max } => {
                FieldValue::SymbolList(stream.read_symbol_list("symbol list count", max)?)
            }
            Self::Bytes(len) => FieldValue::Bytes(stream.read_bytes(len)?),
        })
    }

    /// Zero value used when building a record from scratch.
    pub fn default_value(self) -> FieldValue {
        match self {
            Self::Bool => FieldValue::Bool(false),
            Self::Byte => FieldValue::Byte(0),
            Self::Int => FieldValue::Int(0),
            Self::UInt => FieldValue::UInt(0),
            Self::Float => FieldValue::Float(0.0),
            Self::Symbol => FieldValue::Symbol(Symbol::empty()),
            Self::SymbolList { .. } => FieldValue::SymbolList(Vec::new()),
            Self::Bytes(len) => FieldValue::Bytes(vec![0; len]),
        }
    }
}

/// A decoded field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Bool(bool),
    Byte(u8),
    Int(i32),
    UInt(u32),
    Float(f32),
    Symbol(Symbol),
    SymbolList(Vec<Symbol>),
    Bytes(#[serde(with = "milo_types::hex_bytes")] Vec<u8>),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Symbol(_) => "symbol",
            Self::SymbolList(_) => "symbol list",
            Self::Bytes(_) => "bytes",
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v:#04x}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Symbol(s) => write!(f, "{:?}", s.as_str()),
            Self::SymbolList(list) => {
                f.write_str("[")?;
                for (i, s) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", s.as_str())?;
                }
                f.write_str("]")
            }
            Self::Bytes(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

/// One entry of a schema's field ladder.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub gate: Gate,
    pub codec: FieldCodec,
}

impl FieldSpec {
    pub const fn new(name: &'static str, gate: Gate, codec: FieldCodec) -> Self {
        Self { name, gate, codec }
    }

    pub fn admits(&self, tag: VersionTag) -> bool {
        self.gate.admits(tag)
    }

    /// Write `value` with this spec's codec, rejecting a value of the wrong
    /// kind.
    pub fn write(
        &self,
        stream: &mut BinaryStream,
        value: &FieldValue,
        type_name: &str,
    ) -> SceneResult<()> {
        match (self.codec, value) {
            (FieldCodec::Bool, FieldValue::Bool(v)) => stream.write_bool(*v)?,
            (FieldCodec::Byte, FieldValue::Byte(v)) => stream.write_u8(*v)?,
            (FieldCodec::Int, FieldValue::Int(v)) => stream.write_i32(*v)?,
            (FieldCodec::UInt, FieldValue::UInt(v)) => stream.write_u32(*v)?,
            (FieldCodec::Float, FieldValue::Float(v)) => stream.write_f32(*v)?,
            (FieldCodec::Symbol, FieldValue::Symbol(s)) => stream.write_symbol(s)?,
            (FieldCodec::SymbolList { max }, FieldValue::SymbolList(list)) => {
                stream.write_symbol_list("symbol list count", list, max)?
            }
            (FieldCodec::Bytes(len), FieldValue::Bytes(bytes)) if bytes.len() == len => {
                stream.write_bytes(bytes)?
            }
            _ => {
                return Err(SceneError::FieldMismatch {
                    type_name: Symbol::from(type_name),
                    field: self.name,
                    expected: self.codec.name(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milo_stream::StreamError;

    fn tag(revision: u16) -> VersionTag {
        VersionTag::primary(revision)
    }

    fn even(tag: VersionTag) -> bool {
        tag.revision % 2 == 0
    }

    #[test]
    fn comparison_gates() {
        assert!(Gate::Always.admits(tag(0)));
        assert!(Gate::Since(3).admits(tag(3)));
        assert!(!Gate::Since(3).admits(tag(2)));
        assert!(Gate::Above(3).admits(tag(4)));
        assert!(!Gate::Above(3).admits(tag(3)));
        assert!(Gate::Before(3).admits(tag(2)));
        assert!(!Gate::Before(3).admits(tag(3)));
        assert!(Gate::Exactly(5).admits(tag(5)));
        assert!(!Gate::Exactly(5).admits(tag(6)));
    }

    #[test]
    fn between_is_inclusive() {
        let gate = Gate::Between(13, 15);
        let admitted: Vec<u16> = (10..20).filter(|&r| gate.admits(tag(r))).collect();
        assert_eq!(admitted, vec![13, 14, 15]);
    }

    #[test]
    fn alt_gate_ignores_primary() {
        assert!(!Gate::AltSince(1).admits(VersionTag::new(30, 0)));
        assert!(Gate::AltSince(1).admits(VersionTag::new(0, 1)));
    }

    #[test]
    fn combinators() {
        const WINDOW: Gate = Gate::All(&[Gate::Since(2), Gate::Before(5)]);
        const EDGES: Gate = Gate::Any(&[Gate::Exactly(0), Gate::Above(9)]);
        assert!(WINDOW.admits(tag(4)));
        assert!(!WINDOW.admits(tag(5)));
        assert!(EDGES.admits(tag(0)));
        assert!(EDGES.admits(tag(10)));
        assert!(!EDGES.admits(tag(3)));
        assert!(Gate::All(&[]).admits(tag(1)));
        assert!(!Gate::Any(&[]).admits(tag(1)));
    }

    #[test]
    fn custom_gate() {
        let gate = Gate::Custom(even);
        assert!(gate.admits(tag(4)));
        assert!(!gate.admits(tag(5)));
    }

    #[test]
    fn bool_reads_nonzero_as_true() {
        let mut s = BinaryStream::from_bytes(vec![0, 1, 7]);
        let values: Vec<FieldValue> = (0..3).map(|_| FieldCodec::Bool.read(&mut s).unwrap()).collect();
        assert_eq!(
            values,
            vec![FieldValue::Bool(false), FieldValue::Bool(true), FieldValue::Bool(true)]
        );
    }

    #[test]
    fn write_checks_kind() {
        let spec = FieldSpec::new("cam", Gate::Always, FieldCodec::Symbol);
        let mut s = BinaryStream::new();
        let err = spec.write(&mut s, &FieldValue::Int(3), "PanelDir").unwrap_err();
        assert!(matches!(
            err,
            SceneError::FieldMismatch { field: "cam", expected: "symbol", found: "int", .. }
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn fixed_bytes_length_must_match() {
        let spec = FieldSpec::new("pad", Gate::Always, FieldCodec::Bytes(4));
        let mut s = BinaryStream::new();
        assert!(spec.write(&mut s, &FieldValue::Bytes(vec![1, 2, 3]), "T").is_err());
        spec.write(&mut s, &FieldValue::Bytes(vec![1, 2, 3, 4]), "T").unwrap();
        assert_eq!(s.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn symbol_list_ceiling_applies_both_ways() {
        let codec = FieldCodec::SymbolList { max: 2 };
        let mut s = BinaryStream::new();
        s.write_u32(3).unwrap();
        s.seek_to(0);
        assert!(matches!(
            codec.read(&mut s),
            Err(StreamError::CountSanityViolation { count: 3, max: 2, .. })
        ));

        let spec = FieldSpec::new("subdirs", Gate::Always, codec);
        let list = FieldValue::SymbolList(vec!["a".into(), "b".into(), "c".into()]);
        let err = spec.write(&mut BinaryStream::new(), &list, "ObjectDir").unwrap_err();
        assert!(err.is_sanity_violation());
    }

    #[test]
    fn every_codec_reads_what_it_writes() {
        let cases = [
            (FieldCodec::Bool, FieldValue::Bool(true)),
            (FieldCodec::Byte, FieldValue::Byte(0xAD)),
            (FieldCodec::Int, FieldValue::Int(-2)),
            (FieldCodec::UInt, FieldValue::UInt(0xDEAD_BEEF)),
            (FieldCodec::Float, FieldValue::Float(0.5)),
            (FieldCodec::Symbol, FieldValue::Symbol("hud.milo".into())),
            (
                FieldCodec::SymbolList { max: 8 },
                FieldValue::SymbolList(vec!["a".into(), "".into()]),
            ),
            (FieldCodec::Bytes(2), FieldValue::Bytes(vec![9, 8])),
        ];
        for (codec, value) in cases {
            let spec = FieldSpec::new("f", Gate::Always, codec);
            let mut s = BinaryStream::new();
            spec.write(&mut s, &value, "T").unwrap();
            s.seek_to(0);
            assert_eq!(codec.read(&mut s).unwrap(), value);
            assert!(s.is_at_end());
            assert_eq!(codec.default_value().kind(), value.kind());
        }
    }

    #[test]
    fn display() {
        assert_eq!(FieldValue::Symbol("a b".into()).to_string(), "\"a b\"");
        assert_eq!(
            FieldValue::SymbolList(vec!["x".into(), "y".into()]).to_string(),
            "[\"x\", \"y\"]"
        );
        assert_eq!(FieldValue::Bytes(vec![0xAD, 0x01]).to_string(), "ad01");
        assert_eq!(FieldValue::Byte(3).to_string(), "0x03");
    }
}
