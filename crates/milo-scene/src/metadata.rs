use milo_dtb::DtbParent;
use milo_stream::BinaryStream;
use milo_types::{Symbol, VersionTag};
use serde::{Deserialize, Serialize};

use crate::config::Limits;
use crate::error::SceneResult;

/// Directory versions at or below this carry no metadata block.
pub const METADATA_MIN_DIR_VERSION: u32 = 10;

/// Generic object header: type label, optional script tree and note.
///
/// Every object-based record starts with one of these when the owning
/// directory is newer than version 10.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub revision: VersionTag,
    pub type_name: Symbol,
    pub tree: Option<DtbParent>,
    /// Only on the wire when `revision.revision` is nonzero.
    pub note: Option<Symbol>,
}

impl MetadataBlock {
    /// Block written for records built without one.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_present(dir_version: u32) -> bool {
        dir_version > METADATA_MIN_DIR_VERSION
    }

    pub fn read(
        stream: &mut BinaryStream,
        dir_version: u32,
        limits: &Limits,
    ) -> SceneResult<Option<Self>> {
        if !Self::is_present(dir_version) {
            return Ok(None);
        }
        let revision = stream.read_version_tag()?;
        let type_name = stream.read_symbol()?;
        let tree = if stream.read_bool()? {
            Some(DtbParent::read(stream, limits.max_dtb_depth)?)
        } else {
            None
        };
        let note = if revision.revision != 0 {
            Some(stream.read_symbol()?)
        } else {
            None
        };
        Ok(Some(Self {
            revision,
            type_name,
            tree,
            note,
        }))
    }

    /// Write `block`, or an empty block when `None`, if the directory
    /// version calls for one.
    pub fn write(
        block: Option<&Self>,
        stream: &mut BinaryStream,
        dir_version: u32,
        limits: &Limits,
    ) -> SceneResult<()> {
        if !Self::is_present(dir_version) {
            return Ok(());
        }
        let empty;
        let block = match block {
            Some(block) => block,
            None => {
                empty = Self::empty();
                &empty
            }
        };

        stream.write_version_tag(block.revision)?;
        stream.write_symbol(&block.type_name)?;
        stream.write_bool(block.tree.is_some())?;
        if let Some(tree) = &block.tree {
            tree.write(stream, limits.max_dtb_depth)?;
        }
        if block.revision.revision != 0 {
            match &block.note {
                Some(note) => stream.write_symbol(note)?,
                None => stream.write_symbol(&Symbol::empty())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milo_dtb::DtbNode;
    use milo_types::Endian;

    fn limits() -> Limits {
        Limits::default()
    }

    fn write(block: Option<&MetadataBlock>, dir_version: u32) -> Vec<u8> {
        let mut s = BinaryStream::new();
        MetadataBlock::write(block, &mut s, dir_version, &limits()).unwrap();
        s.into_bytes()
    }

    fn read(bytes: Vec<u8>, dir_version: u32) -> Option<MetadataBlock> {
        let mut s = BinaryStream::from_bytes(bytes);
        let block = MetadataBlock::read(&mut s, dir_version, &limits()).unwrap();
        assert!(s.is_at_end());
        block
    }

    fn full_block() -> MetadataBlock {
        MetadataBlock {
            revision: VersionTag::primary(2),
            type_name: "spotlight".into(),
            tree: Some(DtbParent::new(
                4,
                vec![DtbNode::Symbol("intensity".into()), DtbNode::Float(0.75)],
            )),
            note: Some("tweaked for venue".into()),
        }
    }

    #[test]
    fn absent_at_old_directory_versions() {
        for v in [6, 10] {
            assert!(write(Some(&full_block()), v).is_empty());
            assert_eq!(read(Vec::new(), v), None);
        }
    }

    #[test]
    fn full_block_survives() {
        let block = full_block();
        let bytes = write(Some(&block), 25);
        assert_eq!(read(bytes, 25), Some(block));
    }

    #[test]
    fn revision_zero_has_no_note() {
        let block = MetadataBlock {
            revision: VersionTag::primary(0),
            type_name: "t".into(),
            tree: None,
            note: Some("dropped".into()),
        };
        let bytes = write(Some(&block), 24);
        // revision word, symbol "t", has-tree flag
        assert_eq!(bytes.len(), 4 + 4 + 1 + 1);
        let back = read(bytes, 24).unwrap();
        assert_eq!(back.note, None);
    }

    #[test]
    fn missing_note_is_written_empty() {
        let block = MetadataBlock {
            revision: VersionTag::primary(1),
            type_name: Symbol::empty(),
            tree: None,
            note: None,
        };
        let back = read(write(Some(&block), 24), 24).unwrap();
        assert_eq!(back.note, Some(Symbol::empty()));
    }

    #[test]
    fn missing_block_writes_empty_one() {
        let bytes = write(None, 32);
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(read(bytes, 32), Some(MetadataBlock::empty()));
    }

    #[test]
    fn big_endian_tree() {
        let block = full_block();
        let mut s = BinaryStream::new().with_endian(Endian::Big);
        MetadataBlock::write(Some(&block), &mut s, 28, &limits()).unwrap();
        let mut s = BinaryStream::from_bytes(s.into_bytes()).with_endian(Endian::Big);
        assert_eq!(MetadataBlock::read(&mut s, 28, &limits()).unwrap(), Some(block));
    }

    #[test]
    fn tree_depth_ceiling() {
        let mut deep = DtbParent::new(0, vec![DtbNode::Int(1)]);
        for id in 1..5 {
            deep = DtbParent::new(id, vec![DtbNode::Array(deep)]);
        }
        let block = MetadataBlock {
            tree: Some(deep),
            ..MetadataBlock::empty()
        };
        let bytes = write(Some(&block), 25);
        let mut tight = limits();
        tight.max_dtb_depth = 2;
        let err = MetadataBlock::read(&mut BinaryStream::from_bytes(bytes), 25, &tight).unwrap_err();
        assert!(err.is_sanity_violation());
    }
}
