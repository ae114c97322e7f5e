//! Declarative record schemas.
//!
//! A [`Schema`] is a static description of one record type: which revisions
//! it understands, what sits in front of its fields, and its gated field
//! ladder. One driver reads and writes every schema, so both directions
//! always agree on which fields are present.
//!
//! Wire order: revision word, base, admitted fields, terminator (standalone
//! call sites only).

use std::collections::BTreeMap;

use milo_stream::BinaryStream;
use milo_types::{Symbol, VersionTag};

use crate::error::{SceneError, SceneResult};
use crate::field::FieldSpec;
use crate::metadata::MetadataBlock;
use crate::record::{Record, RecordBase};
use crate::registry::{Frame, TypeHandler};

/// Inclusive range of primary revisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevisionRange {
    pub min: u16,
    pub max: u16,
}

impl RevisionRange {
    pub const fn up_to(max: u16) -> Self {
        Self { min: 0, max }
    }

    pub fn contains(&self, revision: u16) -> bool {
        (self.min..=self.max).contains(&revision)
    }
}

/// What precedes a schema's own fields.
#[derive(Clone, Copy, Debug)]
pub enum SchemaBase {
    None,
    /// The generic object header.
    Object,
    /// A full record of the parent type, read without a terminator.
    Record(&'static Schema),
}

#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub name: &'static str,
    pub revisions: RevisionRange,
    /// Highest alternate revision understood.
    pub max_alt: u16,
    pub base: SchemaBase,
    pub fields: &'static [FieldSpec],
    /// A nested directory follows the record when it appears as an entry.
    pub owns_directory: bool,
}

impl Schema {
    pub fn supports(&self, tag: VersionTag) -> bool {
        self.revisions.contains(tag.revision) && tag.alt_revision <= self.max_alt
    }

    /// Newest revision this schema writes by default.
    pub fn latest(&self) -> VersionTag {
        VersionTag::primary(self.revisions.max)
    }

    /// Fields on the wire for `tag`, in order.
    pub fn active_fields(&self, tag: VersionTag) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(move |spec| spec.admits(tag))
    }

    fn check_revision(&self, tag: VersionTag) -> SceneResult<()> {
        if self.supports(tag) {
            Ok(())
        } else {
            Err(SceneError::unsupported_revision(self.name, tag))
        }
    }

    /// Build a record at `tag` with every admitted field zeroed, including a
    /// blank base chain at each parent's latest revision.
    pub fn blank(&self, tag: VersionTag, dir_version: u32) -> SceneResult<Record> {
        self.check_revision(tag)?;
        let base = match self.base {
            SchemaBase::None => RecordBase::None,
            SchemaBase::Object => RecordBase::Object(
                MetadataBlock::is_present(dir_version).then(MetadataBlock::empty),
            ),
            SchemaBase::Record(parent) => {
                RecordBase::Record(Box::new(parent.blank(parent.latest(), dir_version)?))
            }
        };
        let fields: BTreeMap<String, _> = self
            .active_fields(tag)
            .map(|spec| (spec.name.to_string(), spec.codec.default_value()))
            .collect();
        Ok(Record {
            type_name: Symbol::from(self.name),
            revision: tag,
            base,
            fields,
        })
    }

    pub fn read_record(&self, stream: &mut BinaryStream, frame: &Frame) -> SceneResult<Record> {
        let revision = stream.read_version_tag()?;
        self.check_revision(revision)?;

        let base = match self.base {
            SchemaBase::None => RecordBase::None,
            SchemaBase::Object => {
                RecordBase::Object(MetadataBlock::read(stream, frame.dir_version, &frame.limits)?)
            }
            SchemaBase::Record(parent) => {
                RecordBase::Record(Box::new(parent.read_record(stream, &frame.embedded())?))
            }
        };

        let mut fields = BTreeMap::new();
        for spec in self.active_fields(revision) {
            fields.insert(spec.name.to_string(), spec.codec.read(stream)?);
        }

        if frame.standalone {
            stream.read_terminator()?;
        }

        Ok(Record {
            type_name: Symbol::from(self.name),
            revision,
            base,
            fields,
        })
    }

    pub fn write_record(
        &self,
        stream: &mut BinaryStream,
        record: &Record,
        frame: &Frame,
    ) -> SceneResult<()> {
        self.check_revision(record.revision)?;
        stream.write_version_tag(record.revision)?;

        match (self.base, &record.base) {
            (SchemaBase::None, RecordBase::None) => {}
            (SchemaBase::Object, RecordBase::Object(block)) => {
                MetadataBlock::write(block.as_ref(), stream, frame.dir_version, &frame.limits)?;
            }
            (SchemaBase::Record(parent), RecordBase::Record(base)) if base.type_name == parent.name => {
                parent.write_record(stream, base, &frame.embedded())?;
            }
            (expected, found) => {
                return Err(SceneError::BaseMismatch {
                    type_name: Symbol::from(self.name),
                    expected: describe_base(expected),
                    found: found.describe(),
                });
            }
        }

        for spec in self.active_fields(record.revision) {
            let value = record.fields.get(spec.name).ok_or_else(|| SceneError::MissingField {
                type_name: Symbol::from(self.name),
                field: spec.name,
            })?;
            spec.write(stream, value, self.name)?;
        }

        if frame.standalone {
            stream.write_terminator()?;
        }
        Ok(())
    }
}

fn describe_base(base: SchemaBase) -> String {
    match base {
        SchemaBase::None => "no base".to_string(),
        SchemaBase::Object => "object header".to_string(),
        SchemaBase::Record(parent) => format!("{} record", parent.name),
    }
}

impl TypeHandler for Schema {
    fn type_name(&self) -> &str {
        self.name
    }

    fn owns_directory(&self) -> bool {
        self.owns_directory
    }

    fn read(&self, stream: &mut BinaryStream, frame: &Frame) -> SceneResult<Record> {
        self.read_record(stream, frame)
    }

    fn write(&self, stream: &mut BinaryStream, record: &Record, frame: &Frame) -> SceneResult<()> {
        self.write_record(stream, record, frame)
    }
}
