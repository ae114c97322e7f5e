use std::collections::BTreeMap;

use milo_types::{Symbol, VersionTag};
use serde::{Deserialize, Serialize};

use crate::field::FieldValue;
use crate::metadata::MetadataBlock;

/// What a record carries in front of its own fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordBase {
    #[default]
    None,
    /// Generic object header; `None` when the directory version has none.
    Object(Option<MetadataBlock>),
    /// The parent type's record, with its own revision word.
    Record(Box<Record>),
}

impl RecordBase {
    pub fn describe(&self) -> String {
        match self {
            Self::None => "no base".to_string(),
            Self::Object(_) => "object header".to_string(),
            Self::Record(r) => format!("{} record", r.type_name),
        }
    }
}

/// Uniform decoded node returned by every type handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: Symbol,
    pub revision: VersionTag,
    pub base: RecordBase,
    /// Values of the fields admitted by `revision`.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(type_name: impl Into<Symbol>, revision: VersionTag, base: RecordBase) -> Self {
        Self {
            type_name: type_name.into(),
            revision,
            base,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.get(name).and_then(FieldValue::as_symbol)
    }

    pub fn base_record(&self) -> Option<&Record> {
        match &self.base {
            RecordBase::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn base_record_mut(&mut self) -> Option<&mut Record> {
        match &mut self.base {
            RecordBase::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The object header, looked up through the base chain.
    pub fn metadata(&self) -> Option<&MetadataBlock> {
        match &self.base {
            RecordBase::None => None,
            RecordBase::Object(block) => block.as_ref(),
            RecordBase::Record(r) => r.metadata(),
        }
    }

    /// Type names from this record down to the root of its base chain.
    pub fn lineage(&self) -> Vec<&Symbol> {
        let mut chain = vec![&self.type_name];
        let mut current = self;
        while let Some(base) = current.base_record() {
            chain.push(&base.type_name);
            current = base;
        }
        chain
    }
}
