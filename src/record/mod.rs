//! Generic positional records.
//!
//! A [`StructuredRecord`] is what a columnar engine hands to a row function:
//! an ordered list of values with no field names. Each record type declares a
//! [`RecordSchema`] whose field order is the contract shared by its encoder
//! and decoder; reordering a type's fields means bumping the schema version.

pub mod codec;

use thiserror::Error;

use crate::domain::model::InvalidGroupError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Record(StructuredRecord),
    /// Sequence of nested records; an entry may be absent.
    Records(Vec<Option<StructuredRecord>>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
            Value::Records(_) => "record sequence",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<StructuredRecord> for Value {
    fn from(v: StructuredRecord) -> Self {
        Value::Record(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord(pub Vec<Value>);

impl StructuredRecord {
    pub fn new(fields: Vec<Value>) -> Self {
        Self(fields)
    }

    /// 以文字欄位建立記錄，例如 CSV 的一列
    pub fn from_texts<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(|c| Value::Text(c.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn fields(&self) -> &[Value] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
    /// Nested record, named by its schema.
    Record(&'static str),
    Records(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Versioned field-order contract of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub version: u32,
    pub fields: &'static [FieldDef],
}

impl RecordSchema {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Checks the record is long enough and returns a positional reader.
    /// Trailing fields beyond the schema are ignored.
    pub fn reader<'a>(&'static self, record: &'a StructuredRecord) -> Result<FieldReader<'a>, DecodeError> {
        if record.len() < self.field_count() {
            return Err(DecodeError::MissingField {
                record: self.name,
                expected: self.field_count(),
                len: record.len(),
            });
        }
        Ok(FieldReader {
            schema: self,
            record,
        })
    }

    pub fn writer(&'static self) -> FieldWriter {
        FieldWriter {
            schema: self,
            fields: Vec::with_capacity(self.field_count()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{record} record has {len} fields, expected at least {expected}")]
    MissingField {
        record: &'static str,
        expected: usize,
        len: usize,
    },

    #[error("{record}.{field} (position {index}): expected {expected}, found {found}")]
    TypeMismatch {
        record: &'static str,
        field: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{record}.{field}: value {value} does not fit a 32-bit integer")]
    OutOfRange {
        record: &'static str,
        field: &'static str,
        value: i64,
    },

    #[error("{record}.{field}: entry {position} of the sequence is null")]
    NullEntry {
        record: &'static str,
        field: &'static str,
        position: usize,
    },

    #[error(transparent)]
    InvalidGroup(#[from] InvalidGroupError),
}

/// A Rust type with a positional structured form.
pub trait StructuredType: Sized {
    const SCHEMA: &'static RecordSchema;

    fn from_structured_record(record: &StructuredRecord) -> Result<Self, DecodeError>;

    fn to_structured_record(&self) -> StructuredRecord;
}

/// Positional, type-coercing access to a record already checked against its schema.
/// Reading a position the schema does not declare is a `MissingField` error.
pub struct FieldReader<'a> {
    schema: &'static RecordSchema,
    record: &'a StructuredRecord,
}

impl<'a> FieldReader<'a> {
    /// Fails with `MissingField` when `index` is past the schema or the record.
    fn value(&self, index: usize) -> Result<&'a Value, DecodeError> {
        match (self.schema.fields.get(index), self.record.get(index)) {
            (Some(_), Some(value)) => Ok(value),
            _ => Err(DecodeError::MissingField {
                record: self.schema.name,
                expected: index + 1,
                len: self.schema.field_count().min(self.record.len()),
            }),
        }
    }

    fn field_name(&self, index: usize) -> &'static str {
        self.schema.fields.get(index).map_or("?", |f| f.name)
    }

    fn mismatch(&self, index: usize, expected: &'static str, found: &Value) -> DecodeError {
        DecodeError::TypeMismatch {
            record: self.schema.name,
            field: self.field_name(index),
            index,
            expected,
            found: found.kind_name(),
        }
    }

    /// Integer field. Text holding a base-10 integer is coerced.
    pub fn int(&self, index: usize) -> Result<i64, DecodeError> {
        let value = self.value(index)?;
        match value {
            Value::Int(v) => Ok(*v),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.mismatch(index, "integer", value)),
            other => Err(self.mismatch(index, "integer", other)),
        }
    }

    pub fn int32(&self, index: usize) -> Result<i32, DecodeError> {
        let value = self.int(index)?;
        i32::try_from(value).map_err(|_| DecodeError::OutOfRange {
            record: self.schema.name,
            field: self.field_name(index),
            value,
        })
    }

    pub fn text(&self, index: usize) -> Result<String, DecodeError> {
        match self.value(index)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(self.mismatch(index, "text", other)),
        }
    }

    pub fn nested<T: StructuredType>(&self, index: usize) -> Result<T, DecodeError> {
        match self.value(index)? {
            Value::Record(r) => T::from_structured_record(r),
            other => Err(self.mismatch(index, "record", other)),
        }
    }

    /// Decodes every entry of a record sequence, keeping order.
    pub fn sequence<T: StructuredType>(&self, index: usize) -> Result<Vec<T>, DecodeError> {
        let entries = match self.value(index)? {
            Value::Records(entries) => entries,
            other => return Err(self.mismatch(index, "record sequence", other)),
        };

        entries
            .iter()
            .enumerate()
            .map(|(position, entry)| match entry {
                Some(r) => T::from_structured_record(r),
                None => Err(DecodeError::NullEntry {
                    record: self.schema.name,
                    field: self.field_name(index),
                    position,
                }),
            })
            .collect()
    }
}

/// Builds a record in schema order.
pub struct FieldWriter {
    schema: &'static RecordSchema,
    fields: Vec<Value>,
}

impl FieldWriter {
    pub fn push(mut self, value: impl Into<Value>) -> Self {
        self.fields.push(value.into());
        self
    }

    pub fn push_nested<T: StructuredType>(self, value: &T) -> Self {
        self.push(value.to_structured_record())
    }

    pub fn push_sequence<T: StructuredType>(mut self, values: &[T]) -> Self {
        let entries = values.iter().map(|v| Some(v.to_structured_record())).collect();
        self.fields.push(Value::Records(entries));
        self
    }

    pub fn finish(self) -> StructuredRecord {
        debug_assert_eq!(
            self.fields.len(),
            self.schema.field_count(),
            "{} writer produced a record of the wrong width",
            self.schema.name
        );
        StructuredRecord(self.fields)
    }
}

pub use codec::{decode_all, FLAT_ROW_SCHEMA};
