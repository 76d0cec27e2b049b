//! Reference codec for persistence contracts.
//!
//! Generated contracts move aggregate values in and out of key/value
//! mappings and positional rows. This module mirrors that behaviour over a
//! small value model so the encode/decode symmetry of a [`ContractPlan`] can
//! be checked without running generated code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use declsynth_kotlin::TypeName;

use crate::contract::ContractPlan;

// ── Values ───────────────────────────────────────────────────────────

/// A column value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Real(_) => "a real",
            Self::Text(_) => "text",
            Self::Blob(_) => "a blob",
        }
    }
}

/// Storage class of a column, derived from the property type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Bool,
    Blob,
    /// A type the value model does not know; any non-null value passes.
    Opaque,
}

impl ColumnKind {
    pub fn of(ty: &TypeName) -> Self {
        let Some(class) = ty.class() else {
            return Self::Opaque;
        };
        if class.package() != "kotlin" {
            return Self::Opaque;
        }
        match class.simple_name() {
            "String" | "Char" => Self::Text,
            "Int" | "Long" | "Short" | "Byte" => Self::Integer,
            "Double" | "Float" => Self::Real,
            "Boolean" => Self::Bool,
            "ByteArray" => Self::Blob,
            _ => Self::Opaque,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Text, Value::Text(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::Real, Value::Real(_))
                | (Self::Bool, Value::Bool(_))
                | (Self::Blob, Value::Blob(_))
                | (Self::Opaque, _)
        ) && *value != Value::Null
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Bool => "boolean",
            Self::Blob => "blob",
            Self::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// An aggregate value: property name to value.
pub type Record = BTreeMap<String, Value>;

/// Encoded form keyed by column name.
pub type Mapping = BTreeMap<String, Value>;

/// Encoded form in projection order.
pub type Row = Vec<Value>;

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("record has no value for property '{0}'")]
    MissingProperty(String),

    #[error("record has a value for unknown property '{0}'")]
    UnknownProperty(String),

    #[error("mapping has no entry for column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' holds {expected} values, got {actual}")]
    KindMismatch {
        column: String,
        expected: ColumnKind,
        actual: &'static str,
    },

    #[error("column '{0}' is not nullable")]
    UnexpectedNull(String),

    #[error("row has {actual} values, projection has {expected}")]
    RowLength { expected: usize, actual: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;

// ── Codec ────────────────────────────────────────────────────────────

impl ContractPlan {
    /// Column names in projection order.
    pub fn projection(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }

    /// The content address the generated `uri` evaluates to.
    pub fn uri(&self, scheme: &str) -> String {
        format!("{}://{}/{}", scheme, self.authority, self.path)
    }

    /// `toContentValues`: one entry per stored property.
    pub fn encode(&self, record: &Record) -> CodecResult<Mapping> {
        self.reject_unknown(record)?;
        let mut mapping = Mapping::new();
        for column in &self.columns {
            let value = record
                .get(&column.property)
                .ok_or_else(|| CodecError::MissingProperty(column.property.clone()))?;
            self.check(column, value)?;
            mapping.insert(column.column.clone(), value.clone());
        }
        Ok(mapping)
    }

    /// `ContentValues.value`: one read per property, cast to its type.
    pub fn decode_values(&self, mapping: &Mapping) -> CodecResult<Record> {
        let mut record = Record::new();
        for column in &self.columns {
            let value = mapping
                .get(&column.column)
                .ok_or_else(|| CodecError::MissingColumn(column.column.clone()))?;
            self.check(column, value)?;
            record.insert(column.property.clone(), value.clone());
        }
        Ok(record)
    }

    /// `addAsRow`: the record as a tuple in projection order.
    pub fn to_row(&self, record: &Record) -> CodecResult<Row> {
        self.reject_unknown(record)?;
        self.columns
            .iter()
            .map(|column| {
                let value = record
                    .get(&column.property)
                    .ok_or_else(|| CodecError::MissingProperty(column.property.clone()))?;
                self.check(column, value)?;
                Ok(value.clone())
            })
            .collect()
    }

    /// `Cursor.value`: positional read of a projection-ordered row.
    pub fn decode_row(&self, row: &[Value]) -> CodecResult<Record> {
        if row.len() != self.columns.len() {
            return Err(CodecError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        let mut record = Record::new();
        for (column, value) in self.columns.iter().zip(row) {
            self.check(column, value)?;
            record.insert(column.property.clone(), value.clone());
        }
        Ok(record)
    }

    fn check(&self, column: &crate::contract::ColumnPlan, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null if column.nullable => Ok(()),
            Value::Null => Err(CodecError::UnexpectedNull(column.column.clone())),
            other if column.kind.accepts(other) => Ok(()),
            other => Err(CodecError::KindMismatch {
                column: column.column.clone(),
                expected: column.kind,
                actual: other.kind_name(),
            }),
        }
    }

    fn reject_unknown(&self, record: &Record) -> CodecResult<()> {
        match record
            .keys()
            .find(|key| !self.columns.iter().any(|c| &c.property == *key))
        {
            Some(key) => Err(CodecError::UnknownProperty(key.clone())),
            None => Ok(()),
        }
    }
}
