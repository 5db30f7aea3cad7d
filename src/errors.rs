//! Error types for shape compilation, field coercion, row binding and decoding.

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::field::Kind;

/// Errors produced by a coercion function while converting text into a field value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// Text is not a base-10 integer.
    #[error(transparent)]
    Int(#[from] ParseIntError),
    /// Text is not a floating point number.
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    /// Parsed value does not fit the field's width.
    #[error("overflow")]
    Overflow,
    /// Timestamp field has no format in its tag.
    #[error("missing format info in tag")]
    MissingFormat,
    /// Text does not match the timestamp format.
    #[error(transparent)]
    Timestamp(#[from] chrono::ParseError),
    /// The coercion function was handed a field it cannot fill.
    #[error("unsupported field type: {0}")]
    Unsupported(Kind),
    /// Failure reported by a user supplied coercion.
    #[error("{0}")]
    Custom(String),
}

impl CoerceError {
    /// Builds a [`CoerceError::Custom`] from any displayable message.
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        CoerceError::Custom(msg.to_string())
    }
}

/// Errors produced when binding one row onto a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// Positional mode and the row length differs from the record's field count.
    #[error("struct field count ({fields}) didn't match data column count ({columns})")]
    FieldCountMismatch { fields: usize, columns: usize },
    /// No coercion is registered for the field's kind.
    #[error("unassignable field type for field {field}: {kind}")]
    UnassignableKind { field: String, kind: Kind },
    /// The index points past the end of the row.
    #[error("column {position} for field {field} is out of range ({columns} columns)")]
    MissingColumn {
        field: String,
        position: usize,
        columns: usize,
    },
    /// The record's shape declares a field its accessor cannot hand out.
    #[error("record has no accessor for field {field}")]
    MissingAccessor { field: String },
    /// The coercion for the field failed.
    #[error("error assigning value to field {field}: {source}")]
    Assign {
        field: String,
        #[source]
        source: CoerceError,
    },
}

/// Errors produced by a [`crate::decoder::Decoder`].
///
/// End of input is not an error: [`crate::decoder::Decoder::decode`] returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Binding failed; `line` is the 1-based line counter of the session.
    #[error("error on line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: BindError,
    },
    /// A header (or explicit indexes) was set after the first line was read.
    #[error("read_header can only be called once, and only before decode")]
    HeaderAfterDecode,
    /// The underlying row reader failed.
    #[error("read error: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    /// The bind error behind a [`DecodeError::Line`], if any.
    pub fn bind_error(&self) -> Option<&BindError> {
        match self {
            DecodeError::Line { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors produced when compiling a runtime [`crate::schema::DynamicShape`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Field name is empty or declared twice.
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),
    /// The kind has no dynamic value representation.
    #[error("field {field} has unsupported kind {kind}")]
    UnsupportedKind { field: String, kind: Kind },
    /// A kind name in a textual description is not recognized.
    #[error("unknown field kind {0:?}")]
    UnknownKind(String),
}
