//! Runtime shapes: records whose fields are only known at runtime.
//!
//! Use [`DynamicShape::compile`] to build a shape from [`DynamicField`]s, then
//! [`DynamicShape::record`] to get a zeroed [`DynamicRecord`] to decode into.

use std::{collections::HashSet, sync::Arc};

use crate::{
    errors::ShapeError,
    field::{FieldDescriptor, FieldMut, FieldValue, Kind, Record, RecordShape},
    temporal::{Timestamp, zero_timestamp},
};

/// Definition of one field of a runtime shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicField {
    /// Declared name, also the key for [`DynamicRecord::get`].
    pub name: String,
    pub kind: Kind,
    /// Tag in `"name,format"` form, see [`crate::field::FieldTag`].
    pub tag: String,
}

impl DynamicField {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        DynamicField {
            name: name.into(),
            kind,
            tag: String::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::FieldDef> for DynamicField {
    type Error = ShapeError;

    fn try_from(value: crate::serde::FieldDef) -> Result<Self, Self::Error> {
        let tag = match (value.rename, value.format) {
            (rename, Some(format)) => format!("{},{}", rename.unwrap_or_default(), format),
            (Some(rename), None) => rename,
            (None, None) => String::new(),
        };

        Ok(DynamicField {
            kind: value.kind.parse()?,
            name: value.name,
            tag,
        })
    }
}

/// A value held by a [`DynamicRecord`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    Timestamp(Timestamp),
    Bool(bool),
    Char(char),
}

impl Value {
    /// The zero value of `kind`, or `None` for user kinds.
    pub fn zero(kind: Kind) -> Option<Value> {
        let value = match kind {
            Kind::I8 => Value::I8(0),
            Kind::I16 => Value::I16(0),
            Kind::I32 => Value::I32(0),
            Kind::I64 => Value::I64(0),
            Kind::Isize => Value::Isize(0),
            Kind::U8 => Value::U8(0),
            Kind::U16 => Value::U16(0),
            Kind::U32 => Value::U32(0),
            Kind::U64 => Value::U64(0),
            Kind::Usize => Value::Usize(0),
            Kind::F32 => Value::F32(0.0),
            Kind::F64 => Value::F64(0.0),
            Kind::Str => Value::Str(String::new()),
            Kind::Timestamp => Value::Timestamp(zero_timestamp()),
            Kind::Bool => Value::Bool(false),
            Kind::Char => Value::Char('\0'),
            Kind::Other(_) => return None,
        };

        Some(value)
    }

    pub fn field_mut(&mut self) -> FieldMut<'_> {
        match self {
            Value::I8(v) => v.field_mut(),
            Value::I16(v) => v.field_mut(),
            Value::I32(v) => v.field_mut(),
            Value::I64(v) => v.field_mut(),
            Value::Isize(v) => v.field_mut(),
            Value::U8(v) => v.field_mut(),
            Value::U16(v) => v.field_mut(),
            Value::U32(v) => v.field_mut(),
            Value::U64(v) => v.field_mut(),
            Value::Usize(v) => v.field_mut(),
            Value::F32(v) => v.field_mut(),
            Value::F64(v) => v.field_mut(),
            Value::Str(v) => v.field_mut(),
            Value::Timestamp(v) => v.field_mut(),
            Value::Bool(v) => v.field_mut(),
            Value::Char(v) => v.field_mut(),
        }
    }
}

/// A compiled runtime shape. Cheap to clone; every record built from it shares the
/// field table.
#[derive(Debug, Clone)]
pub struct DynamicShape {
    fields: Arc<[FieldDescriptor]>,
}

impl DynamicShape {
    /// Compiles field definitions into a shape. Fails on an empty or repeated name, or a
    /// kind without a [`Value`] representation.
    pub fn compile(fields: &[DynamicField]) -> Result<Self, ShapeError> {
        let mut seen = HashSet::with_capacity(fields.len());
        let mut descriptors = Vec::with_capacity(fields.len());

        for field in fields {
            if field.name.is_empty() || !seen.insert(field.name.as_str()) {
                return Err(ShapeError::InvalidFieldName(field.name.clone()));
            }
            if Value::zero(field.kind).is_none() {
                return Err(ShapeError::UnsupportedKind {
                    field: field.name.clone(),
                    kind: field.kind,
                });
            }

            descriptors.push(FieldDescriptor::owned(
                field.name.clone(),
                field.kind,
                field.tag.clone(),
            ));
        }

        Ok(DynamicShape {
            fields: descriptors.into(),
        })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// A record of this shape with every field at its zero value.
    pub fn record(&self) -> DynamicRecord {
        DynamicRecord {
            values: self
                .fields
                .iter()
                .filter_map(|field| Value::zero(field.kind))
                .collect(),
            shape: self.fields.clone(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::ShapeDef> for DynamicShape {
    type Error = ShapeError;

    fn try_from(value: crate::serde::ShapeDef) -> Result<Self, Self::Error> {
        let fields = value
            .fields
            .into_iter()
            .map(DynamicField::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        DynamicShape::compile(&fields)
    }
}

/// A record whose shape is a [`DynamicShape`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    shape: Arc<[FieldDescriptor]>,
    values: Vec<Value>,
}

impl DynamicRecord {
    /// Value of the field declared as `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let position = self.shape.iter().position(|field| field.name == name)?;
        self.values.get(position)
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl Record for DynamicRecord {
    fn shape(&self) -> RecordShape {
        RecordShape::Shared(self.shape.clone())
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        self.values.get_mut(index).map(Value::field_mut)
    }
}
