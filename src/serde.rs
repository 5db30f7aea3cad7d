//! JSON-deserializable shape description.
//!
//! These types describe a runtime record shape, for example one shipped as a JSON file
//! next to the data it describes. Convert a [`ShapeDef`] into a
//! [`crate::schema::DynamicShape`] with `TryFrom`.
//!
//! ```json
//! {
//!   "fields": [
//!     { "name": "id", "kind": "u32" },
//!     { "name": "joined", "kind": "timestamp", "format": "%Y-%m-%d" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level shape definition: the fields of the record in column order.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShapeDef {
    pub fields: Vec<FieldDef>,
}

/// Description of one field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Declared field name.
    pub name: String,
    /// Kind name as printed by [`crate::field::Kind`]: `i8` .. `u64`, `isize`, `usize`,
    /// `f32`, `f64`, `string`, `timestamp`, `bool` or `char`.
    pub kind: String,
    /// Header name to look the field up by, if it differs from `name`.
    #[serde(default)]
    pub rename: Option<String>,
    /// Timestamp format in `chrono` strftime syntax.
    #[serde(default)]
    pub format: Option<String>,
}
