//! # rowbind
//!
//! Binds rows of text values, already split into columns, onto the fields of typed records.
//!
//! Each field has a [`field::Kind`] and an optional tag `"name,format"`. A
//! [`decoder::Decoder`] reads rows from a [`reader::RowReader`] and, for every field, picks
//! the column (by position, or by name once a header is read), then converts the text with
//! the coercion registered for the field's kind in a [`coerce::Registry`]. Integers,
//! unsigned integers, floats, strings and timestamps are supported out of the box; other
//! kinds need a registered coercion.
//!
//! ## Example
//!
//! ```
//! use rowbind::{record, decoder::Decoder, reader::Rows, temporal::Timestamp};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Student {
//!         pub name: String,
//!         pub age: u8,
//!         #[tag = "born,%Y-%m-%d"]
//!         pub birthday: Timestamp,
//!     }
//! }
//!
//! let rows = Rows::new([
//!     ["age", "name", "born"],
//!     ["21", "John", "1994-05-14"],
//!     ["24", "Susan", "1991-12-03"],
//! ]);
//!
//! let mut decoder = Decoder::new(rows);
//! decoder.read_header().unwrap();
//!
//! let mut student = Student::default();
//! while decoder.decode(&mut student).unwrap() {
//!     println!("{} ({}) born {}", student.name, student.age, student.birthday.date_naive());
//! }
//! assert_eq!(student.name, "Susan");
//! assert_eq!(student.age, 24);
//! ```

pub mod binder;
pub mod coerce;
pub mod decoder;
pub mod errors;
pub mod field;
pub mod reader;
pub mod resolve;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod temporal;

pub use binder::bind;
pub use coerce::{CoerceFn, Coercion, Registry};
pub use decoder::Decoder;
pub use errors::{BindError, CoerceError, DecodeError, ShapeError};
pub use field::{FieldDescriptor, FieldMut, FieldTag, FieldValue, Kind, Record, RecordShape};
pub use resolve::NameIndex;
