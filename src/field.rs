//! Field descriptors, field handles and the [`Record`] trait that ties them to a type.
//!
//! A record exposes an ordered table of [`FieldDescriptor`]s (its [`RecordShape`]) and
//! hands out a [`FieldMut`] for the field at a given position. The [`crate::record!`]
//! macro builds both for a plain struct.

use std::{any::Any, borrow::Cow, fmt, ops::Deref, str::FromStr, sync::Arc};

use crate::{errors::ShapeError, temporal::Timestamp};

/// The kind of a record field, used to pick a coercion from a [`crate::coerce::Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Str,
    Timestamp,
    Bool,
    Char,
    /// A user type, named by its implementor.
    Other(&'static str),
}

impl Kind {
    /// Kinds with a coercion in the default registry.
    pub const DEFAULTS: [Kind; 14] = [
        Kind::I8,
        Kind::I16,
        Kind::I32,
        Kind::I64,
        Kind::Isize,
        Kind::U8,
        Kind::U16,
        Kind::U32,
        Kind::U64,
        Kind::Usize,
        Kind::F32,
        Kind::F64,
        Kind::Str,
        Kind::Timestamp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Str => "string",
            Kind::Timestamp => "timestamp",
            Kind::Bool => "bool",
            Kind::Char => "char",
            Kind::Other(name) => *name,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the built-in kind names produced by [`Kind::name`]. User kinds cannot be parsed.
impl FromStr for Kind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::DEFAULTS
            .iter()
            .chain(&[Kind::Bool, Kind::Char])
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| ShapeError::UnknownKind(s.to_string()))
    }
}

/// Exclusive handle to one field of a record instance.
pub enum FieldMut<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Str(&'a mut String),
    Timestamp(&'a mut Timestamp),
    Bool(&'a mut bool),
    Char(&'a mut char),
    /// A user type together with the name used in its [`Kind::Other`].
    Other(&'static str, &'a mut dyn Any),
}

impl<'a> FieldMut<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            FieldMut::I8(_) => Kind::I8,
            FieldMut::I16(_) => Kind::I16,
            FieldMut::I32(_) => Kind::I32,
            FieldMut::I64(_) => Kind::I64,
            FieldMut::Isize(_) => Kind::Isize,
            FieldMut::U8(_) => Kind::U8,
            FieldMut::U16(_) => Kind::U16,
            FieldMut::U32(_) => Kind::U32,
            FieldMut::U64(_) => Kind::U64,
            FieldMut::Usize(_) => Kind::Usize,
            FieldMut::F32(_) => Kind::F32,
            FieldMut::F64(_) => Kind::F64,
            FieldMut::Str(_) => Kind::Str,
            FieldMut::Timestamp(_) => Kind::Timestamp,
            FieldMut::Bool(_) => Kind::Bool,
            FieldMut::Char(_) => Kind::Char,
            FieldMut::Other(name, _) => Kind::Other(*name),
        }
    }

    /// Downcasts a user field to its concrete type.
    pub fn downcast<T: Any>(self) -> Option<&'a mut T> {
        match self {
            FieldMut::Other(_, value) => value.downcast_mut::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldMut").field(&self.kind()).finish()
    }
}

/// A type that can be a record field.
///
/// Implemented for the primitives, `String`, `bool`, `char` and [`Timestamp`]. User types
/// implement it with a [`Kind::Other`] and [`FieldMut::Other`] and need a coercion
/// registered for that kind.
pub trait FieldValue {
    const KIND: Kind;

    fn field_mut(&mut self) -> FieldMut<'_>;
}

macro_rules! field_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: Kind = Kind::$variant;

                fn field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::$variant(self)
                }
            }
        )*
    };
}

field_value! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => Str,
    Timestamp => Timestamp,
    bool => Bool,
    char => Char,
}

/// Metadata parsed from a field tag of the form `"name,format"`.
///
/// An empty name means "use the declared name"; an empty or absent format means no format.
/// Everything after the first comma is the format, so formats may contain commas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldTag<'a> {
    pub name: Option<&'a str>,
    pub format: Option<&'a str>,
}

impl<'a> FieldTag<'a> {
    pub fn parse(tag: &'a str) -> Self {
        let (name, format) = match tag.split_once(',') {
            Some((name, format)) => (name, Some(format)),
            None => (tag, None),
        };

        FieldTag {
            name: Some(name).filter(|n| !n.is_empty()),
            format: format.filter(|f| !f.is_empty()),
        }
    }
}

/// One entry of a record's field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared field name.
    pub name: Cow<'static, str>,
    pub kind: Kind,
    /// Raw tag, see [`FieldTag`].
    pub tag: Cow<'static, str>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: Kind, tag: &'static str) -> Self {
        FieldDescriptor {
            name: Cow::Borrowed(name),
            kind,
            tag: Cow::Borrowed(tag),
        }
    }

    pub fn owned(name: impl Into<String>, kind: Kind, tag: impl Into<String>) -> Self {
        FieldDescriptor {
            name: Cow::Owned(name.into()),
            kind,
            tag: Cow::Owned(tag.into()),
        }
    }

    /// Parses the tag. Not cached: a changed tag changes behavior on the next call.
    pub fn tag(&self) -> FieldTag<'_> {
        FieldTag::parse(&self.tag)
    }

    /// The override name from the tag, or the declared name.
    pub fn resolved_name(&self) -> &str {
        self.tag().name.unwrap_or(&self.name)
    }
}

/// Ordered field table of a record type.
#[derive(Debug, Clone)]
pub enum RecordShape {
    /// Built at compile time, usually by [`crate::record!`].
    Static(&'static [FieldDescriptor]),
    /// Built at runtime, see [`crate::schema::DynamicShape`].
    Shared(Arc<[FieldDescriptor]>),
}

impl Deref for RecordShape {
    type Target = [FieldDescriptor];

    fn deref(&self) -> &Self::Target {
        match self {
            RecordShape::Static(fields) => fields,
            RecordShape::Shared(fields) => fields,
        }
    }
}

/// A decode target: a field table plus positional access to the fields of an instance.
///
/// `field_mut(i)` must return the field described by `shape()[i]`.
pub trait Record {
    fn shape(&self) -> RecordShape;

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}

/// Declares a struct and implements [`Record`] for it.
///
/// Fields are bound in declaration order. An optional `#[tag = "name,format"]` sets the
/// override name used with a header and the format used by timestamp fields. Other field
/// attributes, doc comments included, are kept on the generated field.
///
/// ```
/// use rowbind::{record, temporal::Timestamp};
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Student {
///         /// Full name as written in the register.
///         #[tag = "name"]
///         pub name: String,
///         pub age: u8,
///         #[tag = "birthday,%Y-%m-%d"]
///         pub birthday: Timestamp,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };

    // Field attributes are peeled one at a time: the tag is kept aside, the rest are
    // collected for the generated field.
    (@fields ($($head:tt)*) $name:ident [$($done:tt)*] [$($attrs:tt)*] [$($tag:tt)*]
        #[tag = $t:literal] $($rest:tt)*
    ) => {
        $crate::record!(@fields ($($head)*) $name [$($done)*] [$($attrs)*] [$t] $($rest)*);
    };
    (@fields ($($head:tt)*) $name:ident [$($done:tt)*] [$($attrs:tt)*] [$($tag:tt)*]
        #[$attr:meta] $($rest:tt)*
    ) => {
        $crate::record!(@fields ($($head)*) $name [$($done)*] [$($attrs)* #[$attr]] [$($tag)*] $($rest)*);
    };
    (@fields ($($head:tt)*) $name:ident [$($done:tt)*] [] []) => {
        $crate::record!(@emit ($($head)*) $name $($done)*);
    };
    (@fields ($($head:tt)*) $name:ident [$($done:tt)*] [$($attrs:tt)*] [$($tag:tt)*]
        $fvis:vis $field:ident : $fty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@fields ($($head)*) $name
            [$($done)* { [$($attrs)*] ($fvis) $field ($fty) [$($tag)*] }] [] []
            $($($rest)*)?
        );
    };

    (@emit ($($head:tt)*) $name:ident
        $({ [$($attrs:tt)*] ($fvis:vis) $field:ident ($fty:ty) [$($tag:tt)*] })*
    ) => {
        $($head)* struct $name {
            $( $($attrs)* $fvis $field: $fty, )*
        }

        impl $crate::field::Record for $name {
            fn shape(&self) -> $crate::field::RecordShape {
                const FIELDS: &[$crate::field::FieldDescriptor] = &[
                    $(
                        $crate::field::FieldDescriptor::new(
                            stringify!($field),
                            <$fty as $crate::field::FieldValue>::KIND,
                            $crate::record!(@tag $($tag)*),
                        ),
                    )*
                ];
                $crate::field::RecordShape::Static(FIELDS)
            }

            #[allow(unused_mut, unused_assignments)]
            fn field_mut(&mut self, index: usize) -> Option<$crate::field::FieldMut<'_>> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some($crate::field::FieldValue::field_mut(&mut self.$field));
                    }
                    position += 1;
                )*
                None
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::record!(@fields ($(#[$meta])* $vis) $name [] [] [] $($body)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record! {
        #[derive(Debug, Default, PartialEq)]
        struct Tagged {
            #[tag = "myString"]
            s: String,
            i: i64,
            #[tag = ",%Y-%m-%d"]
            d: Timestamp,
        }
    }

    #[test]
    fn test_parse_tag_name_and_format() {
        assert_eq!(
            FieldTag::parse("date,%Y-%m-%d"),
            FieldTag {
                name: Some("date"),
                format: Some("%Y-%m-%d")
            }
        );
    }

    #[test]
    fn test_parse_tag_without_comma() {
        assert_eq!(
            FieldTag::parse("age"),
            FieldTag {
                name: Some("age"),
                format: None
            }
        );
    }

    #[test]
    fn test_parse_tag_empty_halves() {
        assert_eq!(FieldTag::parse(""), FieldTag::default());
        assert_eq!(FieldTag::parse(","), FieldTag::default());
        assert_eq!(
            FieldTag::parse(",%d/%m/%Y"),
            FieldTag {
                name: None,
                format: Some("%d/%m/%Y")
            }
        );
    }

    #[test]
    fn test_parse_tag_format_keeps_commas() {
        assert_eq!(FieldTag::parse("when,%b %d, %Y").format, Some("%b %d, %Y"));
    }

    #[test]
    fn test_resolved_name() {
        let plain = FieldDescriptor::new("Age", Kind::I32, "");
        let renamed = FieldDescriptor::new("Age", Kind::I32, "age");
        let format_only = FieldDescriptor::new("D", Kind::Timestamp, ",%Y");

        assert_eq!(plain.resolved_name(), "Age");
        assert_eq!(renamed.resolved_name(), "age");
        assert_eq!(format_only.resolved_name(), "D");
    }

    #[test]
    fn test_record_macro_shape() {
        let record = Tagged::default();
        let shape = record.shape();

        assert_eq!(
            &shape[..],
            &[
                FieldDescriptor::new("s", Kind::Str, "myString"),
                FieldDescriptor::new("i", Kind::I64, ""),
                FieldDescriptor::new("d", Kind::Timestamp, ",%Y-%m-%d"),
            ]
        );
    }

    #[test]
    fn test_record_macro_field_mut() {
        let mut record = Tagged::default();

        match record.field_mut(1) {
            Some(FieldMut::I64(v)) => *v = 7,
            other => panic!("unexpected handle {:?}", other),
        }

        assert_eq!(record.i, 7);
        assert_eq!(record.field_mut(0).map(|f| f.kind()), Some(Kind::Str));
        assert!(record.field_mut(3).is_none());
    }

    crate::record! {
        #[derive(Debug, Default, PartialEq)]
        pub(crate) struct Documented {
            /// Customer name.
            #[tag = "customer"]
            pub name: String,
            #[allow(dead_code)]
            /// Amount in whole units.
            pub(crate) amount: u32,
            #[tag = "since,%Y-%m-%d"]
            #[doc = "Date the account was opened."]
            since: Timestamp
        }
    }

    #[test]
    fn test_record_macro_keeps_field_attributes() {
        let mut record = Documented::default();

        assert_eq!(
            &record.shape()[..],
            &[
                FieldDescriptor::new("name", Kind::Str, "customer"),
                FieldDescriptor::new("amount", Kind::U32, ""),
                FieldDescriptor::new("since", Kind::Timestamp, "since,%Y-%m-%d"),
            ]
        );

        if let Some(FieldMut::U32(v)) = record.field_mut(1) {
            *v = 12;
        }
        assert_eq!(record.amount, 12);
        assert_eq!(record.field_mut(2).map(|f| f.kind()), Some(Kind::Timestamp));
        assert_eq!(record.since, Timestamp::default());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("u16".parse::<Kind>(), Ok(Kind::U16));
        assert_eq!("string".parse::<Kind>(), Ok(Kind::Str));
        assert_eq!("bool".parse::<Kind>(), Ok(Kind::Bool));
        assert_eq!(
            "decimal".parse::<Kind>(),
            Err(ShapeError::UnknownKind("decimal".to_string()))
        );
    }

    #[test]
    fn test_downcast_other() {
        #[derive(Debug, PartialEq)]
        struct Money(i64);

        let mut money = Money(1);
        let handle = FieldMut::Other("money", &mut money);
        assert_eq!(handle.kind(), Kind::Other("money"));

        if let Some(m) = handle.downcast::<Money>() {
            m.0 = 5;
        }
        assert_eq!(money, Money(5));
    }
}
