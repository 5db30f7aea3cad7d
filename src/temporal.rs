//! Timestamp fields and their default coercion.
//!
//! The format comes from the field tag (`",%Y-%m-%d"`) and uses `chrono` strftime syntax.
//! It is parsed from the tag on every call.

use chrono::{
    DateTime, FixedOffset,
    format::{ParseErrorKind, Parsed, StrftimeItems},
};

use crate::{
    coerce::Coercion,
    errors::CoerceError,
    field::{FieldMut, FieldTag},
};

/// The timestamp field type.
pub type Timestamp = DateTime<FixedOffset>;

/// The zero timestamp: the Unix epoch at offset zero.
pub fn zero_timestamp() -> Timestamp {
    DateTime::<FixedOffset>::default()
}

/// Parses `text` with `format`.
///
/// A format with an offset keeps the parsed offset. Elements the format leaves out are
/// filled the same way for every format: UTC, midnight, January 1st, and year zero when
/// there is no year at all. A time-only format therefore yields `0000-01-01`.
pub fn parse_timestamp(text: &str, format: &str) -> Result<Timestamp, chrono::ParseError> {
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, text, StrftimeItems::new(format))?;

    // Setters refuse to replace a parsed value, so each step only fills what is absent.
    // Steps run one at a time so that a date given by ordinal or week stays untouched.
    let fills: [fn(&mut Parsed); 4] = [
        |p| {
            let _ = p.set_offset(0);
        },
        |p| {
            let _ = p.set_hour(0);
            let _ = p.set_minute(0);
        },
        |p| {
            let _ = p.set_month(1);
            let _ = p.set_day(1);
        },
        |p| {
            let _ = p.set_year(0);
        },
    ];

    let mut result = parsed.to_datetime();
    for fill in fills {
        match result {
            Err(e) if e.kind() == ParseErrorKind::NotEnough => {}
            done => return done,
        }
        fill(&mut parsed);
        result = parsed.to_datetime();
    }
    result
}

/// Default coercion for [`crate::field::Kind::Timestamp`].
pub fn coerce_timestamp(text: &str, field: FieldMut<'_>, tag: &FieldTag<'_>) -> Coercion {
    assign_timestamp(text, field, tag).into()
}

fn assign_timestamp(text: &str, field: FieldMut<'_>, tag: &FieldTag<'_>) -> Result<(), CoerceError> {
    let slot = match field {
        FieldMut::Timestamp(slot) => slot,
        other => return Err(CoerceError::Unsupported(other.kind())),
    };

    if text.is_empty() {
        *slot = zero_timestamp();
        return Ok(());
    }

    let format = tag.format.ok_or(CoerceError::MissingFormat)?;
    *slot = parse_timestamp(text, format)?;

    Ok(())
}
