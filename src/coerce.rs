//! Coercion functions and the per-kind [`Registry`] that dispatches to them.
//!
//! A coercion turns the text of one column into the value of one field, writing through
//! a [`FieldMut`]. It returns a [`Coercion`]:
//! - **Assigned**: the field holds the new value.
//! - **UseDefault**: the coercion declined; the binder runs the default for the kind.
//! - **Failed**: the field keeps its previous value and binding stops.

use std::{
    collections::HashMap,
    fmt,
    num::IntErrorKind,
    str::FromStr,
    sync::{Arc, LazyLock},
};

use crate::{
    errors::CoerceError,
    field::{FieldMut, FieldTag, Kind},
    temporal::coerce_timestamp,
};

/// Outcome of a coercion function.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    Assigned,
    /// Defer to the default coercion for the field's kind.
    UseDefault,
    Failed(CoerceError),
}

impl From<Result<(), CoerceError>> for Coercion {
    fn from(value: Result<(), CoerceError>) -> Self {
        match value {
            Ok(()) => Coercion::Assigned,
            Err(e) => Coercion::Failed(e),
        }
    }
}

/// A shareable coercion function: `(text, field, tag) -> Coercion`.
pub type CoerceFn = Arc<dyn Fn(&str, FieldMut<'_>, &FieldTag<'_>) -> Coercion + Send + Sync>;

static DEFAULTS: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::empty();

    for kind in [Kind::I8, Kind::I16, Kind::I32, Kind::I64, Kind::Isize] {
        registry.set(kind, coerce_int);
    }
    for kind in [Kind::U8, Kind::U16, Kind::U32, Kind::U64, Kind::Usize] {
        registry.set(kind, coerce_uint);
    }
    for kind in [Kind::F32, Kind::F64] {
        registry.set(kind, coerce_float);
    }
    registry.set(Kind::Str, coerce_text);
    registry.set(Kind::Timestamp, coerce_timestamp);

    registry
});

/// Mapping from [`Kind`] to the [`CoerceFn`] used for fields of that kind.
///
/// Lookups are exact: there is no fallback from one kind to another. Cloning is cheap and
/// a clone can be customized without affecting the original, including the shared defaults.
#[derive(Clone)]
pub struct Registry {
    coercions: HashMap<Kind, CoerceFn>,
}

impl Registry {
    /// A registry with no coercions at all.
    pub fn empty() -> Self {
        Registry {
            coercions: HashMap::new(),
        }
    }

    /// A copy of the default registry: integers, unsigned integers, floats, text and
    /// timestamps.
    pub fn defaults() -> Self {
        DEFAULTS.clone()
    }

    /// The default coercion for `kind`, independent of any customized registry.
    pub fn default_for(kind: Kind) -> Option<&'static CoerceFn> {
        DEFAULTS.get(kind)
    }

    pub fn get(&self, kind: Kind) -> Option<&CoerceFn> {
        self.coercions.get(&kind)
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.coercions.contains_key(&kind)
    }

    /// Sets the coercion for `kind`, replacing any previous one.
    pub fn set<F>(&mut self, kind: Kind, coerce: F) -> &mut Self
    where
        F: Fn(&str, FieldMut<'_>, &FieldTag<'_>) -> Coercion + Send + Sync + 'static,
    {
        self.coercions.insert(kind, Arc::new(coerce));
        self
    }

    /// Same as [`Registry::set`] for an already shared function, e.g. one taken from
    /// [`Registry::default_for`].
    pub fn set_fn(&mut self, kind: Kind, coerce: CoerceFn) -> &mut Self {
        self.coercions.insert(kind, coerce);
        self
    }

    pub fn remove(&mut self, kind: Kind) -> Option<CoerceFn> {
        self.coercions.remove(&kind)
    }

    /// Registered kinds, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.coercions.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::defaults()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&'static str> = self.kinds().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("Registry").field("kinds", &kinds).finish()
    }
}

/// Default coercion for signed integers. Empty text is zero.
pub fn coerce_int(text: &str, field: FieldMut<'_>, _tag: &FieldTag<'_>) -> Coercion {
    assign_int(text, field).into()
}

/// Default coercion for unsigned integers. Empty text is zero.
pub fn coerce_uint(text: &str, field: FieldMut<'_>, _tag: &FieldTag<'_>) -> Coercion {
    assign_uint(text, field).into()
}

/// Default coercion for floats. Empty text is zero.
pub fn coerce_float(text: &str, field: FieldMut<'_>, _tag: &FieldTag<'_>) -> Coercion {
    assign_float(text, field).into()
}

/// Default coercion for text: the column is copied verbatim.
pub fn coerce_text(text: &str, field: FieldMut<'_>, _tag: &FieldTag<'_>) -> Coercion {
    match field {
        FieldMut::Str(slot) => {
            slot.clear();
            slot.push_str(text);
            Coercion::Assigned
        }
        other => Coercion::Failed(CoerceError::Unsupported(other.kind())),
    }
}

fn assign_int(text: &str, field: FieldMut<'_>) -> Result<(), CoerceError> {
    let value = if text.is_empty() {
        0
    } else {
        text.parse::<i64>().map_err(int_error)?
    };

    match field {
        FieldMut::I8(slot) => *slot = narrow(value)?,
        FieldMut::I16(slot) => *slot = narrow(value)?,
        FieldMut::I32(slot) => *slot = narrow(value)?,
        FieldMut::I64(slot) => *slot = value,
        FieldMut::Isize(slot) => *slot = narrow(value)?,
        other => return Err(CoerceError::Unsupported(other.kind())),
    }

    Ok(())
}

fn assign_uint(text: &str, field: FieldMut<'_>) -> Result<(), CoerceError> {
    let value = if text.is_empty() {
        0
    } else {
        text.parse::<u64>().map_err(int_error)?
    };

    match field {
        FieldMut::U8(slot) => *slot = narrow(value)?,
        FieldMut::U16(slot) => *slot = narrow(value)?,
        FieldMut::U32(slot) => *slot = narrow(value)?,
        FieldMut::U64(slot) => *slot = value,
        FieldMut::Usize(slot) => *slot = narrow(value)?,
        other => return Err(CoerceError::Unsupported(other.kind())),
    }

    Ok(())
}

fn assign_float(text: &str, field: FieldMut<'_>) -> Result<(), CoerceError> {
    match field {
        FieldMut::F32(slot) => *slot = parse_float(text)?,
        FieldMut::F64(slot) => *slot = parse_float(text)?,
        other => return Err(CoerceError::Unsupported(other.kind())),
    }

    Ok(())
}

fn narrow<T, U>(value: U) -> Result<T, CoerceError>
where
    T: TryFrom<U>,
{
    T::try_from(value).map_err(|_| CoerceError::Overflow)
}

fn int_error(e: std::num::ParseIntError) -> CoerceError {
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::Overflow,
        _ => CoerceError::Int(e),
    }
}

/// Parses at the target width. A finite literal that only fits as infinity is an overflow.
fn parse_float<F>(text: &str) -> Result<F, CoerceError>
where
    F: FromStr<Err = std::num::ParseFloatError> + Default + Into<f64> + Copy,
{
    if text.is_empty() {
        return Ok(F::default());
    }

    let value: F = text.parse()?;
    let wide: f64 = value.into();
    if wide.is_infinite() && !text.to_ascii_lowercase().contains("inf") {
        return Err(CoerceError::Overflow);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(coerce: fn(&str, FieldMut<'_>, &FieldTag<'_>) -> Coercion, text: &str, field: FieldMut<'_>) -> Coercion {
        coerce(text, field, &FieldTag::default())
    }

    #[test]
    fn test_defaults_cover_builtin_kinds() {
        let registry = Registry::defaults();
        for kind in Kind::DEFAULTS {
            assert!(registry.contains(kind), "missing default for {}", kind);
        }
        assert!(!registry.contains(Kind::Bool));
        assert!(!registry.contains(Kind::Char));
        assert!(!registry.contains(Kind::Other("money")));
    }

    #[test]
    fn test_int_widths() {
        let mut small = 0i8;
        assert_eq!(run(coerce_int, "-128", FieldMut::I8(&mut small)), Coercion::Assigned);
        assert_eq!(small, -128);

        let mut wide = 0i64;
        assert_eq!(run(coerce_int, "+42", FieldMut::I64(&mut wide)), Coercion::Assigned);
        assert_eq!(wide, 42);
    }

    #[test]
    fn test_int_overflow_keeps_value() {
        let mut small = 3i8;
        assert_eq!(
            run(coerce_int, "128", FieldMut::I8(&mut small)),
            Coercion::Failed(CoerceError::Overflow)
        );
        assert_eq!(small, 3);

        let mut wide = 0i64;
        assert_eq!(
            run(coerce_int, "9223372036854775808", FieldMut::I64(&mut wide)),
            Coercion::Failed(CoerceError::Overflow)
        );
    }

    #[test]
    fn test_int_invalid() {
        let mut v = 0i32;
        let result = run(coerce_int, "1.5", FieldMut::I32(&mut v));
        assert!(matches!(result, Coercion::Failed(CoerceError::Int(_))));
    }

    #[test]
    fn test_uint() {
        let mut v = 0u16;
        assert_eq!(run(coerce_uint, "65535", FieldMut::U16(&mut v)), Coercion::Assigned);
        assert_eq!(v, 65535);
        assert_eq!(
            run(coerce_uint, "65536", FieldMut::U16(&mut v)),
            Coercion::Failed(CoerceError::Overflow)
        );
        assert!(matches!(
            run(coerce_uint, "-1", FieldMut::U16(&mut v)),
            Coercion::Failed(CoerceError::Int(_))
        ));
        assert_eq!(v, 65535);
    }

    #[test]
    fn test_float() {
        let mut single = 0f32;
        assert_eq!(run(coerce_float, "1.5", FieldMut::F32(&mut single)), Coercion::Assigned);
        assert_eq!(single, 1.5);

        let mut double = 0f64;
        assert_eq!(run(coerce_float, "-2.25e3", FieldMut::F64(&mut double)), Coercion::Assigned);
        assert_eq!(double, -2250.0);
    }

    #[test]
    fn test_float_overflow() {
        let mut single = 0f32;
        assert_eq!(
            run(coerce_float, "1e39", FieldMut::F32(&mut single)),
            Coercion::Failed(CoerceError::Overflow)
        );

        let mut double = 0f64;
        assert_eq!(
            run(coerce_float, "1e309", FieldMut::F64(&mut double)),
            Coercion::Failed(CoerceError::Overflow)
        );
        assert_eq!(run(coerce_float, "inf", FieldMut::F64(&mut double)), Coercion::Assigned);
        assert!(double.is_infinite());
    }

    #[test]
    fn test_empty_is_zero() {
        let mut i = 5i16;
        let mut u = 5u64;
        let mut f = 5f64;
        assert_eq!(run(coerce_int, "", FieldMut::I16(&mut i)), Coercion::Assigned);
        assert_eq!(run(coerce_uint, "", FieldMut::U64(&mut u)), Coercion::Assigned);
        assert_eq!(run(coerce_float, "", FieldMut::F64(&mut f)), Coercion::Assigned);
        assert_eq!((i, u, f), (0, 0, 0.0));
    }

    #[test]
    fn test_text_is_verbatim() {
        let mut s = "old".to_string();
        assert_eq!(run(coerce_text, " \"a, b\" ", FieldMut::Str(&mut s)), Coercion::Assigned);
        assert_eq!(s, " \"a, b\" ");
    }

    #[test]
    fn test_wrong_handle_is_unsupported() {
        let mut flag = false;
        assert_eq!(
            run(coerce_int, "1", FieldMut::Bool(&mut flag)),
            Coercion::Failed(CoerceError::Unsupported(Kind::Bool))
        );
    }

    #[test]
    fn test_override_does_not_touch_defaults() {
        let mut registry = Registry::defaults();
        registry.set(Kind::Str, |_: &str, _: FieldMut<'_>, _: &FieldTag<'_>| {
            Coercion::Failed(CoerceError::custom("err!"))
        });
        registry.remove(Kind::I64);

        let mut s = String::new();
        let custom = registry.get(Kind::Str).unwrap();
        assert_eq!(
            custom("x", FieldMut::Str(&mut s), &FieldTag::default()),
            Coercion::Failed(CoerceError::Custom("err!".to_string()))
        );

        let default = Registry::default_for(Kind::Str).unwrap();
        assert_eq!(default("x", FieldMut::Str(&mut s), &FieldTag::default()), Coercion::Assigned);
        assert_eq!(s, "x");
        assert!(Registry::defaults().contains(Kind::I64));
        assert!(!registry.contains(Kind::I64));
    }

    #[test]
    fn test_set_fn_from_defaults() {
        let mut registry = Registry::empty();
        registry.set_fn(Kind::I64, Registry::default_for(Kind::I64).unwrap().clone());

        let mut kinds: Vec<Kind> = registry.kinds().collect();
        kinds.sort_by_key(|k| k.name());
        assert_eq!(kinds, vec![Kind::I64]);
    }
}
