//! Binding of one row of text columns onto a [`Record`].

use crate::{
    coerce::{Coercion, Registry},
    errors::BindError,
    field::{FieldDescriptor, FieldMut, Record},
    resolve::{NameIndex, resolve},
};

/// Binds `row` onto `dst`, field by field in declaration order.
///
/// Without an `index` the binding is positional: field `i` reads column `i` and the row
/// must have exactly one column per field. With an `index` each field reads the column
/// of its resolved name, and fields missing from the index keep their current value.
///
/// Stops at the first failing field. Fields bound before it keep their new values.
pub fn bind<R, S>(
    row: &[S],
    index: Option<&NameIndex>,
    registry: &Registry,
    dst: &mut R,
) -> Result<(), BindError>
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    let shape = dst.shape();

    if index.is_none() && shape.len() != row.len() {
        return Err(BindError::FieldCountMismatch {
            fields: shape.len(),
            columns: row.len(),
        });
    }

    for (i, field) in shape.iter().enumerate() {
        let position = match index {
            Some(index) => match resolve(field, index) {
                Some(position) => position,
                None => continue,
            },
            None => i,
        };

        let text = row
            .get(position)
            .ok_or_else(|| BindError::MissingColumn {
                field: field.name.to_string(),
                position,
                columns: row.len(),
            })?
            .as_ref();

        let coerce = registry
            .get(field.kind)
            .ok_or_else(|| BindError::UnassignableKind {
                field: field.name.to_string(),
                kind: field.kind,
            })?;

        let tag = field.tag();

        match coerce(text, handle(dst, i, field)?, &tag) {
            Coercion::Assigned => {}
            Coercion::UseDefault => {
                // No default for the kind leaves the field as it was.
                if let Some(default) = Registry::default_for(field.kind) {
                    if let Coercion::Failed(source) = default(text, handle(dst, i, field)?, &tag) {
                        return Err(assign_error(field, source));
                    }
                }
            }
            Coercion::Failed(source) => return Err(assign_error(field, source)),
        }
    }

    Ok(())
}

fn handle<'a, R>(
    dst: &'a mut R,
    index: usize,
    field: &FieldDescriptor,
) -> Result<FieldMut<'a>, BindError>
where
    R: Record + ?Sized,
{
    dst.field_mut(index).ok_or_else(|| BindError::MissingAccessor {
        field: field.name.to_string(),
    })
}

fn assign_error(field: &FieldDescriptor, source: crate::errors::CoerceError) -> BindError {
    BindError::Assign {
        field: field.name.to_string(),
        source,
    }
}
