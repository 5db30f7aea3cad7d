//! Decode sessions: a [`RowReader`] plus the registry, name index and line counter used
//! to bind each row it yields.

use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::{
    binder::bind,
    coerce::{CoerceFn, Coercion, Registry},
    errors::DecodeError,
    field::{FieldMut, FieldTag, Kind, Record},
    reader::RowReader,
    resolve::NameIndex,
};

/// Reads rows from `R` and binds them onto records.
///
/// Without a header or explicit indexes, fields are bound by position. Call
/// [`Decoder::read_header`] (or [`Decoder::set_indexes`]) once, before the first
/// [`Decoder::decode`], to bind by name instead.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    registry: Registry,
    indexes: Option<NameIndex>,
    line: usize,
}

impl<R: RowReader> Decoder<R> {
    /// Creates a decoder with the default coercions.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            registry: Registry::defaults(),
            indexes: None,
            line: 0,
        }
    }

    /// Sets the coercion for fields of `kind`, replacing the previous one.
    pub fn set_coercion<F>(&mut self, kind: Kind, coerce: F) -> &mut Self
    where
        F: Fn(&str, FieldMut<'_>, &FieldTag<'_>) -> Coercion + Send + Sync + 'static,
    {
        self.registry.set(kind, coerce);
        self
    }

    pub fn set_coercion_fn(&mut self, kind: Kind, coerce: CoerceFn) -> &mut Self {
        self.registry.set_fn(kind, coerce);
        self
    }

    /// Replaces the whole registry.
    pub fn set_registry(&mut self, registry: Registry) -> &mut Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sets the name index directly instead of reading it from a header.
    pub fn set_indexes(&mut self, indexes: NameIndex) -> Result<&mut Self, DecodeError> {
        if self.line > 0 {
            return Err(DecodeError::HeaderAfterDecode);
        }

        self.indexes = Some(indexes);
        Ok(self)
    }

    pub fn indexes(&self) -> Option<&NameIndex> {
        self.indexes.as_ref()
    }

    /// Number of lines read so far, header included.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Reads one row and uses it as the header that names the columns.
    ///
    /// Must be called at most once, before any call to [`Decoder::decode`]. Returns
    /// `Ok(false)` if the input is empty, in which case no index is set.
    pub fn read_header(&mut self) -> Result<bool, DecodeError> {
        if self.line > 0 {
            return Err(DecodeError::HeaderAfterDecode);
        }
        self.line += 1;

        let Some(header) = self.reader.read_row().map_err(read_error)? else {
            debug!("no header, input is empty");
            return Ok(false);
        };

        let indexes = NameIndex::from_header(&header);
        if indexes.len() < header.len() {
            warn!(
                columns = header.len(),
                names = indexes.len(),
                "header has duplicate column names, first occurrence wins"
            );
        }
        debug!(columns = header.len(), "read header");

        self.indexes = Some(indexes);
        Ok(true)
    }

    /// Reads the next row and binds it onto `dst`.
    ///
    /// Returns `Ok(true)` when a row was bound and `Ok(false)` at end of input. Bind errors
    /// carry the line they occurred on.
    pub fn decode<T: Record + ?Sized>(&mut self, dst: &mut T) -> Result<bool, DecodeError> {
        self.line += 1;

        let Some(row) = self.reader.read_row().map_err(read_error)? else {
            debug!(line = self.line, "end of input");
            return Ok(false);
        };

        bind(&row, self.indexes.as_ref(), &self.registry, dst).map_err(|source| {
            DecodeError::Line {
                line: self.line,
                source,
            }
        })?;
        trace!(line = self.line, columns = row.len(), "decoded row");

        Ok(true)
    }

    /// Iterates over the remaining rows, decoding each into a fresh `T::default()`.
    ///
    /// Bind errors are yielded and iteration continues with the next line. A reader error
    /// ends the iteration after it is yielded.
    pub fn records<T: Record + Default>(&mut self) -> Records<'_, R, T> {
        Records {
            decoder: self,
            done: false,
            _record: PhantomData,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn read_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> DecodeError {
    DecodeError::Read(Box::new(e))
}

/// Iterator returned by [`Decoder::records`].
pub struct Records<'d, R, T> {
    decoder: &'d mut Decoder<R>,
    done: bool,
    _record: PhantomData<fn() -> T>,
}

impl<R: RowReader, T: Record + Default> Iterator for Records<'_, R, T> {
    type Item = Result<T, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = T::default();
        match self.decoder.decode(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                if matches!(e, DecodeError::Read(_)) {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}
