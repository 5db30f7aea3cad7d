//! Sources of already split rows.

use std::{collections::VecDeque, convert::Infallible};

/// A source of rows, one call per line.
///
/// Splitting raw text into columns (delimiters, quoting) is the reader's job.
pub trait RowReader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The next row, or `Ok(None)` at end of input.
    fn read_row(&mut self) -> Result<Option<Vec<String>>, Self::Error>;
}

impl<T: RowReader + ?Sized> RowReader for &mut T {
    type Error = T::Error;

    fn read_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        (**self).read_row()
    }
}

/// In-memory rows.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    rows: VecDeque<Vec<String>>,
}

impl Rows {
    pub fn new<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rows {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowReader for Rows {
    type Error = Infallible;

    fn read_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        Ok(self.rows.pop_front())
    }
}

/// Reads records from a [`csv::Reader`].
///
/// A reader built with `has_headers(true)` (the `csv` default) consumes the first line
/// itself; build it with `has_headers(false)` to hand the header to
/// [`crate::decoder::Decoder::read_header`].
#[cfg(feature = "csv")]
impl<R: std::io::Read> RowReader for csv::Reader<R> {
    type Error = csv::Error;

    fn read_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        let mut record = csv::StringRecord::new();
        if !self.read_record(&mut record)? {
            return Ok(None);
        }

        Ok(Some(record.iter().map(str::to_string).collect()))
    }
}
