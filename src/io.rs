//! Stream adapters for record files.
//!
//! [`RecordWriter`] appends one line per record to any [`Write`] implementor and
//! [`RecordReader`] reads them back from any [`BufRead`] implementor. Both are typed
//! by the record so every line of a file shares one schema. Opening, locking and
//! closing the underlying file stays with the caller.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_delimited::{RecordReader, RecordWriter};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Entry { id: u32, name: String }
//!
//! let mut writer = RecordWriter::new(Vec::new());
//! writer.write(&Entry { id: 1, name: "uno".into() }).unwrap();
//! writer.write(&Entry { id: 2, name: "dos".into() }).unwrap();
//! let bytes = writer.into_inner();
//!
//! let entries: Vec<Entry> = RecordReader::new(&bytes[..])
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[1].name, "dos");
//! ```

use crate::de::{from_line_bytes, read_line};
use crate::{to_string_with_options, Error, RecordOptions, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::marker::PhantomData;

/// Writes records of type `T`, one line each.
pub struct RecordWriter<W, T> {
    writer: W,
    options: RecordOptions,
    written: u64,
    _record: PhantomData<fn(&T)>,
}

impl<W, T> RecordWriter<W, T>
where
    W: Write,
    T: Serialize,
{
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, RecordOptions::default())
    }

    pub fn with_options(writer: W, options: RecordOptions) -> Self {
        RecordWriter {
            writer,
            options,
            written: 0,
            _record: PhantomData,
        }
    }

    /// Encodes `record` and writes its line.
    ///
    /// The line is assembled before anything is written, so a record that cannot be
    /// encoded leaves the stream untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for records outside the flat scalar model and
    /// [`Error::Io`] if the stream rejects the write.
    pub fn write(&mut self, record: &T) -> Result<()> {
        let line = to_string_with_options(record, self.options.clone())?;
        self.writer.write_all(line.as_bytes())?;
        self.written += 1;
        tracing::trace!(record = self.written, bytes = line.len(), "record written");
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying stream fails to flush.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns the underlying stream without flushing it.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads records of type `T`, one line each.
///
/// Iterating yields every record until the stream is exhausted; any other error is
/// yielded as an item, and iteration can continue past a malformed line.
pub struct RecordReader<R, T> {
    reader: R,
    options: RecordOptions,
    buf: Vec<u8>,
    line: u64,
    _record: PhantomData<fn() -> T>,
}

impl<R, T> RecordReader<R, T>
where
    R: BufRead,
    T: DeserializeOwned,
{
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, RecordOptions::default())
    }

    pub fn with_options(reader: R, options: RecordOptions) -> Self {
        RecordReader {
            reader,
            options,
            buf: Vec::new(),
            line: 0,
            _record: PhantomData,
        }
    }

    /// Reads the next record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndOfInput`] once the stream is exhausted, and the decode error
    /// of the line otherwise.
    pub fn read(&mut self) -> Result<T> {
        if !read_line(&mut self.reader, &mut self.buf)? {
            return Err(Error::EndOfInput);
        }
        self.line += 1;

        match from_line_bytes(&self.buf, &self.options) {
            Ok(record) => {
                tracing::trace!(line = self.line, "record read");
                Ok(record)
            }
            Err(err) => {
                tracing::debug!(line = self.line, error = %err, "failed to decode record");
                Err(err)
            }
        }
    }

    /// 1-based number of the last line read, 0 before the first read.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R, T> Iterator for RecordReader<R, T>
where
    R: BufRead,
    T: DeserializeOwned,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read() {
            Err(Error::EndOfInput) => None,
            other => Some(other),
        }
    }
}
