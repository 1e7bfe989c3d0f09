use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::{
    core::dialect::{CsvDialect, QuoteMode, single_byte},
    error::ConvertError,
};

enum RowSink<W: Write> {
    /// Fields joined as is. The line buffer is reused between rows.
    Verbatim {
        sink: W,
        delimiter: String,
        newline: String,
        line: String,
    },
    /// Fields quoted when needed by the `csv` crate.
    Quoted(Writer<W>),
}

/// Writes rows of string fields to a sink according to a [`CsvDialect`].
///
/// A row is assembled completely before it reaches the sink, so a failing
/// caller never leaves half a row behind.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::dialect::CsvDialect;
/// use geoshape_csv::item::csv::csv_writer::CsvRowWriterBuilder;
///
/// let dialect = CsvDialect::new(";", "\"", "\n");
/// let mut writer = CsvRowWriterBuilder::new()
///     .dialect(&dialect)
///     .from_writer(vec![])
///     .unwrap();
///
/// writer.write_row(["a", "b"]).unwrap();
/// writer.write_row(["1", "2"]).unwrap();
///
/// let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "a;b\n1;2\n");
/// ```
pub struct CsvRowWriter<W: Write> {
    inner: RowSink<W>,
}

impl<W: Write> CsvRowWriter<W> {
    pub fn write_row<I, S>(&mut self, fields: I) -> Result<(), ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &mut self.inner {
            RowSink::Verbatim {
                sink,
                delimiter,
                newline,
                line,
            } => {
                line.clear();
                for (index, field) in fields.into_iter().enumerate() {
                    if index > 0 {
                        line.push_str(delimiter);
                    }
                    line.push_str(field.as_ref());
                }
                line.push_str(newline);
                sink.write_all(line.as_bytes())?;
                Ok(())
            }
            RowSink::Quoted(writer) => {
                let fields: Vec<S> = fields.into_iter().collect();
                writer.write_record(fields.iter().map(|field| field.as_ref().as_bytes()))?;
                Ok(())
            }
        }
    }

    /// Flush buffered rows and the underlying writer.
    pub fn flush(&mut self) -> Result<(), ConvertError> {
        match &mut self.inner {
            RowSink::Verbatim { sink, .. } => sink.flush()?,
            RowSink::Quoted(writer) => writer.flush()?,
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ConvertError> {
        match self.inner {
            RowSink::Verbatim { mut sink, .. } => {
                sink.flush()?;
                Ok(sink)
            }
            RowSink::Quoted(writer) => writer
                .into_inner()
                .map_err(|error| ConvertError::Io(error.into_error())),
        }
    }
}

#[derive(Default)]
pub struct CsvRowWriterBuilder {
    dialect: CsvDialect,
}

impl CsvRowWriterBuilder {
    pub fn new() -> CsvRowWriterBuilder {
        CsvRowWriterBuilder {
            dialect: CsvDialect::default(),
        }
    }

    pub fn dialect(mut self, dialect: &CsvDialect) -> CsvRowWriterBuilder {
        self.dialect = dialect.clone();
        self
    }

    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<CsvRowWriter<BufWriter<File>>, ConvertError> {
        let file = File::create(path)?;
        self.from_writer(BufWriter::new(file))
    }

    /// Fails with [`ConvertError::Configuration`] when the dialect cannot be
    /// written in its quote mode.
    pub fn from_writer<W: Write>(self, wtr: W) -> Result<CsvRowWriter<W>, ConvertError> {
        self.dialect.validate()?;

        let inner = match self.dialect.quote_mode() {
            QuoteMode::Never => RowSink::Verbatim {
                sink: wtr,
                delimiter: self.dialect.delimiter().to_string(),
                newline: self.dialect.newline().to_string(),
                line: String::new(),
            },
            QuoteMode::Necessary => {
                let terminator = match self.dialect.newline() {
                    "\r\n" => Terminator::CRLF,
                    newline => Terminator::Any(single_byte("newline", newline)?),
                };
                let writer = WriterBuilder::new()
                    .delimiter(single_byte("delimiter", self.dialect.delimiter())?)
                    .quote(single_byte("quote", self.dialect.quote())?)
                    .quote_style(QuoteStyle::Necessary)
                    .terminator(terminator)
                    .has_headers(false)
                    .flexible(false)
                    .from_writer(wtr);
                RowSink::Quoted(writer)
            }
        };

        Ok(CsvRowWriter { inner })
    }
}
