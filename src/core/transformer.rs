//! Streaming conversion of a feature sequence into CSV text.
//!
//! The transformer pulls features one at a time from a [`FeatureSource`],
//! captures the schema from the first one, writes the header and then one
//! row per feature. Rows go straight to the sink; nothing but the current
//! feature is held in memory.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> SchemaCaptured -> Emitting -> Completed
//!   |           |              |
//!   +-----------+--------------+------> Failed
//! ```
//!
//! `Completed` and `Failed` are terminal. In both, the source given to the
//! conversion has been closed exactly once.

use std::{
    cell::Cell,
    io::{self, Write},
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};

use crate::{
    error::ConvertError,
    item::csv::csv_writer::{CsvRowWriter, CsvRowWriterBuilder},
};

use super::{dialect::CsvDialect, feature::Schema, source::FeatureSource};

/// State of a [`CsvTransformer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformerStatus {
    /// Nothing has been read yet.
    Idle,
    /// The first feature was read and the header written.
    SchemaCaptured,
    /// At least one row was written.
    Emitting,
    Completed,
    Failed,
}

/// Outcome of a successful conversion.
///
/// Only returned once the stream completed and the source closed; the
/// terminal state is available from [`CsvTransformer::status`].
#[derive(Debug)]
pub struct ConversionSummary {
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    /// Number of body rows written, the header excluded.
    pub row_count: usize,
    /// `None` when the source was empty.
    pub schema: Option<Schema>,
}

/// Converts a feature sequence into CSV using one [`CsvDialect`].
///
/// An instance serves exactly one conversion. It borrows the source for the
/// duration of the call and closes it before returning, whatever the outcome.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::dialect::CsvDialect;
/// use geoshape_csv::core::feature::Feature;
/// use geoshape_csv::core::transformer::{CsvTransformer, TransformerStatus};
/// use geoshape_csv::item::memory::MemoryFeatureSource;
///
/// let source = MemoryFeatureSource::new(vec![
///     Feature::new().with_attribute("a", "1").with_attribute("b", "2"),
///     Feature::new().with_attribute("a", "3").with_attribute("b", "4"),
/// ]);
///
/// let transformer = CsvTransformer::new(CsvDialect::new(";", "\"", "\n"));
/// let text = transformer.convert(&source).unwrap();
///
/// assert_eq!(text, "a;b\n1;2\n3;4\n");
/// assert_eq!(transformer.status(), TransformerStatus::Completed);
/// assert!(source.is_closed());
/// ```
pub struct CsvTransformer {
    dialect: CsvDialect,
    status: Cell<TransformerStatus>,
}

impl Default for CsvTransformer {
    fn default() -> Self {
        CsvTransformer::new(CsvDialect::default())
    }
}

impl CsvTransformer {
    pub fn new(dialect: CsvDialect) -> Self {
        CsvTransformer {
            dialect,
            status: Cell::new(TransformerStatus::Idle),
        }
    }

    pub fn dialect(&self) -> &CsvDialect {
        &self.dialect
    }

    pub fn status(&self) -> TransformerStatus {
        self.status.get()
    }

    /// Converts the whole sequence into one string.
    ///
    /// Prefer [`CsvTransformer::convert_to`] for large datasets.
    pub fn convert(&self, source: &dyn FeatureSource) -> Result<String, ConvertError> {
        let mut buffer = Vec::new();
        self.convert_to(source, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|error| ConvertError::Io(io::Error::new(io::ErrorKind::InvalidData, error)))
    }

    /// Streams the sequence into `sink`, one row at a time.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::SchemaMismatch`] when a feature's attribute names
    ///   differ from the first feature's. Rows already written stay in the
    ///   sink and must be discarded by the caller.
    /// - [`ConvertError::Io`] when reading the source or writing the sink
    ///   fails.
    /// - [`ConvertError::Configuration`] when the dialect cannot be written
    ///   or this transformer has already run.
    ///
    /// The source is closed before this method returns in every case.
    pub fn convert_to<W: Write>(
        &self,
        source: &dyn FeatureSource,
        sink: W,
    ) -> Result<ConversionSummary, ConvertError> {
        let start = Instant::now();

        if self.status.get() != TransformerStatus::Idle {
            Self::close_after_failure(source);
            return Err(ConvertError::Configuration(format!(
                "transformer already ran, status is {:?}",
                self.status.get()
            )));
        }

        debug!("Start of conversion");

        let streamed = self.stream(source, sink);
        let closed = source.close();

        match (streamed, closed) {
            (Ok((row_count, schema)), Ok(())) => {
                self.status.set(TransformerStatus::Completed);
                info!("Conversion completed: {} rows", row_count);
                Ok(ConversionSummary {
                    start,
                    end: Instant::now(),
                    duration: start.elapsed(),
                    row_count,
                    schema,
                })
            }
            (Ok(_), Err(err)) => {
                self.status.set(TransformerStatus::Failed);
                error!("Unable to close source: {}", err);
                Err(err)
            }
            (Err(err), closed) => {
                self.status.set(TransformerStatus::Failed);
                if let Err(close_error) = closed {
                    warn!("Unable to close source after failure: {}", close_error);
                }
                error!("Conversion failed: {}", err);
                Err(err)
            }
        }
    }

    fn stream<W: Write>(
        &self,
        source: &dyn FeatureSource,
        sink: W,
    ) -> Result<(usize, Option<Schema>), ConvertError> {
        let mut writer: CsvRowWriter<W> = CsvRowWriterBuilder::new()
            .dialect(&self.dialect)
            .from_writer(sink)?;

        let mut schema: Option<Schema> = None;
        let mut row_count = 0;

        while let Some(feature) = source.read()? {
            match &schema {
                None => {
                    let captured = Schema::of(&feature);
                    debug!("Schema captured: {:?}", captured.names());
                    writer.write_row(captured.names())?;
                    self.status.set(TransformerStatus::SchemaCaptured);
                    schema = Some(captured);
                }
                Some(expected) if !expected.matches(&feature) => {
                    return Err(ConvertError::SchemaMismatch {
                        index: row_count + 1,
                        expected: expected.names().to_vec(),
                        found: feature.names().map(str::to_string).collect(),
                    });
                }
                Some(_) => {}
            }

            writer.write_row(feature.values().map(ToString::to_string))?;
            row_count += 1;
            self.status.set(TransformerStatus::Emitting);
        }

        writer.flush()?;
        debug!("End of conversion: {} rows written", row_count);

        Ok((row_count, schema))
    }

    fn close_after_failure(source: &dyn FeatureSource) {
        if let Err(error) = source.close() {
            warn!("Unable to close source after failure: {}", error);
        }
    }
}

/// Converts `source` into one CSV string with `dialect`.
///
/// See [`CsvTransformer::convert`].
pub fn convert(source: &dyn FeatureSource, dialect: &CsvDialect) -> Result<String, ConvertError> {
    CsvTransformer::new(dialect.clone()).convert(source)
}

/// Streams `source` into `sink` as CSV with `dialect`.
///
/// See [`CsvTransformer::convert_to`].
pub fn convert_to<W: Write>(
    source: &dyn FeatureSource,
    dialect: &CsvDialect,
    sink: W,
) -> Result<ConversionSummary, ConvertError> {
    CsvTransformer::new(dialect.clone()).convert_to(source, sink)
}
