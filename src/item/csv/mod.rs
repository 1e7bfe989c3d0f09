/// CSV support for writing converted features.
///
/// This module provides the pieces that turn rows of strings into CSV text
/// and put that text on disk.
///
/// # Module Architecture
///
/// 1. **CsvRowWriter**: writes rows into any `Write` sink following a
///    [`CsvDialect`](crate::core::dialect::CsvDialect). In the default
///    [`QuoteMode::Never`](crate::core::dialect::QuoteMode::Never) fields are
///    joined verbatim with the dialect's delimiter and newline strings. In
///    [`QuoteMode::Necessary`](crate::core::dialect::QuoteMode::Necessary)
///    the `csv` crate quotes fields that need it.
///
/// 2. **destination**: derives `<stem>.csv` from a source file name, checks
///    the destination directory and writes or creates the output file.
///
/// # Known limitation
///
/// Verbatim output does not protect values holding the delimiter, the quote
/// or a line break. Such a document cannot be read back reliably; enable
/// quoting when the data may contain them.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::dialect::{CsvDialect, QuoteMode};
/// use geoshape_csv::item::csv::csv_writer::CsvRowWriterBuilder;
///
/// let verbatim = CsvDialect::new(",", "\"", "\n");
/// let mut writer = CsvRowWriterBuilder::new().dialect(&verbatim).from_writer(vec![]).unwrap();
/// writer.write_row(["name", "note"]).unwrap();
/// writer.write_row(["Lyon", "big, old"]).unwrap();
/// assert_eq!(
///     String::from_utf8(writer.into_inner().unwrap()).unwrap(),
///     "name,note\nLyon,big, old\n"
/// );
///
/// let quoting = CsvDialect::builder()
///     .newline("\n")
///     .quote_mode(QuoteMode::Necessary)
///     .build()
///     .unwrap();
/// let mut writer = CsvRowWriterBuilder::new().dialect(&quoting).from_writer(vec![]).unwrap();
/// writer.write_row(["Lyon", "big, old"]).unwrap();
/// assert_eq!(
///     String::from_utf8(writer.into_inner().unwrap()).unwrap(),
///     "Lyon,\"big, old\"\n"
/// );
/// ```
pub mod csv_writer;

/// A module deriving output paths and writing output files.
pub mod destination;
