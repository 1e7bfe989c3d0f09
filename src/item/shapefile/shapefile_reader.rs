use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufReader, Read, Seek},
    path::{Path, PathBuf},
};

use dbase::{FieldIOError, FieldIterator, FieldValue, ReadableRecord, encoding::EncodingRs};
use log::{debug, info};
use shapefile::ShapeReader;

use crate::{
    core::{
        feature::{AttributeValue, Feature},
        source::{FeatureResult, FeatureSource},
    },
    error::ConvertError,
};

use super::code_page::read_code_page;

/// Largest magnitude below which every integer is exactly representable as
/// an `f64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Maps a decoded dBASE value to its attribute value.
///
/// `N` columns come out of the decoder as `f64`: integral values are kept as
/// integers, which renders `27208.00` as `27208`. Beyond 2^53 the decoder has
/// already rounded the value.
fn attribute_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(text) => text.map_or(AttributeValue::Null, |text| {
            AttributeValue::Text(text.trim_end().to_string())
        }),
        FieldValue::Numeric(number) => number.map_or(AttributeValue::Null, numeric),
        FieldValue::Float(number) => number.map_or(AttributeValue::Null, |number| {
            AttributeValue::Text(number.to_string())
        }),
        FieldValue::Integer(number) => AttributeValue::Integer(number.into()),
        FieldValue::Double(number) | FieldValue::Currency(number) => {
            AttributeValue::Float(number)
        }
        FieldValue::Logical(flag) => flag.map_or(AttributeValue::Null, AttributeValue::Boolean),
        FieldValue::Date(date) => date.map_or(AttributeValue::Null, |date| AttributeValue::Date {
            year: date.year() as i32,
            month: u32::from(date.month()),
            day: u32::from(date.day()),
        }),
        FieldValue::Memo(text) => AttributeValue::Text(text),
        other => AttributeValue::Text(format!("{:?}", other)),
    }
}

fn numeric(number: f64) -> AttributeValue {
    if number.fract() == 0.0 && number.abs() < EXACT_INTEGER_LIMIT {
        AttributeValue::Integer(number as i64)
    } else {
        AttributeValue::Float(number)
    }
}

/// One `.dbf` record, fields in declaration order.
struct DbfRecord(Feature);

impl ReadableRecord for DbfRecord {
    fn read_using<Source, MemoSource>(
        field_iterator: &mut FieldIterator<Source, MemoSource>,
    ) -> Result<Self, FieldIOError>
    where
        Source: Read + Seek,
        MemoSource: Read + Seek,
    {
        let mut feature = Feature::new();
        for field in field_iterator {
            let field = field?;
            feature.push(field.name, attribute_value(field.value));
        }
        Ok(DbfRecord(feature))
    }
}

struct AttributeTable {
    reader: dbase::Reader<BufReader<File>>,
    records_read: usize,
}

impl AttributeTable {
    fn read_feature(&mut self, record_count: usize) -> io::Result<Option<Feature>> {
        if self.records_read >= record_count {
            return Ok(None);
        }

        match self.reader.iter_records_as::<DbfRecord>().next() {
            Some(Ok(DbfRecord(feature))) => {
                self.records_read += 1;
                Ok(Some(feature))
            }
            Some(Err(error)) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                error.to_string(),
            )),
            None => Ok(None),
        }
    }
}

/// A [`FeatureSource`] over the attribute table of a shapefile.
///
/// Opening checks the `.shp` header, requires a valid `.shx` index and a
/// `.dbf` table next to it, and (unless disabled) that the index and the
/// table describe the same number of records. Text is decoded with the
/// encoding named by the `.cpg` file when there is one, UTF-8 otherwise.
///
/// Only the `.dbf` file stays open afterwards; [`FeatureSource::close`]
/// releases it.
///
/// # Examples
///
/// ```no_run
/// use geoshape_csv::core::source::FeatureSource;
/// use geoshape_csv::item::shapefile::shapefile_reader::ShapefileSourceBuilder;
///
/// let source = ShapefileSourceBuilder::new()
///     .from_path("data/regions.shp")
///     .unwrap();
///
/// println!("{:?}", source.field_names());
/// while let Some(feature) = source.read().unwrap() {
///     println!("{:?}", feature);
/// }
/// source.close().unwrap();
/// ```
pub struct ShapefileSource {
    path: PathBuf,
    field_names: Vec<String>,
    record_count: usize,
    table: RefCell<Option<AttributeTable>>,
}

impl ShapefileSource {
    /// Path of the `.shp` file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attribute names declared by the `.dbf` table.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of records declared by the `.dbf` table.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_closed(&self) -> bool {
        self.table.borrow().is_none()
    }
}

impl FeatureSource for ShapefileSource {
    fn read(&self) -> FeatureResult {
        match self.table.borrow_mut().as_mut() {
            Some(table) => Ok(table.read_feature(self.record_count)?),
            None => Ok(None),
        }
    }

    fn close(&self) -> Result<(), ConvertError> {
        if self.table.borrow_mut().take().is_some() {
            debug!("Closed shapefile: {}", self.path.display());
        }
        Ok(())
    }
}

/// A builder for [`ShapefileSource`].
///
/// # Default Configuration
///
/// - Index validation: enabled
pub struct ShapefileSourceBuilder {
    validate_index: bool,
}

impl Default for ShapefileSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapefileSourceBuilder {
    pub fn new() -> Self {
        Self {
            validate_index: true,
        }
    }

    /// Whether the `.shx` record count must equal the `.dbf` record count.
    ///
    /// The `.shx` file must exist and be readable either way.
    pub fn validate_index(mut self, yes: bool) -> Self {
        self.validate_index = yes;
        self
    }

    /// Opens the shapefile whose main file is `path`.
    ///
    /// # Errors
    ///
    /// [`ConvertError::SourceUnavailable`] when `path` is not a readable
    /// `.shp` file, or when the `.shx` index or `.dbf` table is missing or
    /// corrupt.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<ShapefileSource, ConvertError> {
        let path = path.as_ref();

        let is_shp = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("shp"));
        if !is_shp {
            return Err(ConvertError::source_unavailable(path, "not a .shp file"));
        }

        let index_path = companion(path, "shx").ok_or_else(|| {
            ConvertError::source_unavailable(path, "missing companion index file (.shx)")
        })?;
        let index_count = shape_count(path, &index_path)?;

        let table_path = companion(path, "dbf").ok_or_else(|| {
            ConvertError::source_unavailable(path, "missing attribute table (.dbf)")
        })?;
        let reader = match companion(path, "cpg").and_then(|cpg| read_code_page(&cpg)) {
            Some(encoding) => {
                dbase::Reader::from_path_with_encoding(&table_path, EncodingRs::from(encoding))
            }
            None => dbase::Reader::from_path(&table_path),
        }
        .map_err(|error| ConvertError::source_unavailable(&table_path, error))?;

        let record_count = reader.header().num_records as usize;
        if self.validate_index && record_count != index_count {
            return Err(ConvertError::source_unavailable(
                &index_path,
                format!(
                    "index lists {} records but the attribute table holds {}",
                    index_count, record_count
                ),
            ));
        }

        let field_names = reader
            .fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect();
        info!("Opened shapefile {} ({} records)", path.display(), record_count);

        Ok(ShapefileSource {
            path: path.to_path_buf(),
            field_names,
            record_count,
            table: RefCell::new(Some(AttributeTable {
                reader,
                records_read: 0,
            })),
        })
    }

    #[cfg(feature = "zip")]
    /// Opens the first shapefile found in the `.zip` archive at `path`.
    ///
    /// See [`super::zip_reader::ShapefileZipSource`].
    pub fn from_zip<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<super::zip_reader::ShapefileZipSource, ConvertError> {
        super::zip_reader::ShapefileZipSource::open(self, path.as_ref())
    }
}

/// Finds `<stem>.<extension>` next to `path`, lower case first.
fn companion(path: &Path, extension: &str) -> Option<PathBuf> {
    [extension.to_ascii_lowercase(), extension.to_ascii_uppercase()]
        .into_iter()
        .map(|extension| path.with_extension(extension))
        .find(|candidate| candidate.is_file())
}

/// Reads the `.shp` header and the `.shx` index and returns the number of
/// shapes the index lists.
fn shape_count(path: &Path, index_path: &Path) -> Result<usize, ConvertError> {
    let open = |path: &Path| {
        File::open(path)
            .map(BufReader::new)
            .map_err(|error| ConvertError::source_unavailable(path, error))
    };

    let shapes = ShapeReader::with_shx(open(path)?, open(index_path)?)
        .map_err(|error| ConvertError::source_unavailable(path, error))?;
    shapes
        .shape_count()
        .map_err(|error| ConvertError::source_unavailable(index_path, error))
}
