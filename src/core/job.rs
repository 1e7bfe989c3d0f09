use std::{
    ffi::OsStr,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use log::{error, info, warn};

#[cfg(feature = "geojson")]
use crate::item::geojson::geojson_reader::GeoJsonSourceBuilder;
#[cfg(feature = "shapefile")]
use crate::item::shapefile::shapefile_reader::ShapefileSourceBuilder;
use crate::{error::ConvertError, item::csv::destination::create_output};

use super::{dialect::CsvDialect, source::FeatureSource, transformer::CsvTransformer};

/// Represents the execution of a conversion job.
#[derive(Debug)]
pub struct ConversionExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// Absolute path of the written CSV file
    pub output_path: PathBuf,
    /// Number of body rows written
    pub row_count: usize,
}

/// Opens a [`FeatureSource`] for `path`, choosing the decoder from the file
/// extension.
///
/// | Extension           | Source                 | Cargo feature |
/// |---------------------|------------------------|---------------|
/// | `shp`               | `ShapefileSource`      | `shapefile`   |
/// | `zip`               | `ShapefileZipSource`   | `zip`         |
/// | `geojson`, `json`   | `GeoJsonSource`        | `geojson`     |
///
/// # Errors
///
/// [`ConvertError::SourceUnavailable`] when no enabled decoder recognizes the
/// extension or when the decoder fails to open the dataset.
pub fn open_source(path: &Path) -> Result<Box<dyn FeatureSource>, ConvertError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        #[cfg(feature = "shapefile")]
        "shp" => Ok(Box::new(ShapefileSourceBuilder::new().from_path(path)?)),
        #[cfg(feature = "zip")]
        "zip" => Ok(Box::new(ShapefileSourceBuilder::new().from_zip(path)?)),
        #[cfg(feature = "geojson")]
        "geojson" | "json" => Ok(Box::new(GeoJsonSourceBuilder::new().from_path(path)?)),
        _ => Err(ConvertError::source_unavailable(
            path,
            format!("no decoder recognizes {:?} files", extension),
        )),
    }
}

/// Converts one dataset file into `<destination>/<stem>.csv`.
///
/// The conversion streams straight into the output file. When it fails, the
/// partially written file is deleted before the error is returned, and the
/// source is always closed.
///
/// # Examples
///
/// ```no_run
/// use geoshape_csv::core::dialect::CsvDialect;
/// use geoshape_csv::core::job::ConversionJobBuilder;
///
/// let job = ConversionJobBuilder::new()
///     .source("data/regions.shp")
///     .destination("/tmp")
///     .dialect(CsvDialect::new(";", "\"", "\n"))
///     .build()
///     .unwrap();
///
/// let execution = job.run().unwrap();
/// println!("{} rows written to {}", execution.row_count, execution.output_path.display());
/// ```
pub struct ConversionJob {
    source_path: PathBuf,
    destination_dir: PathBuf,
    dialect: CsvDialect,
}

impl ConversionJob {
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    pub fn run(&self) -> Result<ConversionExecution, ConvertError> {
        let start = Instant::now();

        info!(
            "Start of conversion job: {} -> {}",
            self.source_path.display(),
            self.destination_dir.display()
        );

        let source = open_source(&self.source_path)?;

        let (output_path, file) = match create_output(&self.source_path, &self.destination_dir) {
            Ok(output) => output,
            Err(err) => {
                if let Err(close_error) = source.close() {
                    warn!("Unable to close source: {}", close_error);
                }
                error!("Conversion job failed: {}", err);
                return Err(err);
            }
        };

        let mut writer = BufWriter::new(file);
        let result = CsvTransformer::new(self.dialect.clone())
            .convert_to(source.as_ref(), &mut writer)
            .and_then(|summary| {
                writer.flush()?;
                Ok(summary)
            });
        drop(writer);

        match result {
            Ok(summary) => {
                info!(
                    "End of conversion job: {} rows written to {}",
                    summary.row_count,
                    output_path.display()
                );
                Ok(ConversionExecution {
                    start,
                    end: Instant::now(),
                    duration: start.elapsed(),
                    output_path,
                    row_count: summary.row_count,
                })
            }
            Err(err) => {
                error!("Conversion job failed: {}", err);
                if let Err(remove_error) = fs::remove_file(&output_path) {
                    warn!(
                        "Unable to remove partial output {}: {}",
                        output_path.display(),
                        remove_error
                    );
                }
                Err(err)
            }
        }
    }
}

/// Builder for creating [`ConversionJob`] instances.
#[derive(Default)]
pub struct ConversionJobBuilder {
    source_path: Option<PathBuf>,
    destination_dir: Option<PathBuf>,
    dialect: CsvDialect,
}

impl ConversionJobBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dataset to convert.
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory receiving the CSV file.
    pub fn destination<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.destination_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the dialect (default: [`CsvDialect::default`]).
    pub fn dialect(mut self, dialect: CsvDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn build(self) -> Result<ConversionJob, ConvertError> {
        let source_path = self
            .source_path
            .ok_or_else(|| ConvertError::Configuration("Source path is required".to_string()))?;
        let destination_dir = self
            .destination_dir
            .ok_or_else(|| {
                ConvertError::Configuration("Destination directory is required".to_string())
            })?;
        self.dialect.validate()?;

        Ok(ConversionJob {
            source_path,
            destination_dir,
            dialect: self.dialect,
        })
    }
}
