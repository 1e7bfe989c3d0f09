use std::{
    cell::RefCell,
    ffi::OsStr,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::TempDir;
use zip::ZipArchive;

use crate::{
    core::source::{FeatureResult, FeatureSource},
    error::ConvertError,
};

use super::shapefile_reader::{ShapefileSource, ShapefileSourceBuilder};

const SHAPEFILE_PARTS: &[&str] = &["shp", "shx", "dbf", "prj", "cpg"];

/// A [`FeatureSource`] over a shapefile shipped inside a `.zip` archive.
///
/// The first `.shp` entry of the archive and the entries sharing its stem
/// (`.shx`, `.dbf`, ...) are extracted into a temporary directory, which is
/// removed when the source is closed.
///
/// # Examples
///
/// ```no_run
/// use geoshape_csv::core::dialect::CsvDialect;
/// use geoshape_csv::core::transformer::convert;
/// use geoshape_csv::item::shapefile::shapefile_reader::ShapefileSourceBuilder;
///
/// let source = ShapefileSourceBuilder::new()
///     .from_zip("data/regions.zip")
///     .unwrap();
///
/// let csv = convert(&source, &CsvDialect::default()).unwrap();
/// ```
pub struct ShapefileZipSource {
    archive: PathBuf,
    inner: ShapefileSource,
    workdir: RefCell<Option<TempDir>>,
}

impl ShapefileZipSource {
    pub(crate) fn open(builder: ShapefileSourceBuilder, path: &Path) -> Result<Self, ConvertError> {
        let workdir = TempDir::new()?;
        let shp = extract_shapefile(path, workdir.path())?;
        let inner = builder.from_path(&shp)?;

        info!(
            "Extracted {} from archive {}",
            shp.file_name().unwrap_or_default().to_string_lossy(),
            path.display()
        );

        Ok(ShapefileZipSource {
            archive: path.to_path_buf(),
            inner,
            workdir: RefCell::new(Some(workdir)),
        })
    }

    /// Path of the `.zip` archive.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn field_names(&self) -> &[String] {
        self.inner.field_names()
    }

    /// Temporary directory holding the extracted files, `None` once closed.
    pub fn extraction_dir(&self) -> Option<PathBuf> {
        self.workdir
            .borrow()
            .as_ref()
            .map(|workdir| workdir.path().to_path_buf())
    }
}

impl FeatureSource for ShapefileZipSource {
    fn read(&self) -> FeatureResult {
        self.inner.read()
    }

    fn close(&self) -> Result<(), ConvertError> {
        self.inner.close()?;
        if let Some(workdir) = self.workdir.borrow_mut().take() {
            workdir.close()?;
            debug!("Removed extraction directory of {}", self.archive.display());
        }
        Ok(())
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|candidate| candidate.eq_ignore_ascii_case(extension))
}

/// Extracts the first shapefile of the archive into `workdir` and returns the
/// path of its `.shp` file.
fn extract_shapefile(path: &Path, workdir: &Path) -> Result<PathBuf, ConvertError> {
    let file = File::open(path).map_err(|error| ConvertError::source_unavailable(path, error))?;
    let mut archive =
        ZipArchive::new(file).map_err(|error| ConvertError::source_unavailable(path, error))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|error| ConvertError::source_unavailable(path, error))?;
        if entry.is_dir() {
            continue;
        }
        if let Some(name) = entry.enclosed_name() {
            entries.push((index, name.to_path_buf()));
        }
    }

    let shp = entries
        .iter()
        .map(|(_, name)| name)
        .find(|name| has_extension(name, "shp"))
        .cloned()
        .ok_or_else(|| ConvertError::source_unavailable(path, "archive holds no .shp file"))?;

    let parts = entries.iter().filter(|(_, name)| {
        name.parent() == shp.parent()
            && name.file_stem() == shp.file_stem()
            && SHAPEFILE_PARTS.iter().any(|part| has_extension(name, part))
    });

    for (index, name) in parts {
        let Some(file_name) = name.file_name() else {
            continue;
        };
        let mut entry = archive
            .by_index(*index)
            .map_err(|error| ConvertError::source_unavailable(path, error))?;
        let mut target = File::create(workdir.join(file_name))?;
        io::copy(&mut entry, &mut target)?;
        debug!("Extracted {}", name.display());
    }

    let file_name = shp
        .file_name()
        .ok_or_else(|| ConvertError::source_unavailable(path, "invalid .shp entry name"))?;
    Ok(workdir.join(file_name))
}
