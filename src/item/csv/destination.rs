//! Output file naming and creation.
//!
//! The output of a conversion is named after its source: `regions.shp`
//! converted into `/out` becomes `/out/regions.csv`.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::info;

use crate::error::ConvertError;

/// Derives `<destination_dir>/<source stem>.csv`.
///
/// Only the last extension of the source file name is replaced
/// (`roads.2020.shp` gives `roads.2020.csv`). No filesystem access happens
/// here.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use geoshape_csv::item::csv::destination::output_path;
///
/// let path = output_path(Path::new("data/regions.shp"), Path::new("/out")).unwrap();
/// assert_eq!(path, PathBuf::from("/out/regions.csv"));
/// ```
pub fn output_path(source: &Path, destination_dir: &Path) -> Result<PathBuf, ConvertError> {
    let stem = source.file_stem().ok_or_else(|| {
        ConvertError::source_unavailable(source, "cannot derive an output name from this path")
    })?;

    let mut file_name = OsString::from(stem);
    file_name.push(".csv");

    Ok(destination_dir.join(file_name))
}

/// Checks that `destination_dir` exists, is a directory and is not read-only,
/// and returns its absolute form.
fn writable_directory(destination_dir: &Path) -> Result<PathBuf, ConvertError> {
    let metadata = fs::metadata(destination_dir)
        .map_err(|error| ConvertError::destination_unwritable(destination_dir, error))?;

    if !metadata.is_dir() {
        return Err(ConvertError::destination_unwritable(
            destination_dir,
            "not a directory",
        ));
    }
    if metadata.permissions().readonly() {
        return Err(ConvertError::destination_unwritable(
            destination_dir,
            "directory is read-only",
        ));
    }

    std::path::absolute(destination_dir)
        .map_err(|error| ConvertError::destination_unwritable(destination_dir, error))
}

/// Creates (or truncates) the output file for `source` in `destination_dir`.
///
/// Returns the absolute output path together with the open file.
pub fn create_output(
    source: &Path,
    destination_dir: &Path,
) -> Result<(PathBuf, File), ConvertError> {
    let directory = writable_directory(destination_dir)?;
    let path = output_path(source, &directory)?;

    let file =
        File::create(&path).map_err(|error| ConvertError::destination_unwritable(&path, error))?;

    info!("Created output file: {}", path.display());
    Ok((path, file))
}

/// Writes an already converted document to `<destination_dir>/<source stem>.csv`.
///
/// Returns the absolute path of the written file.
///
/// # Errors
///
/// - [`ConvertError::DestinationUnwritable`] when the directory is missing,
///   is not a directory, is read-only, or the file cannot be created
/// - [`ConvertError::Io`] when writing the content fails
pub fn write_to_file(
    text: &str,
    source: &Path,
    destination_dir: &Path,
) -> Result<PathBuf, ConvertError> {
    let (path, mut file) = create_output(source, destination_dir)?;

    file.write_all(text.as_bytes())?;
    file.flush()?;

    Ok(path)
}
