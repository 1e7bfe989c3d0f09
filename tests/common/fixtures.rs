//! Writers for small shapefile triplets and zip archives.
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use zip::{ZipWriter, write::SimpleFileOptions};

/// `(name, dBASE type, length, decimals)`
pub type Column<'a> = (&'a str, u8, u8, u8);

pub fn dbf_bytes(columns: &[Column], rows: &[&[&str]]) -> Vec<u8> {
    dbf_bytes_encoded(columns, rows, UTF_8)
}

/// Builds a dBASE table whose text is stored with `encoding`. Numeric
/// values are right-aligned, others left-aligned.
pub fn dbf_bytes_encoded(
    columns: &[Column],
    rows: &[&[&str]],
    encoding: &'static Encoding,
) -> Vec<u8> {
    let header_length = 32 + 32 * columns.len() + 1;
    let record_length = 1 + columns.iter().map(|c| c.2 as usize).sum::<usize>();

    let mut bytes = vec![0u8; 32];
    bytes[0] = 0x03;
    bytes[1..4].copy_from_slice(&[124, 1, 1]);
    bytes[4..8].copy_from_slice(&(rows.len() as u32).to_le_bytes());
    bytes[8..10].copy_from_slice(&(header_length as u16).to_le_bytes());
    bytes[10..12].copy_from_slice(&(record_length as u16).to_le_bytes());

    for (name, kind, length, decimals) in columns {
        let mut descriptor = [0u8; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *kind;
        descriptor[16] = *length;
        descriptor[17] = *decimals;
        bytes.extend_from_slice(&descriptor);
    }
    bytes.push(0x0D);

    for row in rows {
        bytes.push(b' ');
        for ((_, kind, length, _), value) in columns.iter().zip(row.iter()) {
            let width = *length as usize;
            let (encoded, _, _) = encoding.encode(value);
            let mut cell = encoded.into_owned();
            cell.truncate(width);
            let padding = vec![b' '; width - cell.len()];
            match *kind {
                b'N' | b'F' => {
                    bytes.extend_from_slice(&padding);
                    bytes.extend_from_slice(&cell);
                }
                _ => {
                    bytes.extend_from_slice(&cell);
                    bytes.extend_from_slice(&padding);
                }
            }
        }
    }
    bytes.push(0x1A);
    bytes
}

fn shape_header(file_length: usize) -> Vec<u8> {
    let mut header = vec![0u8; 100];
    header[0..4].copy_from_slice(&9994i32.to_be_bytes());
    header[24..28].copy_from_slice(&((file_length / 2) as i32).to_be_bytes());
    header[28..32].copy_from_slice(&1000i32.to_le_bytes());
    header
}

pub fn shp_bytes(count: usize) -> Vec<u8> {
    let mut bytes = shape_header(100 + 12 * count);
    for number in 0..count {
        bytes.extend_from_slice(&((number + 1) as i32).to_be_bytes());
        bytes.extend_from_slice(&2i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
    }
    bytes
}

pub fn shx_bytes(count: usize) -> Vec<u8> {
    let mut bytes = shape_header(100 + 8 * count);
    for number in 0..count {
        bytes.extend_from_slice(&((50 + 6 * number) as i32).to_be_bytes());
        bytes.extend_from_slice(&2i32.to_be_bytes());
    }
    bytes
}

/// Writes `<stem>.shp`, `<stem>.shx` and `<stem>.dbf` into `dir`.
pub fn write_shapefile(
    dir: &Path,
    stem: &str,
    columns: &[Column],
    rows: &[&[&str]],
) -> io::Result<PathBuf> {
    let shp = dir.join(format!("{}.shp", stem));
    fs::write(&shp, shp_bytes(rows.len()))?;
    fs::write(dir.join(format!("{}.shx", stem)), shx_bytes(rows.len()))?;
    fs::write(dir.join(format!("{}.dbf", stem)), dbf_bytes(columns, rows))?;
    Ok(shp)
}

/// Writes a zip archive holding `entries`, in order.
pub fn write_archive(archive: &Path, entries: &[(&str, Vec<u8>)]) -> io::Result<PathBuf> {
    let mut zip = ZipWriter::new(File::create(archive)?);
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .map_err(io::Error::other)?;
        zip.write_all(content)?;
    }
    zip.finish().map_err(io::Error::other)?;

    Ok(archive.to_path_buf())
}

/// Writes a zip archive holding `<stem>.shp`, `<stem>.shx` and `<stem>.dbf`.
pub fn write_zipped_shapefile(
    archive: &Path,
    stem: &str,
    columns: &[Column],
    rows: &[&[&str]],
) -> io::Result<PathBuf> {
    let shp = format!("{}.shp", stem);
    let shx = format!("{}.shx", stem);
    let dbf = format!("{}.dbf", stem);

    write_archive(
        archive,
        &[
            (shp.as_str(), shp_bytes(rows.len())),
            (shx.as_str(), shx_bytes(rows.len())),
            (dbf.as_str(), dbf_bytes(columns, rows)),
        ],
    )
}
