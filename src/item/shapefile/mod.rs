//! Shapefile support for reading feature attribute tables.
//!
//! A shapefile is a set of files sharing one stem: `.shp` (geometries),
//! `.shx` (index of the geometries) and `.dbf` (attribute table). The
//! [`shapefile_reader::ShapefileSource`] checks that the three files are
//! present and consistent with the `shapefile` crate, then streams the
//! attribute table one record at a time with the `dbase` crate. An optional
//! `.cpg` file names the text encoding of the table. Geometries are never
//! decoded.
//!
//! With the `zip` feature, [`zip_reader::ShapefileZipSource`] reads the same
//! triplet out of a `.zip` archive.
//!
//! # Examples
//!
//! ```no_run
//! use geoshape_csv::core::dialect::CsvDialect;
//! use geoshape_csv::core::transformer::convert;
//! use geoshape_csv::item::shapefile::shapefile_reader::ShapefileSourceBuilder;
//!
//! let source = ShapefileSourceBuilder::new()
//!     .from_path("data/regions.shp")
//!     .unwrap();
//!
//! let csv = convert(&source, &CsvDialect::default()).unwrap();
//! println!("{}", csv);
//! ```

/// A module resolving `.cpg` code pages.
pub mod code_page;

/// A module providing the shapefile feature source.
pub mod shapefile_reader;

#[cfg(feature = "zip")]
/// A module providing the zipped shapefile feature source.
pub mod zip_reader;
