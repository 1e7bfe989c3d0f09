/// This module provides the CSV row writer and the output file helpers.
pub mod csv;

/// This module provides an in-memory feature source.
pub mod memory;

#[cfg(feature = "shapefile")]
/// This module provides shapefile feature sources, plain or zipped.
pub mod shapefile;

#[cfg(feature = "geojson")]
/// This module provides a GeoJSON feature source.
pub mod geojson;
