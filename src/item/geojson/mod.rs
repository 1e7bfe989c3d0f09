//! GeoJSON support for reading feature properties.
//!
//! A GeoJSON `FeatureCollection` offers the same shape of data as a
//! shapefile attribute table: an ordered set of named properties per feature.
//! [`geojson_reader::GeoJsonSource`] exposes it behind the same
//! [`FeatureSource`](crate::core::source::FeatureSource) trait, so it converts
//! to CSV with the same transformer.
//!
//! Property order is taken from the document (`serde_json` is built with
//! `preserve_order`). All features of a collection must still share the same
//! property names in the same order.

/// A module providing the GeoJSON feature source.
pub mod geojson_reader;
