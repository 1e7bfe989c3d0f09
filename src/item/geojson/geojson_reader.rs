use std::{
    cell::RefCell,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    vec,
};

use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    core::{
        feature::{AttributeValue, Feature},
        source::{FeatureResult, FeatureSource},
    },
    error::ConvertError,
};

/// Top-level object. Only `type`, `features` and `properties` are kept;
/// geometries and foreign members are skipped while parsing.
#[derive(Deserialize)]
struct GeoJsonDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<GeoJsonFeature>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

fn attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(value) => AttributeValue::Boolean(value),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                AttributeValue::Integer(integer)
            } else if let Some(unsigned) = number.as_u64() {
                AttributeValue::Unsigned(unsigned)
            } else {
                number
                    .as_f64()
                    .map_or_else(|| AttributeValue::Text(number.to_string()), AttributeValue::Float)
            }
        }
        Value::String(text) => AttributeValue::Text(text),
        nested @ (Value::Array(_) | Value::Object(_)) => AttributeValue::Text(nested.to_string()),
    }
}

impl From<GeoJsonFeature> for Feature {
    fn from(feature: GeoJsonFeature) -> Self {
        feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, attribute_value(value)))
            .collect()
    }
}

/// A [`FeatureSource`] over a GeoJSON `FeatureCollection` (or a lone
/// `Feature`).
///
/// The `properties` of each feature become its attributes, in document
/// order. Geometries are ignored. Arrays and objects found in properties are
/// kept as their JSON text.
///
/// # Memory
///
/// The document is parsed when the source is opened. Geometries are skipped
/// by the parser and never held in memory, but the `properties` of every
/// feature are, until they are read. Features are converted one at a time as
/// they are read.
///
/// # Examples
///
/// ```
/// use geoshape_csv::core::dialect::CsvDialect;
/// use geoshape_csv::core::transformer::convert;
/// use geoshape_csv::item::geojson::geojson_reader::GeoJsonSourceBuilder;
///
/// let geojson = r#"{
///   "type": "FeatureCollection",
///   "features": [
///     { "type": "Feature", "geometry": null, "properties": { "name": "Lyon", "pop": 522228 } },
///     { "type": "Feature", "geometry": null, "properties": { "name": "Nice", "pop": 342669 } }
///   ]
/// }"#;
///
/// let source = GeoJsonSourceBuilder::new().from_reader(geojson.as_bytes()).unwrap();
/// let csv = convert(&source, &CsvDialect::new(",", "\"", "\n")).unwrap();
///
/// assert_eq!(csv, "name,pop\nLyon,522228\nNice,342669\n");
/// ```
pub struct GeoJsonSource {
    origin: PathBuf,
    features: RefCell<Option<vec::IntoIter<GeoJsonFeature>>>,
}

impl GeoJsonSource {
    fn new(origin: PathBuf, document: GeoJsonDocument) -> Result<Self, ConvertError> {
        let features = match document.kind.as_str() {
            "FeatureCollection" => document.features,
            "Feature" => vec![GeoJsonFeature {
                properties: document.properties,
            }],
            other => {
                return Err(ConvertError::source_unavailable(
                    &origin,
                    format!("expected a Feature or a FeatureCollection, found {:?}", other),
                ));
            }
        };
        info!("Opened GeoJSON {} ({} features)", origin.display(), features.len());

        Ok(GeoJsonSource {
            origin,
            features: RefCell::new(Some(features.into_iter())),
        })
    }
}

impl FeatureSource for GeoJsonSource {
    fn read(&self) -> FeatureResult {
        Ok(self
            .features
            .borrow_mut()
            .as_mut()
            .and_then(Iterator::next)
            .map(Feature::from))
    }

    fn close(&self) -> Result<(), ConvertError> {
        if self.features.borrow_mut().take().is_some() {
            debug!("Closed GeoJSON {}", self.origin.display());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct GeoJsonSourceBuilder {}

impl GeoJsonSourceBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// Fails with [`ConvertError::SourceUnavailable`] when the file cannot
    /// be read or is not a GeoJSON feature or feature collection.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<GeoJsonSource, ConvertError> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|error| ConvertError::source_unavailable(path, error))?;
        let document = serde_json::from_reader(BufReader::new(file))
            .map_err(|error| ConvertError::source_unavailable(path, error))?;

        GeoJsonSource::new(path.to_path_buf(), document)
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> Result<GeoJsonSource, ConvertError> {
        let origin = PathBuf::from("<reader>");
        let document = serde_json::from_reader(rdr)
            .map_err(|error| ConvertError::source_unavailable(&origin, error))?;

        GeoJsonSource::new(origin, document)
    }
}
