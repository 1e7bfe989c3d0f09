#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # GeoShape CSV for Rust

 Converts geospatial vector datasets (shapefile attribute tables, GeoJSON
 feature properties) into CSV: attribute names become the header row and each
 feature becomes one row. Conversion is streamed: features are pulled one at a
 time and every row is written to the sink as soon as it is produced.

 ## Core Concepts

- **Feature:** one geospatial record reduced to an ordered list of
  `(name, value)` attributes. Geometry is ignored.
- **Schema:** the attribute names of the first feature. Every following
  feature must carry the same names in the same order, otherwise the
  conversion fails with `ConvertError::SchemaMismatch`.
- **FeatureSource:** the boundary with a dataset format: `read` the next
  feature, `close` the underlying files. Sources are opened through their
  builders.
- **CsvDialect:** delimiter, quote and newline strings plus the quote mode.
- **CsvTransformer:** pulls features from a source and writes CSV rows,
  closing the source before it returns, whatever the outcome.
- **ConversionJob:** opens a dataset file by extension and streams it into
  `<destination>/<stem>.csv`.

 ## Features

| **Feature** | **Description**                                              |
|-------------|--------------------------------------------------------------|
| shapefile   | Enables the `.shp`/`.shx`/`.dbf` feature source              |
| zip         | Enables the zipped shapefile feature source                  |
| geojson     | Enables the GeoJSON `FeatureCollection` feature source       |
| full        | Enables all available features                               |

 ## Getting Started

```toml
[dependencies]
geoshape-csv-rs = { version = "<version>", features = ["<full|shapefile|zip|geojson>"] }
```

```rust
use geoshape_csv::{
    ConvertError,
    core::{dialect::CsvDialect, feature::Feature, transformer::convert},
    item::memory::MemoryFeatureSource,
};

fn main() -> Result<(), ConvertError> {
    let source = MemoryFeatureSource::new(vec![
        Feature::new().with_attribute("a", "1").with_attribute("b", "2"),
        Feature::new().with_attribute("a", "3").with_attribute("b", "4"),
    ]);

    let dialect = CsvDialect::builder().delimiter(";").newline("\n").build()?;
    let csv = convert(&source, &dialect)?;

    assert_eq!(csv, "a;b\n1;2\n3;4\n");
    assert!(source.is_closed());
    Ok(())
}
```

 ## Known limitation

 With the default dialect, values are written verbatim: a value holding the
 delimiter, the quote or a line break is not quoted. Use
 `QuoteMode::Necessary` to quote such values.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for feature conversion
pub mod core;

/// Error types for conversions
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of feature sources and CSV writers (for exemple: shapefile source and csv writer)
pub mod item;
