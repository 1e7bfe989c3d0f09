pub mod common;

use std::fs::{self, read_to_string};

use rand::distr::{Alphanumeric, SampleString};
use tempfile::TempDir;

use common::fixtures::{Column, write_shapefile, write_zipped_shapefile};
use geoshape_csv::{
    ConvertError,
    core::{
        dialect::{CsvDialect, QuoteMode},
        feature::{AttributeValue, Feature},
        job::ConversionJobBuilder,
        transformer::{CsvTransformer, TransformerStatus, convert, convert_to},
    },
    item::{
        csv::destination::{output_path, write_to_file},
        geojson::geojson_reader::GeoJsonSourceBuilder,
        memory::MemoryFeatureSource,
        shapefile::shapefile_reader::ShapefileSourceBuilder,
    },
};

const REGION_COLUMNS: &[Column] = &[
    ("CODE", b'N', 4, 0),
    ("NAME", b'C', 16, 0),
    ("AREA", b'N', 10, 2),
    ("COASTAL", b'L', 1, 0),
    ("CREATED", b'D', 8, 0),
];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn unix() -> CsvDialect {
    CsvDialect::new(",", "\"", "\n")
}

#[test]
fn shapefile_should_convert_to_csv_text() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let shp = write_shapefile(
        dir.path(),
        "regions",
        REGION_COLUMNS,
        &[
            &["53", "Bretagne", "27208.00", "T", "20160101"],
            &["28", "Normandie", "29906.50", "F", ""],
        ],
    )
    .unwrap();

    let source = ShapefileSourceBuilder::new().from_path(&shp).unwrap();
    let csv = convert(&source, &unix()).unwrap();

    assert_eq!(
        csv,
        "CODE,NAME,AREA,COASTAL,CREATED\n\
         53,Bretagne,27208,true,2016-01-01\n\
         28,Normandie,29906.5,false,\n"
    );
    assert!(source.is_closed());
}

#[test]
fn header_should_follow_first_feature_attribute_order() {
    let source = MemoryFeatureSource::new(vec![
        Feature::new().with_attribute("zeta", 1).with_attribute("alpha", 2),
        Feature::new().with_attribute("zeta", 3).with_attribute("alpha", 4),
    ]);

    let csv = convert(&source, &unix()).unwrap();

    assert_eq!(csv, "zeta,alpha\n1,2\n3,4\n");
}

#[test]
fn every_row_should_have_as_many_fields_as_the_header() {
    let features: Vec<Feature> = (0..50)
        .map(|id| {
            Feature::new()
                .with_attribute("id", id)
                .with_attribute("label", format!("feature-{}", id))
                .with_attribute("weight", id as f64 / 4.0)
        })
        .collect();
    let source = MemoryFeatureSource::new(features);
    let dialect = CsvDialect::new("|", "\"", "\r\n");

    let csv = convert(&source, &dialect).unwrap();

    let lines: Vec<&str> = csv.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 51);
    assert!(lines.iter().all(|line| line.split('|').count() == 3));
    assert!(csv.ends_with("\r\n"));
}

#[test]
fn empty_source_should_produce_empty_document_and_be_closed() {
    let source = MemoryFeatureSource::new(vec![]);

    let csv = convert(&source, &unix()).unwrap();

    assert_eq!(csv, "");
    assert_eq!(source.close_count(), 1);
}

#[test]
fn schema_mismatch_should_report_the_offending_feature() {
    init_logger();
    let source = MemoryFeatureSource::new(vec![
        Feature::new().with_attribute("a", 1).with_attribute("b", 2),
        Feature::new().with_attribute("b", 3).with_attribute("a", 4),
    ]);
    let mut sink = Vec::new();

    let result = convert_to(&source, &unix(), &mut sink);

    match result {
        Err(ConvertError::SchemaMismatch { index, expected, found }) => {
            assert_eq!(index, 2);
            assert_eq!(expected, vec!["a", "b"]);
            assert_eq!(found, vec!["b", "a"]);
        }
        other => panic!("unexpected result: {:?}", other.map(|summary| summary.row_count)),
    }
    assert_eq!(String::from_utf8(sink).unwrap(), "a,b\n1,2\n");
    assert!(source.is_closed());
}

#[test]
fn strict_quoting_should_protect_special_values() {
    let source = MemoryFeatureSource::new(vec![
        Feature::new()
            .with_attribute("name", "Saint-Denis, La Réunion")
            .with_attribute("motto", "\"Florebo quocumque ferar\""),
    ]);
    let dialect = CsvDialect::builder()
        .newline("\n")
        .quote_mode(QuoteMode::Necessary)
        .build()
        .unwrap();

    let csv = convert(&source, &dialect).unwrap();

    assert_eq!(
        csv,
        "name,motto\n\"Saint-Denis, La Réunion\",\"\"\"Florebo quocumque ferar\"\"\"\n"
    );
}

#[test]
fn transformer_should_expose_summary_and_refuse_reuse() {
    let transformer = CsvTransformer::new(unix());
    let first = MemoryFeatureSource::new(vec![Feature::new().with_attribute("id", 1)]);

    let summary = transformer.convert_to(&first, Vec::new()).unwrap();
    assert_eq!(summary.row_count, 1);
    assert_eq!(transformer.status(), TransformerStatus::Completed);
    assert_eq!(summary.schema.unwrap().names(), &["id".to_string()]);

    let second = MemoryFeatureSource::new(vec![Feature::new().with_attribute("id", 2)]);
    let result = transformer.convert(&second);

    assert!(matches!(result, Err(ConvertError::Configuration(_))));
    assert!(second.is_closed());
    assert_eq!(second.read_count(), 0);
}

#[test]
fn geojson_should_convert_properties() {
    let geojson = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": null,
                "properties": { "name": "Lyon", "pop": 522228, "capital": false }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": { "name": "Paris", "pop": 2133111, "capital": true }
            }
        ]
    }"#;

    let source = GeoJsonSourceBuilder::new().from_reader(geojson.as_bytes()).unwrap();
    let csv = convert(&source, &CsvDialect::new(";", "\"", "\n")).unwrap();

    assert_eq!(csv, "name;pop;capital\nLyon;522228;false\nParis;2133111;true\n");
}

#[test]
fn output_path_should_replace_extension_with_csv() {
    let dir = TempDir::new().unwrap();

    let path = output_path("/data/regions.shp".as_ref(), dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), "regions.csv");
    assert!(path.is_absolute());
    assert!(path.starts_with(std::path::absolute(dir.path()).unwrap()));
}

#[test]
fn write_to_file_should_store_converted_text() {
    let dir = TempDir::new().unwrap();
    let source = MemoryFeatureSource::new(vec![
        Feature::new()
            .with_attribute("id", 1)
            .with_attribute("note", AttributeValue::Null),
    ]);
    let csv = convert(&source, &unix()).unwrap();

    let path = write_to_file(&csv, "communes.geojson".as_ref(), dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), "communes.csv");
    assert_eq!(read_to_string(path).unwrap(), "id,note\n1,\n");
}

#[test]
fn job_should_convert_shapefile_into_destination() {
    init_logger();
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let stem = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let shp = write_shapefile(
        input.path(),
        &stem,
        REGION_COLUMNS,
        &[&["11", "Ile-de-France", "12011.00", "F", "20160101"]],
    )
    .unwrap();

    let job = ConversionJobBuilder::new()
        .source(&shp)
        .destination(output.path())
        .dialect(CsvDialect::new(";", "\"", "\n"))
        .build()
        .unwrap();
    let execution = job.run().unwrap();

    assert_eq!(execution.row_count, 1);
    assert_eq!(
        execution.output_path.file_name().unwrap().to_string_lossy(),
        format!("{}.csv", stem)
    );
    assert_eq!(
        read_to_string(&execution.output_path).unwrap(),
        "CODE;NAME;AREA;COASTAL;CREATED\n11;Ile-de-France;12011;false;2016-01-01\n"
    );
}

#[test]
fn job_should_convert_zipped_shapefile() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let archive = write_zipped_shapefile(
        &input.path().join("departements.zip"),
        "departements",
        &[("CODE", b'C', 3, 0), ("NAME", b'C', 12, 0)],
        &[&["01", "Ain"], &["2A", "Corse-du-Sud"]],
    )
    .unwrap();

    let execution = ConversionJobBuilder::new()
        .source(&archive)
        .destination(output.path())
        .dialect(unix())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(execution.row_count, 2);
    assert_eq!(execution.output_path.file_name().unwrap(), "departements.csv");
    assert_eq!(
        read_to_string(&execution.output_path).unwrap(),
        "CODE,NAME\n01,Ain\n2A,Corse-du-Sud\n"
    );
}

#[test]
fn job_should_convert_geojson_file() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let source = input.path().join("stations.geojson");
    fs::write(
        &source,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature",
             "geometry":{"type":"Point","coordinates":[2.35,48.85]},
             "properties":{"id":"S1","lines":[1,4]}}
        ]}"#,
    )
    .unwrap();

    let execution = ConversionJobBuilder::new()
        .source(&source)
        .destination(output.path())
        .dialect(CsvDialect::new("\t", "\"", "\n"))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(read_to_string(execution.output_path).unwrap(), "id\tlines\nS1\t[1,4]\n");
}
