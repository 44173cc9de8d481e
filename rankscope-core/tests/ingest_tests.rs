// Tests for loading keyword exports from disk

use rankscope_core::{CoreError, KeywordCatalog};
use std::fs;
use tempfile::TempDir;

const EXPORT: &str = "\u{feff}Keyword,Volume,Organic traffic,Paid traffic,Average position,Locations,Location,Country,Organic clicks,Paid clicks
seo tools,\"12,500\",3400,0,4.2,3,New York,US,2100,0
keyword research,1800,210,15,12,1,London,GB,95,4
,900,10,0,30,1,Berlin,DE,2,0
rank tracker,600,n/a,0,-1,1,Paris,FR,0,0
backlink checker,2400,75,0,22.5,2,Sydney,AU,31,1
";

fn write_export(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_from_csv_loads_valid_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, "keywords.csv", EXPORT.as_bytes());

    let catalog = KeywordCatalog::from_csv(&path).unwrap();
    assert_eq!(catalog.len(), 3);

    let first = &catalog.records()[0];
    assert_eq!(first.keyword, "seo tools");
    assert_eq!(first.volume, 12500);
    assert_eq!(first.average_position, 4.2);
    assert_eq!(first.location_name, "New York");
    assert_eq!(first.organic_clicks, 2100);

    assert_eq!(catalog.records()[2].keyword, "backlink checker");
}

#[test]
fn test_load_csv_reports_skipped_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, "keywords.csv", EXPORT.as_bytes());

    let mut catalog = KeywordCatalog::new();
    let summary = catalog.load_csv(&path).unwrap();
    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.skipped, 2);
}

#[test]
fn test_from_csv_latin1_export() {
    let dir = TempDir::new().unwrap();
    let mut bytes = b"Keyword,Volume\ncaf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b",150\n");
    let path = write_export(&dir, "latin1.csv", &bytes);

    let catalog = KeywordCatalog::from_csv(&path).unwrap();
    assert_eq!(catalog.records()[0].keyword, "café");
    assert_eq!(catalog.records()[0].volume, 150);
}

#[test]
fn test_from_csv_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = KeywordCatalog::from_csv(&dir.path().join("nope.csv"));
    assert!(matches!(result, Err(CoreError::SourceUnreadable { .. })));
}

#[test]
fn test_from_csv_without_known_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir, "other.csv", b"url,status\nhttps://a.example,200\n");

    match KeywordCatalog::from_csv(&path) {
        Err(CoreError::MissingHeader { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected MissingHeader, got {:?}", other.map(|c| c.len())),
    }
}
