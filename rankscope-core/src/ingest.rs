// Keyword export ingestion: decoding, header normalization and row extraction

use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordField {
    Keyword,
    Volume,
    OrganicTraffic,
    PaidTraffic,
    AveragePosition,
    Locations,
    Location,
    Country,
    OrganicClicks,
    PaidClicks,
}

impl KeywordField {
    pub const ALL: [KeywordField; 10] = [
        KeywordField::Keyword,
        KeywordField::Volume,
        KeywordField::OrganicTraffic,
        KeywordField::PaidTraffic,
        KeywordField::AveragePosition,
        KeywordField::Locations,
        KeywordField::Location,
        KeywordField::Country,
        KeywordField::OrganicClicks,
        KeywordField::PaidClicks,
    ];

    /// Column name used by the keyword tool's export.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            KeywordField::Keyword => "Keyword",
            KeywordField::Volume => "Volume",
            KeywordField::OrganicTraffic => "Organic traffic",
            KeywordField::PaidTraffic => "Paid traffic",
            KeywordField::AveragePosition => "Average position",
            KeywordField::Locations => "Locations",
            KeywordField::Location => "Location",
            KeywordField::Country => "Country",
            KeywordField::OrganicClicks => "Organic clicks",
            KeywordField::PaidClicks => "Paid clicks",
        }
    }

    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            KeywordField::Keyword => &["keyword"],
            KeywordField::Volume => &["volume", "search volume"],
            KeywordField::OrganicTraffic => &["organic traffic", "organic_traffic", "traffic"],
            KeywordField::PaidTraffic => &["paid traffic", "paid_traffic"],
            KeywordField::AveragePosition => &["average position", "average_position", "position"],
            KeywordField::Locations => &["locations"],
            KeywordField::Location => &["location"],
            KeywordField::Country => &["country"],
            KeywordField::OrganicClicks => &["organic clicks", "organic_clicks"],
            KeywordField::PaidClicks => &["paid clicks", "paid_clicks"],
        }
    }

    /// Match a column header against the canonical names and their synonyms,
    /// ignoring case and surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = header.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.synonyms().contains(&normalized.as_str()))
    }
}

/// One loosely-typed source row. Values are kept as raw text; coercion happens
/// when the row becomes a [`crate::KeywordRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordRow {
    values: HashMap<KeywordField, String>,
}

impl KeywordRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: KeywordField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Build a row from arbitrary `(column, value)` pairs. Unrecognized
    /// columns are ignored; the first column matching a field wins.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut row = Self::new();
        for (column, value) in pairs {
            if let Some(field) = KeywordField::from_header(column) {
                row.values.entry(field).or_insert_with(|| value.to_string());
            }
        }
        row
    }

    pub fn get(&self, field: KeywordField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

/// Decode raw bytes as UTF-8, falling back to Latin-1.
pub fn decode_source(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Source is not valid UTF-8, decoding as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Read a keyword export from disk. Only an unreadable file or a missing
/// header fails; malformed records are logged and skipped.
pub fn read_keyword_rows(path: &Path) -> Result<Vec<KeywordRow>> {
    info!("Reading keyword rows from {}", path.display());
    let bytes = fs::read(path).map_err(|source| CoreError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    parse_keyword_csv(&decode_source(bytes)).map_err(|e| match e {
        CoreError::MissingHeader { .. } => CoreError::MissingHeader {
            path: path.to_path_buf(),
        },
        other => other,
    })
}

/// Parse CSV text into keyword rows.
pub fn parse_keyword_csv(text: &str) -> Result<Vec<KeywordRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<KeywordField>> = reader
        .headers()?
        .iter()
        .map(KeywordField::from_header)
        .collect();

    if columns.iter().all(Option::is_none) {
        return Err(CoreError::MissingHeader {
            path: Default::default(),
        });
    }

    let missing: Vec<&str> = KeywordField::ALL
        .iter()
        .filter(|field| !columns.contains(&Some(**field)))
        .map(|field| field.canonical_name())
        .collect();
    if !missing.is_empty() {
        warn!("Missing columns: {:?}", missing);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable record {}: {}", idx + 1, e);
                continue;
            }
        };

        let mut row = KeywordRow::new();
        for (column, value) in columns.iter().zip(record.iter()) {
            if let Some(field) = column {
                row.values.entry(*field).or_insert_with(|| value.to_string());
            }
        }
        rows.push(row);
    }

    debug!("Parsed {} keyword rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_synonyms() {
        assert_eq!(KeywordField::from_header("Keyword"), Some(KeywordField::Keyword));
        assert_eq!(KeywordField::from_header(" Search Volume "), Some(KeywordField::Volume));
        assert_eq!(KeywordField::from_header("Traffic"), Some(KeywordField::OrganicTraffic));
        assert_eq!(KeywordField::from_header("Position"), Some(KeywordField::AveragePosition));
        assert_eq!(KeywordField::from_header("paid_clicks"), Some(KeywordField::PaidClicks));
        assert_eq!(KeywordField::from_header("CPC"), None);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_source(bytes), "café");
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = "\u{feff}Keyword".as_bytes().to_vec();
        assert_eq!(decode_source(bytes), "Keyword");
    }

    #[test]
    fn test_parse_maps_columns() {
        let csv = "Keyword,Search Volume,Traffic,Position,CPC\nseo tools,1200,340,7.5,2.10\n";
        let rows = parse_keyword_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(KeywordField::Keyword), Some("seo tools"));
        assert_eq!(rows[0].get(KeywordField::Volume), Some("1200"));
        assert_eq!(rows[0].get(KeywordField::OrganicTraffic), Some("340"));
        assert_eq!(rows[0].get(KeywordField::AveragePosition), Some("7.5"));
        assert_eq!(rows[0].get(KeywordField::Country), None);
    }

    #[test]
    fn test_parse_short_records_are_kept() {
        let csv = "Keyword,Volume,Organic traffic\nalpha,10\nbeta,20,5\n";
        let rows = parse_keyword_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(KeywordField::OrganicTraffic), None);
        assert_eq!(rows[1].get(KeywordField::OrganicTraffic), Some("5"));
    }

    #[test]
    fn test_parse_without_recognized_header() {
        let result = parse_keyword_csv("foo,bar\n1,2\n");
        assert!(matches!(result, Err(CoreError::MissingHeader { .. })));
    }

    #[test]
    fn test_from_pairs_first_match_wins() {
        let row = KeywordRow::from_pairs([
            ("Volume", "100"),
            ("Search Volume", "200"),
            ("Unrelated", "x"),
        ]);
        assert_eq!(row.get(KeywordField::Volume), Some("100"));
    }
}
