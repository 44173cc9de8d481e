// Tests for report envelopes, export and text rendering

use rankscope_core::comparison::SiteComparison;
use rankscope_core::report::{
    ComparisonReport, KeywordReport, export_json, generate_comparison_text_report,
    generate_keyword_text_report, generate_suggestions_text_report, render_gaps, to_json,
};
use rankscope_core::{ComparisonEngine, CoreError, KeywordCatalog, KeywordRecord, SortBy};
use rankscope_scanner::PageAnalysis;
use tempfile::TempDir;

fn record(keyword: &str, volume: u64, traffic: u64, position: f64) -> KeywordRecord {
    KeywordRecord {
        keyword: keyword.to_string(),
        volume,
        organic_traffic: traffic,
        paid_traffic: 0,
        average_position: position,
        locations_count: 0,
        location_name: String::new(),
        country: String::new(),
        organic_clicks: 0,
        paid_clicks: 0,
    }
}

fn catalog() -> KeywordCatalog {
    let mut records: Vec<KeywordRecord> = (0..25)
        .map(|i| record(&format!("keyword {}", i), 100 * i, 10 * i, i as f64))
        .collect();
    records.push(record("deep keyword", 5000, 20, 35.0));
    KeywordCatalog::from_records(records)
}

fn site_comparison() -> SiteComparison {
    let mut competitor = PageAnalysis::new("https://competitor.example".to_string());
    competitor.title = "Competitor SEO Tools".to_string();
    competitor.word_count = 1500;
    let mut mine = PageAnalysis::new("https://mine.example".to_string());
    mine.title = "Mine".to_string();
    mine.word_count = 900;
    mine.warnings = vec!["Missing meta description".to_string()];

    let result = ComparisonEngine::new().compare(&competitor, &mine, Some(&catalog()));
    SiteComparison {
        competitor_analysis: Some(competitor),
        my_site_analysis: Some(mine),
        result,
    }
}

// ============================================================================
// Keyword report
// ============================================================================

#[test]
fn test_keyword_report_defaults_to_top_twenty_by_volume() {
    let report = KeywordReport::from_catalog(&catalog());
    assert_eq!(report.total_keywords, 26);
    assert_eq!(report.sorted_by, SortBy::Volume);
    assert_eq!(report.top_keywords.len(), 20);
    assert_eq!(report.top_keywords[0].keyword, "deep keyword");
    assert_eq!(report.top_keywords[1].keyword, "keyword 24");
    assert_eq!(report.summary_stats.total_keywords, 26);
    assert_eq!(report.keyword_gaps.low_competition_keywords.len(), 5);
}

#[test]
fn test_keyword_report_custom_limit_and_sort() {
    let report = KeywordReport::new(&catalog(), 3, SortBy::Position);
    let keywords: Vec<&str> = report
        .top_keywords
        .iter()
        .map(|k| k.keyword.as_str())
        .collect();
    assert_eq!(keywords, vec!["keyword 0", "keyword 1", "keyword 2"]);
}

#[test]
fn test_keyword_text_report_sections() {
    let text = generate_keyword_text_report(&KeywordReport::from_catalog(&catalog()));
    assert!(text.contains("RANKSCOPE KEYWORD REPORT"));
    assert!(text.contains("TOP KEYWORDS BY VOLUME"));
    assert!(text.contains("KEYWORD OPPORTUNITIES"));
    assert!(text.contains("deep keyword"));
    assert!(text.contains("End of Report"));
}

#[test]
fn test_render_gaps_empty_catalog() {
    let text = render_gaps(&KeywordCatalog::new().keyword_gaps());
    assert!(text.contains("High volume, ranking beyond page 1: 0"));
    assert!(text.contains("Position improvement targets (4-10): 0"));
}

#[test]
fn test_suggestions_text_report() {
    let targets = vec!["keyword 2".to_string()];
    let suggestions = catalog().content_suggestions(targets.as_slice());
    let text = generate_suggestions_text_report(&targets, &suggestions);
    assert!(text.contains("CONTENT SUGGESTIONS FOR: keyword 2"));
    assert!(text.contains("keyword 24"));
}

// ============================================================================
// Comparison report
// ============================================================================

#[test]
fn test_comparison_report_json_layout() {
    let report = ComparisonReport::new(
        "https://competitor.example",
        "https://mine.example",
        site_comparison(),
    );
    let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();

    assert_eq!(json["metadata"]["generator"], "Rankscope");
    assert_eq!(json["competitor_url"], "https://competitor.example");
    assert_eq!(json["my_site_analysis"]["title"], "Mine");
    assert_eq!(
        json["result"]["content_analysis"]["word_count_comparison"]["word_count_gap"],
        600
    );
    assert!(json["result"]["recommendations"].is_array());
    assert!(json["result"].get("error").is_none());
}

#[test]
fn test_comparison_text_report_sections() {
    let report = ComparisonReport::new(
        "https://competitor.example",
        "https://mine.example",
        site_comparison(),
    );
    let text = generate_comparison_text_report(&report);
    assert!(text.contains("RANKSCOPE COMPETITOR COMPARISON"));
    assert!(text.contains("PAGE ELEMENTS"));
    assert!(text.contains("[-] Competitor has more comprehensive content"));
    assert!(text.contains("Title is too short"));
    assert!(text.contains("[YOURS ONLY] Missing meta description"));
    assert!(text.contains("KEYWORD INSIGHTS"));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_json_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("comparison.json");
    let comparison = site_comparison();

    export_json(&comparison.result, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let parsed: rankscope_core::ComparisonResult = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, comparison.result);
}

#[test]
fn test_export_json_reports_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.json");

    let result = export_json(&KeywordCatalog::new().summary_stats(), &path);
    assert!(matches!(result, Err(CoreError::ExportFailed { .. })));
}
