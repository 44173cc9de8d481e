// Report envelopes, JSON export and plain-text rendering

use crate::comparison::{ComparisonResult, SiteComparison};
use crate::error::{CoreError, Result};
use crate::keywords::{ContentSuggestions, KeywordCatalog, KeywordGaps, SortBy, SummaryStats};
use rankscope_scanner::PageAnalysis;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

const DIVIDER: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";
const DEFAULT_TOP_KEYWORDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generator: String,
    pub version: String,
    pub generated_at: String,
}

impl ReportMetadata {
    pub fn now() -> Self {
        Self {
            generator: "Rankscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metadata: ReportMetadata,
    pub competitor_url: String,
    pub my_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_analysis: Option<PageAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_site_analysis: Option<PageAnalysis>,
    pub result: ComparisonResult,
}

impl ComparisonReport {
    pub fn new(competitor_url: &str, my_url: &str, comparison: SiteComparison) -> Self {
        Self {
            metadata: ReportMetadata::now(),
            competitor_url: competitor_url.to_string(),
            my_url: my_url.to_string(),
            competitor_analysis: comparison.competitor_analysis,
            my_site_analysis: comparison.my_site_analysis,
            result: comparison.result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopKeyword {
    pub keyword: String,
    pub volume: u64,
    pub traffic: u64,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub metadata: ReportMetadata,
    pub total_keywords: usize,
    pub sorted_by: SortBy,
    pub top_keywords: Vec<TopKeyword>,
    pub keyword_gaps: KeywordGaps,
    pub summary_stats: SummaryStats,
}

impl KeywordReport {
    /// Top 20 by volume plus gaps and summary statistics.
    pub fn from_catalog(catalog: &KeywordCatalog) -> Self {
        Self::new(catalog, DEFAULT_TOP_KEYWORDS, SortBy::Volume)
    }

    pub fn new(catalog: &KeywordCatalog, limit: usize, sort_by: SortBy) -> Self {
        let top_keywords = catalog
            .top_keywords(limit, sort_by)
            .into_iter()
            .map(|kw| TopKeyword {
                keyword: kw.keyword.clone(),
                volume: kw.volume,
                traffic: kw.organic_traffic,
                position: kw.average_position,
            })
            .collect();

        Self {
            metadata: ReportMetadata::now(),
            total_keywords: catalog.len(),
            sorted_by: sort_by,
            top_keywords,
            keyword_gaps: catalog.keyword_gaps(),
            summary_stats: catalog.summary_stats(),
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Serialize `value` as pretty JSON and write it to `path`.
pub fn export_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = to_json(value)?;
    save_report(&json, path).map_err(|source| CoreError::ExportFailed {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Report exported to {}", path.display());
    Ok(())
}

fn push_header(report: &mut String, title: &str) {
    report.push_str(DIVIDER);
    report.push_str(&format!("{:^80}\n", title));
    report.push_str(DIVIDER);
    report.push('\n');
}

fn push_section(report: &mut String, title: &str) {
    report.push_str(DIVIDER);
    report.push_str(title);
    report.push('\n');
    report.push_str(DIVIDER);
    report.push('\n');
}

fn push_footer(report: &mut String, metadata: &ReportMetadata) {
    report.push_str(DIVIDER);
    report.push_str(&format!("{:^80}\n", "End of Report"));
    report.push_str(DIVIDER);
    report.push_str(&format!(
        "\nGenerated by {} v{} at {}\n\n",
        metadata.generator, metadata.version, metadata.generated_at
    ));
}

fn or_missing(text: &str) -> &str {
    if text.is_empty() { "(none)" } else { text }
}

pub fn generate_comparison_text_report(report: &ComparisonReport) -> String {
    let mut out = String::new();
    push_header(&mut out, "RANKSCOPE COMPETITOR COMPARISON");

    out.push_str(&format!("Competitor:   {}\n", report.competitor_url));
    out.push_str(&format!("Your site:    {}\n\n", report.my_url));

    let result = &report.result;
    if let Some(ref error) = result.error {
        push_section(&mut out, "ERROR");
        out.push_str(&format!("Comparison failed: {}\n\n", error));
        push_footer(&mut out, &report.metadata);
        return out;
    }

    if let Some(ref page) = result.page_analysis {
        push_section(&mut out, "PAGE ELEMENTS");
        let title = &page.title_comparison;
        out.push_str(&format!(
            "Title (competitor, {} chars):  {}\n",
            title.competitor_title_length,
            or_missing(&title.competitor_title)
        ));
        out.push_str(&format!(
            "Title (yours, {} chars):       {}\n",
            title.my_title_length,
            or_missing(&title.my_title)
        ));
        let desc = &page.meta_description_comparison;
        out.push_str(&format!(
            "Meta description length:      {} vs {} (yours)\n",
            desc.competitor_desc_length, desc.my_desc_length
        ));
        let headings = &page.headings_comparison;
        out.push_str(&format!(
            "H1 / H2 headings:             {} / {} vs {} / {} (yours)\n\n",
            headings.competitor_h1_count,
            headings.competitor_h2_count,
            headings.my_h1_count,
            headings.my_h2_count
        ));
    }

    if let Some(ref content) = result.content_analysis {
        push_section(&mut out, "CONTENT");
        let words = &content.word_count_comparison;
        out.push_str(&format!(
            "Word count:   {} vs {} (yours), gap {}\n",
            words.competitor_word_count, words.my_word_count, words.word_count_gap
        ));
        let density = &content.keyword_density_comparison;
        out.push_str(&format!(
            "Keyword gaps: {} (average gap {:.2})\n\n",
            density.total_gaps, density.avg_gap
        ));
        for gap in density.keyword_gaps.iter().take(10) {
            out.push_str(&format!(
                "  {:<32} {:>6} vs {:<6} score {:.1}\n",
                gap.keyword, gap.competitor_density, gap.my_density, gap.opportunity_score
            ));
        }
        out.push('\n');
    }

    if let Some(ref technical) = result.technical_seo {
        push_section(&mut out, "TECHNICAL SEO");
        let warnings = &technical.warnings_comparison;
        out.push_str(&format!(
            "Warnings:     {} vs {} (yours)\n",
            warnings.competitor_warnings, warnings.my_warnings
        ));
        for issue in &warnings.my_unique_issues {
            out.push_str(&format!("  [YOURS ONLY] {}\n", issue));
        }
        let structure = &technical.structure_comparison;
        out.push_str(&format!(
            "Images without alt: {} vs {} (yours)\n",
            structure.images.competitor_images, structure.images.my_images
        ));
        out.push_str(&format!(
            "Internal links:     {} vs {} (yours)\n",
            structure.links.competitor_internal_links, structure.links.my_internal_links
        ));
        out.push_str(&format!(
            "External links:     {} vs {} (yours)\n\n",
            structure.links.competitor_external_links, structure.links.my_external_links
        ));
    }

    if !result.advantages.is_empty() || !result.disadvantages.is_empty() {
        push_section(&mut out, "STRENGTHS & WEAKNESSES");
        for advantage in &result.advantages {
            out.push_str(&format!("  [+] {}\n", advantage));
        }
        for disadvantage in &result.disadvantages {
            out.push_str(&format!("  [-] {}\n", disadvantage));
        }
        out.push('\n');
    }

    if !result.recommendations.is_empty() {
        push_section(&mut out, "RECOMMENDATIONS");
        for (idx, rec) in result.recommendations.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", idx + 1, rec.issue));
            out.push_str(&format!("Category:     {}\n", rec.category));
            out.push_str(&format!("Priority:     {}\n", rec.priority.as_str().to_uppercase()));
            out.push_str(&format!("Impact:       {}\n", rec.impact.as_str()));
            out.push_str(&format!("Action:       {}\n\n", rec.recommendation));
            out.push_str(RULE);
            out.push('\n');
        }
    }

    if let Some(ref insights) = result.keyword_insights {
        push_section(&mut out, "KEYWORD INSIGHTS");
        out.push_str(&format!(
            "High priority keywords: {}\n",
            insights.high_priority_keywords.len()
        ));
        for kw in insights.high_priority_keywords.iter().take(10) {
            out.push_str(&format!(
                "  {:<40} vol {:>8}  pos {:>5.1}  score {:.1}\n",
                kw.keyword, kw.volume, kw.current_position, kw.priority_score
            ));
        }
        out.push_str(&format!("\nQuick wins: {}\n", insights.quick_wins.len()));
        for kw in insights.quick_wins.iter().take(10) {
            out.push_str(&format!(
                "  {:<40} vol {:>8}  pos {:>5.1}  +{} traffic\n",
                kw.keyword, kw.volume, kw.current_position, kw.potential_traffic_gain
            ));
        }
        out.push('\n');
    }

    push_footer(&mut out, &report.metadata);
    out
}

pub fn generate_keyword_text_report(report: &KeywordReport) -> String {
    let mut out = String::new();
    push_header(&mut out, "RANKSCOPE KEYWORD REPORT");

    let stats = &report.summary_stats;
    push_section(&mut out, "SUMMARY");
    out.push_str(&format!("Keywords:        {}\n", report.total_keywords));
    out.push_str(&format!("Total volume:    {}\n", stats.total_volume));
    out.push_str(&format!("Total traffic:   {}\n", stats.total_traffic));
    out.push_str(&format!("Avg volume:      {:.1}\n", stats.avg_volume));
    out.push_str(&format!("Avg traffic:     {:.1}\n", stats.avg_traffic));
    out.push_str(&format!("Avg position:    {:.1}\n", stats.avg_position));
    out.push_str(&format!("Top 10:          {}\n", stats.top_10_positions));
    out.push_str(&format!("Page 1 (1-10):   {}\n", stats.page_1_positions));
    out.push_str(&format!("Page 2 (11-20):  {}\n\n", stats.page_2_positions));

    if !report.top_keywords.is_empty() {
        let sort_label = match report.sorted_by {
            SortBy::Volume => "VOLUME",
            SortBy::Traffic => "TRAFFIC",
            SortBy::Position => "POSITION",
        };
        push_section(&mut out, &format!("TOP KEYWORDS BY {}", sort_label));
        out.push_str(&format!(
            "  {:<40} {:>10} {:>10} {:>8}\n",
            "Keyword", "Volume", "Traffic", "Position"
        ));
        for kw in &report.top_keywords {
            out.push_str(&format!(
                "  {:<40} {:>10} {:>10} {:>8.1}\n",
                kw.keyword, kw.volume, kw.traffic, kw.position
            ));
        }
        out.push('\n');
    }

    out.push_str(&render_gaps(&report.keyword_gaps));
    push_footer(&mut out, &report.metadata);
    out
}

/// Opportunity buckets only; used by the keyword report and the `gaps` command.
pub fn render_gaps(gaps: &KeywordGaps) -> String {
    let mut out = String::new();
    push_section(&mut out, "KEYWORD OPPORTUNITIES");

    out.push_str(&format!(
        "High volume, ranking beyond page 1: {}\n",
        gaps.high_volume_opportunities.len()
    ));
    for kw in &gaps.high_volume_opportunities {
        out.push_str(&format!(
            "  {:<40} vol {:>8}  pos {:>5.1}  traffic {}\n",
            kw.keyword, kw.volume, kw.current_position, kw.traffic_potential
        ));
    }

    out.push_str(&format!(
        "\nLow competition (position > 20): {}\n",
        gaps.low_competition_keywords.len()
    ));
    for kw in &gaps.low_competition_keywords {
        out.push_str(&format!(
            "  {:<40} vol {:>8}  pos {:>5.1}\n",
            kw.keyword, kw.volume, kw.position
        ));
    }

    out.push_str(&format!(
        "\nPosition improvement targets (4-10): {}\n",
        gaps.position_improvement_targets.len()
    ));
    for kw in &gaps.position_improvement_targets {
        out.push_str(&format!(
            "  {:<40} vol {:>8}  pos {:>5.1}  potential {:.1}\n",
            kw.keyword, kw.volume, kw.current_position, kw.improvement_potential
        ));
    }
    out.push('\n');
    out
}

pub fn generate_suggestions_text_report(
    targets: &[String],
    suggestions: &ContentSuggestions,
) -> String {
    let mut out = String::new();
    push_section(&mut out, &format!("CONTENT SUGGESTIONS FOR: {}", targets.join(", ")));

    out.push_str("Primary keywords:\n");
    for kw in &suggestions.primary_keywords {
        out.push_str(&format!(
            "  {:<40} vol {:>8}  pos {:>5.1}\n",
            kw.keyword, kw.volume, kw.competition_position
        ));
    }
    out.push_str("\nSecondary keywords:\n");
    for kw in &suggestions.secondary_keywords {
        out.push_str(&format!("  {:<40} vol {:>8}\n", kw.keyword, kw.volume));
    }
    out.push_str("\nLong-tail opportunities:\n");
    for kw in &suggestions.long_tail_opportunities {
        out.push_str(&format!("  {:<40} vol {:>8}\n", kw.keyword, kw.volume));
    }
    out.push('\n');
    out
}

pub fn generate_analysis_text_report(analysis: &PageAnalysis) -> String {
    let mut out = String::new();
    push_header(&mut out, "RANKSCOPE PAGE ANALYSIS");

    out.push_str(&format!("URL:          {}\n", analysis.url));
    out.push_str(&format!("Status:       {}\n", analysis.status_code));
    out.push_str(&format!("Pages:        {}\n", analysis.pages_analyzed));
    out.push_str(&format!("Title:        {}\n", or_missing(&analysis.title)));
    out.push_str(&format!("Description:  {}\n", or_missing(&analysis.description)));
    out.push_str(&format!("Word count:   {}\n", analysis.word_count));
    out.push_str(&format!(
        "Headings:     {} h1, {} h2\n",
        analysis.h1.len(),
        analysis.h2.len()
    ));
    out.push_str(&format!(
        "Links:        {} internal, {} external\n\n",
        analysis.internal_links.len(),
        analysis.external_links.len()
    ));

    if !analysis.warnings.is_empty() {
        push_section(&mut out, "WARNINGS");
        for warning in &analysis.warnings {
            out.push_str(&format!("  [!] {}\n", warning));
        }
        out.push('\n');
    }

    if !analysis.keyword_densities.is_empty() {
        push_section(&mut out, "TOP KEYWORDS");
        let mut densities: Vec<(&String, &f64)> = analysis.keyword_densities.iter().collect();
        densities.sort_by(|a, b| b.1.total_cmp(a.1));
        for (keyword, count) in densities.into_iter().take(20) {
            out.push_str(&format!("  {:<40} {:>6}\n", keyword, count));
        }
        out.push('\n');
    }

    if !analysis.extra_tags.is_empty() {
        push_section(&mut out, "EXTRA TAGS");
        for (tag, value) in &analysis.extra_tags {
            out.push_str(&format!("  {:<24} {}\n", tag, value));
        }
        out.push('\n');
    }

    out
}
