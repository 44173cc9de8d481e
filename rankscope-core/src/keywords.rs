// Keyword catalog: ranking, summary statistics and opportunity buckets

use crate::error::{Result, RowError};
use crate::ingest::{KeywordField, KeywordRow, read_keyword_rows};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const HIGH_VOLUME_MIN: u64 = 1000;
const HIGH_VOLUME_POSITION_ABOVE: f64 = 10.0;
const LOW_COMPETITION_VOLUME_MIN: u64 = 100;
const LOW_COMPETITION_POSITION_ABOVE: f64 = 20.0;
const IMPROVEMENT_POSITION_RANGE: (f64, f64) = (4.0, 10.0);
const SUGGESTION_MATCH_LIMIT: usize = 10;
const PRIMARY_SUGGESTIONS: usize = 3;
const SECONDARY_MAX_TOKENS: usize = 3;

/// One tracked search term for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword: String,
    pub volume: u64,
    pub organic_traffic: u64,
    pub paid_traffic: u64,
    /// 0 means unranked
    pub average_position: f64,
    pub locations_count: u64,
    pub location_name: String,
    pub country: String,
    pub organic_clicks: u64,
    pub paid_clicks: u64,
}

impl KeywordRecord {
    /// Coerce a loosely-typed row. Missing or non-numeric values become 0 or
    /// empty; an empty keyword or a negative number rejects the row.
    pub fn from_row(row: &KeywordRow) -> std::result::Result<Self, RowError> {
        let keyword = row.get(KeywordField::Keyword).unwrap_or_default().trim();
        if keyword.is_empty() {
            return Err(RowError::EmptyKeyword);
        }

        Ok(Self {
            keyword: keyword.to_string(),
            volume: coerce_count(row, KeywordField::Volume)?,
            organic_traffic: coerce_count(row, KeywordField::OrganicTraffic)?,
            paid_traffic: coerce_count(row, KeywordField::PaidTraffic)?,
            average_position: coerce_position(row)?,
            locations_count: coerce_count(row, KeywordField::Locations)?,
            location_name: coerce_text(row, KeywordField::Location),
            country: coerce_text(row, KeywordField::Country),
            organic_clicks: coerce_count(row, KeywordField::OrganicClicks)?,
            paid_clicks: coerce_count(row, KeywordField::PaidClicks)?,
        })
    }

    pub fn is_ranked(&self) -> bool {
        self.average_position > 0.0
    }
}

fn numeric_text(row: &KeywordRow, field: KeywordField) -> String {
    row.get(field).unwrap_or_default().trim().replace(',', "")
}

fn coerce_number(row: &KeywordRow, field: KeywordField) -> std::result::Result<f64, RowError> {
    let text = numeric_text(row, field);
    let value = match text.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return Ok(0.0),
    };
    if value < 0.0 {
        return Err(RowError::NegativeValue {
            field: field.canonical_name(),
            value: text,
        });
    }
    Ok(value)
}

fn coerce_count(row: &KeywordRow, field: KeywordField) -> std::result::Result<u64, RowError> {
    let text = numeric_text(row, field);
    if let Ok(value) = text.parse::<u64>() {
        return Ok(value);
    }
    Ok(coerce_number(row, field)?.trunc() as u64)
}

fn coerce_position(row: &KeywordRow) -> std::result::Result<f64, RowError> {
    coerce_number(row, KeywordField::AveragePosition)
}

fn coerce_text(row: &KeywordRow, field: KeywordField) -> String {
    row.get(field).unwrap_or_default().trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    Volume,
    Traffic,
    Position,
}

impl SortBy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "volume" => Some(SortBy::Volume),
            "traffic" => Some(SortBy::Traffic),
            "position" => Some(SortBy::Position),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_keywords: usize,
    pub total_volume: u64,
    pub total_traffic: u64,
    pub avg_volume: f64,
    pub avg_traffic: f64,
    pub avg_position: f64,
    pub top_10_positions: usize,
    pub page_1_positions: usize,
    pub page_2_positions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighVolumeOpportunity {
    pub keyword: String,
    pub volume: u64,
    pub current_position: f64,
    pub traffic_potential: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowCompetitionKeyword {
    pub keyword: String,
    pub volume: u64,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionImprovementTarget {
    pub keyword: String,
    pub volume: u64,
    pub current_position: f64,
    pub improvement_potential: f64,
}

/// Independent opportunity lenses; a keyword may appear in several.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordGaps {
    pub high_volume_opportunities: Vec<HighVolumeOpportunity>,
    pub low_competition_keywords: Vec<LowCompetitionKeyword>,
    pub position_improvement_targets: Vec<PositionImprovementTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyword {
    pub keyword: String,
    pub volume: u64,
    pub competition_position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedKeyword {
    pub keyword: String,
    pub volume: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSuggestions {
    pub primary_keywords: Vec<PrimaryKeyword>,
    pub secondary_keywords: Vec<SuggestedKeyword>,
    pub long_tail_opportunities: Vec<SuggestedKeyword>,
    /// Not derived from the catalog yet; always exported as an empty list.
    pub content_themes: Vec<String>,
}

/// Projected traffic gain from moving a keyword toward position 1.
pub fn improvement_potential(organic_traffic: u64, average_position: f64) -> f64 {
    (organic_traffic as f64 * (1.0 - average_position / 10.0)).max(0.0)
}

/// Ordered keyword dataset, insertion order = source row order.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    records: Vec<KeywordRecord>,
}

impl KeywordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<KeywordRecord>) -> Self {
        Self { records }
    }

    /// Load a keyword export from disk into a fresh catalog.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.load_csv(path)?;
        Ok(catalog)
    }

    pub fn load_csv(&mut self, path: &Path) -> Result<LoadSummary> {
        let rows = read_keyword_rows(path)?;
        Ok(self.load(rows))
    }

    /// Append rows, skipping (and logging) any row that fails coercion.
    pub fn load(&mut self, rows: impl IntoIterator<Item = KeywordRow>) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for (idx, row) in rows.into_iter().enumerate() {
            match KeywordRecord::from_row(&row) {
                Ok(record) => {
                    self.records.push(record);
                    summary.loaded += 1;
                }
                Err(e) => {
                    warn!("Error processing row {}: {}", idx + 1, e);
                    summary.skipped += 1;
                }
            }
        }
        info!(
            "Loaded {} keywords ({} rows skipped)",
            summary.loaded, summary.skipped
        );
        summary
    }

    pub fn records(&self) -> &[KeywordRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `limit` records by the chosen metric. Volume and traffic sort
    /// descending, position ascending (unranked 0 first). Ties keep
    /// insertion order.
    pub fn top_keywords(&self, limit: usize, sort_by: SortBy) -> Vec<&KeywordRecord> {
        let mut sorted: Vec<&KeywordRecord> = self.records.iter().collect();
        match sort_by {
            SortBy::Volume => sorted.sort_by(|a, b| b.volume.cmp(&a.volume)),
            SortBy::Traffic => sorted.sort_by(|a, b| b.organic_traffic.cmp(&a.organic_traffic)),
            SortBy::Position => {
                sorted.sort_by(|a, b| a.average_position.total_cmp(&b.average_position))
            }
        }
        sorted.truncate(limit);
        sorted
    }

    pub fn summary_stats(&self) -> SummaryStats {
        let total_keywords = self.records.len();
        // Exports can carry absurd values like 1e19; clamp instead of overflowing.
        let total_volume = self
            .records
            .iter()
            .fold(0u64, |acc, k| acc.saturating_add(k.volume));
        let total_traffic = self
            .records
            .iter()
            .fold(0u64, |acc, k| acc.saturating_add(k.organic_traffic));
        let positions: Vec<f64> = self
            .records
            .iter()
            .filter(|k| k.is_ranked())
            .map(|k| k.average_position)
            .collect();

        SummaryStats {
            total_keywords,
            total_volume,
            total_traffic,
            avg_volume: mean(total_volume as f64, total_keywords),
            avg_traffic: mean(total_traffic as f64, total_keywords),
            avg_position: mean(positions.iter().sum(), positions.len()),
            top_10_positions: positions.iter().filter(|p| **p <= 10.0).count(),
            page_1_positions: positions
                .iter()
                .filter(|p| (1.0..=10.0).contains(*p))
                .count(),
            page_2_positions: positions
                .iter()
                .filter(|p| (11.0..=20.0).contains(*p))
                .count(),
        }
    }

    pub fn keyword_gaps(&self) -> KeywordGaps {
        let mut gaps = KeywordGaps::default();
        let (improve_from, improve_to) = IMPROVEMENT_POSITION_RANGE;

        for kw in &self.records {
            if kw.volume > HIGH_VOLUME_MIN && kw.average_position > HIGH_VOLUME_POSITION_ABOVE {
                gaps.high_volume_opportunities.push(HighVolumeOpportunity {
                    keyword: kw.keyword.clone(),
                    volume: kw.volume,
                    current_position: kw.average_position,
                    traffic_potential: kw.organic_traffic,
                });
            }

            if kw.volume > LOW_COMPETITION_VOLUME_MIN
                && kw.average_position > LOW_COMPETITION_POSITION_ABOVE
            {
                gaps.low_competition_keywords.push(LowCompetitionKeyword {
                    keyword: kw.keyword.clone(),
                    volume: kw.volume,
                    position: kw.average_position,
                });
            }

            if (improve_from..=improve_to).contains(&kw.average_position) {
                gaps.position_improvement_targets
                    .push(PositionImprovementTarget {
                        keyword: kw.keyword.clone(),
                        volume: kw.volume,
                        current_position: kw.average_position,
                        improvement_potential: improvement_potential(
                            kw.organic_traffic,
                            kw.average_position,
                        ),
                    });
            }
        }

        gaps
    }

    /// Bucket catalog keywords containing each target (case-insensitive).
    /// Per target, the top matches by volume are split into primary (first
    /// three), secondary (short phrases) and long-tail (the rest).
    pub fn content_suggestions<S: AsRef<str>>(&self, targets: &[S]) -> ContentSuggestions {
        let mut suggestions = ContentSuggestions::default();

        for target in targets {
            let needle = target.as_ref().to_lowercase();
            let mut matches: Vec<&KeywordRecord> = self
                .records
                .iter()
                .filter(|kw| kw.keyword.to_lowercase().contains(&needle))
                .collect();
            matches.sort_by(|a, b| b.volume.cmp(&a.volume));

            for (rank, kw) in matches.into_iter().take(SUGGESTION_MATCH_LIMIT).enumerate() {
                if rank < PRIMARY_SUGGESTIONS {
                    suggestions.primary_keywords.push(PrimaryKeyword {
                        keyword: kw.keyword.clone(),
                        volume: kw.volume,
                        competition_position: kw.average_position,
                    });
                } else if kw.keyword.split_whitespace().count() <= SECONDARY_MAX_TOKENS {
                    suggestions.secondary_keywords.push(SuggestedKeyword {
                        keyword: kw.keyword.clone(),
                        volume: kw.volume,
                    });
                } else {
                    suggestions.long_tail_opportunities.push(SuggestedKeyword {
                        keyword: kw.keyword.clone(),
                        volume: kw.volume,
                    });
                }
            }
        }

        suggestions
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}
