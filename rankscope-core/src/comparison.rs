// Competitor vs. own-site comparison and recommendation rules

use crate::keywords::KeywordCatalog;
use rankscope_scanner::{AnalyzeOptions, PageAnalysis, PageAnalyzer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const OPTIMAL_TITLE_CHARS: std::ops::RangeInclusive<usize> = 50..=60;
const SHORT_TITLE_CHARS: usize = 30;
const LONG_TITLE_CHARS: usize = 60;
const WORD_GAP_NOTABLE: i64 = 200;
const WORD_GAP_RECOMMEND: i64 = 300;
const DENSITY_TOP_KEYWORDS: usize = 20;
const OPPORTUNITY_SCALE: f64 = 10.0;
const TECHNICAL_RECOMMENDATION_LIMIT: usize = 3;
const HIGH_PRIORITY_MIN_VOLUME: u64 = 1000;
const HIGH_PRIORITY_POSITION_ABOVE: f64 = 15.0;
const PRIORITY_POSITION_HORIZON: f64 = 30.0;
const QUICK_WIN_POSITIONS: std::ops::RangeInclusive<f64> = 11.0..=20.0;
const QUICK_WIN_MIN_VOLUME: u64 = 500;
const QUICK_WIN_TRAFFIC_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub issue: String,
    pub recommendation: String,
    pub impact: Priority,
}

impl Recommendation {
    fn new(
        category: &str,
        priority: Priority,
        issue: impl Into<String>,
        recommendation: impl Into<String>,
        impact: Priority,
    ) -> Self {
        Self {
            category: category.to_string(),
            priority,
            issue: issue.into(),
            recommendation: recommendation.into(),
            impact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleComparison {
    pub competitor_title: String,
    pub my_title: String,
    pub competitor_title_length: usize,
    pub my_title_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionComparison {
    pub competitor_desc: String,
    pub my_desc: String,
    pub competitor_desc_length: usize,
    pub my_desc_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingsComparison {
    pub competitor_h1_count: usize,
    pub my_h1_count: usize,
    pub competitor_h2_count: usize,
    pub my_h2_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageComparison {
    pub title_comparison: TitleComparison,
    pub meta_description_comparison: DescriptionComparison,
    pub headings_comparison: HeadingsComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCountComparison {
    pub competitor_word_count: u64,
    pub my_word_count: u64,
    /// Positive when the competitor has more content
    pub word_count_gap: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGap {
    pub keyword: String,
    pub competitor_density: f64,
    pub my_density: f64,
    pub gap: f64,
    pub opportunity_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensityComparison {
    pub keyword_gaps: Vec<DensityGap>,
    pub total_gaps: usize,
    pub avg_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentComparison {
    pub word_count_comparison: WordCountComparison,
    pub keyword_density_comparison: KeywordDensityComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningsComparison {
    pub competitor_warnings: usize,
    pub my_warnings: usize,
    pub my_unique_issues: Vec<String>,
    pub competitor_issues_i_dont_have: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageComparison {
    pub competitor_images: usize,
    pub my_images: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkComparison {
    pub competitor_internal_links: usize,
    pub my_internal_links: usize,
    pub competitor_external_links: usize,
    pub my_external_links: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureComparison {
    pub images: ImageComparison,
    pub links: LinkComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalComparison {
    pub warnings_comparison: WarningsComparison,
    pub structure_comparison: StructureComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighPriorityKeyword {
    pub keyword: String,
    pub volume: u64,
    pub current_position: f64,
    pub traffic_potential: u64,
    pub priority_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub keyword: String,
    pub volume: u64,
    pub current_position: f64,
    pub potential_traffic_gain: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordInsights {
    pub high_priority_keywords: Vec<HighPriorityKeyword>,
    pub quick_wins: Vec<QuickWin>,
}

/// Output of one comparison. A failed comparison carries only `error`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComparisonResult {
    #[serde(default)]
    pub page_analysis: Option<PageComparison>,
    #[serde(default)]
    pub content_analysis: Option<ContentComparison>,
    #[serde(default)]
    pub technical_seo: Option<TechnicalComparison>,
    #[serde(default)]
    pub advantages: Vec<String>,
    #[serde(default)]
    pub disadvantages: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub keyword_insights: Option<KeywordInsights>,
    #[serde(default)]
    pub error: Option<String>,
}

// Successful results always export the three lists, even when empty;
// failed ones export `error` alone.
impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(error) = &self.error {
            let mut state = serializer.serialize_struct("ComparisonResult", 1)?;
            state.serialize_field("error", error)?;
            return state.end();
        }

        let mut state = serializer.serialize_struct("ComparisonResult", 7)?;
        match &self.page_analysis {
            Some(page) => state.serialize_field("page_analysis", page)?,
            None => state.skip_field("page_analysis")?,
        }
        match &self.content_analysis {
            Some(content) => state.serialize_field("content_analysis", content)?,
            None => state.skip_field("content_analysis")?,
        }
        match &self.technical_seo {
            Some(technical) => state.serialize_field("technical_seo", technical)?,
            None => state.skip_field("technical_seo")?,
        }
        state.serialize_field("advantages", &self.advantages)?;
        state.serialize_field("disadvantages", &self.disadvantages)?;
        state.serialize_field("recommendations", &self.recommendations)?;
        match &self.keyword_insights {
            Some(insights) => state.serialize_field("keyword_insights", insights)?,
            None => state.skip_field("keyword_insights")?,
        }
        state.end()
    }
}

impl ComparisonResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Comparison result together with the analyses it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteComparison {
    pub competitor_analysis: Option<PageAnalysis>,
    pub my_site_analysis: Option<PageAnalysis>,
    pub result: ComparisonResult,
}

/// Stateless; every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// Options used when fetching both sides of a comparison.
    pub fn analyze_options() -> AnalyzeOptions {
        AnalyzeOptions {
            follow_links: false,
            analyze_headings: true,
            analyze_extra_tags: true,
            ..AnalyzeOptions::default()
        }
    }

    /// Fetch both pages through `analyzer` and compare them. Any fetch
    /// failure yields an error-only result; nothing partial is returned.
    pub async fn analyze_competitor_vs_my_site<A: PageAnalyzer>(
        &self,
        analyzer: &A,
        competitor_url: &str,
        my_url: &str,
        catalog: Option<&KeywordCatalog>,
    ) -> SiteComparison {
        let options = Self::analyze_options();
        info!("Analyzing competitor site: {}", competitor_url);
        info!("Analyzing your site: {}", my_url);

        let (competitor, mine) = tokio::join!(
            analyzer.analyze(competitor_url, &options),
            analyzer.analyze(my_url, &options)
        );

        match (competitor, mine) {
            (Ok(competitor), Ok(mine)) => {
                let result = self.compare(&competitor, &mine, catalog);
                SiteComparison {
                    competitor_analysis: Some(competitor),
                    my_site_analysis: Some(mine),
                    result,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Error in competitor analysis: {}", e);
                SiteComparison {
                    competitor_analysis: None,
                    my_site_analysis: None,
                    result: ComparisonResult::failed(e.to_string()),
                }
            }
        }
    }

    pub fn compare(
        &self,
        competitor: &PageAnalysis,
        mine: &PageAnalysis,
        catalog: Option<&KeywordCatalog>,
    ) -> ComparisonResult {
        let page = compare_pages(competitor, mine);
        let content = compare_content(competitor, mine);
        let technical = compare_technical(competitor, mine);
        let (advantages, disadvantages) = identify_advantages(&page, &content, &technical);
        let recommendations = generate_recommendations(&page, &content, &technical);
        let keyword_insights = catalog.map(keyword_insights);

        info!(
            "Comparison complete: {} advantages, {} disadvantages, {} recommendations",
            advantages.len(),
            disadvantages.len(),
            recommendations.len()
        );

        ComparisonResult {
            page_analysis: Some(page),
            content_analysis: Some(content),
            technical_seo: Some(technical),
            advantages,
            disadvantages,
            recommendations,
            keyword_insights,
            error: None,
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn compare_pages(competitor: &PageAnalysis, mine: &PageAnalysis) -> PageComparison {
    PageComparison {
        title_comparison: TitleComparison {
            competitor_title: competitor.title.clone(),
            my_title: mine.title.clone(),
            competitor_title_length: char_len(&competitor.title),
            my_title_length: char_len(&mine.title),
        },
        meta_description_comparison: DescriptionComparison {
            competitor_desc: competitor.description.clone(),
            my_desc: mine.description.clone(),
            competitor_desc_length: char_len(&competitor.description),
            my_desc_length: char_len(&mine.description),
        },
        headings_comparison: HeadingsComparison {
            competitor_h1_count: competitor.h1.len(),
            my_h1_count: mine.h1.len(),
            competitor_h2_count: competitor.h2.len(),
            my_h2_count: mine.h2.len(),
        },
    }
}

pub fn compare_content(competitor: &PageAnalysis, mine: &PageAnalysis) -> ContentComparison {
    ContentComparison {
        word_count_comparison: WordCountComparison {
            competitor_word_count: competitor.word_count,
            my_word_count: mine.word_count,
            word_count_gap: competitor.word_count as i64 - mine.word_count as i64,
        },
        keyword_density_comparison: compare_keyword_density(competitor, mine),
    }
}

/// Keywords among the competitor's top 20 by density where the competitor
/// leads, largest gap first.
pub fn compare_keyword_density(
    competitor: &PageAnalysis,
    mine: &PageAnalysis,
) -> KeywordDensityComparison {
    let mut competitor_top: Vec<(&String, f64)> = competitor
        .keyword_densities
        .iter()
        .map(|(keyword, density)| (keyword, *density))
        .collect();
    competitor_top.sort_by(|a, b| b.1.total_cmp(&a.1));
    competitor_top.truncate(DENSITY_TOP_KEYWORDS);

    let mut keyword_gaps: Vec<DensityGap> = competitor_top
        .into_iter()
        .filter_map(|(keyword, competitor_density)| {
            let my_density = mine.keyword_densities.get(keyword).copied().unwrap_or(0.0);
            let gap = competitor_density - my_density;
            (gap > 0.0).then(|| DensityGap {
                keyword: keyword.clone(),
                competitor_density,
                my_density,
                gap,
                opportunity_score: gap * OPPORTUNITY_SCALE,
            })
        })
        .collect();
    keyword_gaps.sort_by(|a, b| b.gap.total_cmp(&a.gap));

    let total_gaps = keyword_gaps.len();
    let avg_gap = if total_gaps == 0 {
        0.0
    } else {
        keyword_gaps.iter().map(|g| g.gap).sum::<f64>() / total_gaps as f64
    };

    KeywordDensityComparison {
        keyword_gaps,
        total_gaps,
        avg_gap,
    }
}

pub fn compare_technical(competitor: &PageAnalysis, mine: &PageAnalysis) -> TechnicalComparison {
    TechnicalComparison {
        warnings_comparison: WarningsComparison {
            competitor_warnings: competitor.warnings.len(),
            my_warnings: mine.warnings.len(),
            my_unique_issues: mine
                .warnings
                .iter()
                .filter(|w| !competitor.warnings.contains(w))
                .cloned()
                .collect(),
            competitor_issues_i_dont_have: competitor
                .warnings
                .iter()
                .filter(|w| !mine.warnings.contains(w))
                .cloned()
                .collect(),
        },
        structure_comparison: StructureComparison {
            images: ImageComparison {
                competitor_images: competitor.images_without_alt.len(),
                my_images: mine.images_without_alt.len(),
            },
            links: LinkComparison {
                competitor_internal_links: competitor.internal_links.len(),
                my_internal_links: mine.internal_links.len(),
                competitor_external_links: competitor.external_links.len(),
                my_external_links: mine.external_links.len(),
            },
        },
    }
}

pub fn identify_advantages(
    page: &PageComparison,
    content: &ContentComparison,
    technical: &TechnicalComparison,
) -> (Vec<String>, Vec<String>) {
    let mut advantages = Vec::new();
    let mut disadvantages = Vec::new();

    let mine_optimal = OPTIMAL_TITLE_CHARS.contains(&page.title_comparison.my_title_length);
    let competitor_optimal =
        OPTIMAL_TITLE_CHARS.contains(&page.title_comparison.competitor_title_length);
    if mine_optimal && !competitor_optimal {
        advantages.push("Your title length is optimally sized (50-60 chars)".to_string());
    } else if competitor_optimal && !mine_optimal {
        disadvantages.push("Competitor has better title length optimization".to_string());
    }

    let word_gap = content.word_count_comparison.word_count_gap;
    if word_gap < -WORD_GAP_NOTABLE {
        advantages.push("Your content is more comprehensive (longer word count)".to_string());
    } else if word_gap > WORD_GAP_NOTABLE {
        disadvantages.push("Competitor has more comprehensive content".to_string());
    }

    let warnings = &technical.warnings_comparison;
    if warnings.my_warnings < warnings.competitor_warnings {
        advantages.push("You have fewer technical SEO issues".to_string());
    } else if warnings.my_warnings > warnings.competitor_warnings {
        disadvantages.push("You have more technical SEO issues than competitor".to_string());
    }

    (advantages, disadvantages)
}

/// Recommendations in rule order: title, content depth, keyword density,
/// then up to three technical issues only present on the caller's page.
pub fn generate_recommendations(
    page: &PageComparison,
    content: &ContentComparison,
    technical: &TechnicalComparison,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let my_title_len = page.title_comparison.my_title_length;
    if my_title_len < SHORT_TITLE_CHARS {
        recommendations.push(Recommendation::new(
            "Title Optimization",
            Priority::High,
            "Title is too short",
            "Expand your title to 50-60 characters to improve click-through rates",
            Priority::High,
        ));
    } else if my_title_len > LONG_TITLE_CHARS {
        recommendations.push(Recommendation::new(
            "Title Optimization",
            Priority::High,
            "Title is too long",
            "Shorten your title to under 60 characters to prevent truncation",
            Priority::High,
        ));
    }

    let word_gap = content.word_count_comparison.word_count_gap;
    if word_gap > WORD_GAP_RECOMMEND {
        recommendations.push(Recommendation::new(
            "Content Depth",
            Priority::Medium,
            "Content is less comprehensive than competitor",
            format!("Add approximately {} more words of valuable content", word_gap),
            Priority::Medium,
        ));
    }

    if let Some(top_gap) = content.keyword_density_comparison.keyword_gaps.first() {
        recommendations.push(Recommendation::new(
            "Keyword Optimization",
            Priority::Medium,
            format!("Low density for important keyword: {}", top_gap.keyword),
            format!(
                "Increase mentions of \"{}\" by {} occurrences",
                top_gap.keyword,
                top_gap.gap.trunc() as i64
            ),
            Priority::Medium,
        ));
    }

    for issue in technical
        .warnings_comparison
        .my_unique_issues
        .iter()
        .take(TECHNICAL_RECOMMENDATION_LIMIT)
    {
        recommendations.push(Recommendation::new(
            "Technical SEO",
            Priority::High,
            issue.clone(),
            "Fix this technical issue to improve SEO performance",
            Priority::High,
        ));
    }

    recommendations
}

/// Catalog-only insights; independent of either page analysis.
pub fn keyword_insights(catalog: &KeywordCatalog) -> KeywordInsights {
    let mut high_priority_keywords: Vec<HighPriorityKeyword> = catalog
        .records()
        .iter()
        .filter(|kw| {
            kw.volume > HIGH_PRIORITY_MIN_VOLUME
                && kw.average_position > HIGH_PRIORITY_POSITION_ABOVE
        })
        .map(|kw| HighPriorityKeyword {
            keyword: kw.keyword.clone(),
            volume: kw.volume,
            current_position: kw.average_position,
            traffic_potential: kw.organic_traffic,
            priority_score: kw.volume as f64 * (PRIORITY_POSITION_HORIZON - kw.average_position)
                / PRIORITY_POSITION_HORIZON,
        })
        .collect();
    high_priority_keywords.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));

    let mut quick_wins: Vec<QuickWin> = catalog
        .records()
        .iter()
        .filter(|kw| {
            QUICK_WIN_POSITIONS.contains(&kw.average_position) && kw.volume > QUICK_WIN_MIN_VOLUME
        })
        .map(|kw| QuickWin {
            keyword: kw.keyword.clone(),
            volume: kw.volume,
            current_position: kw.average_position,
            potential_traffic_gain: kw
                .organic_traffic
                .saturating_mul(QUICK_WIN_TRAFFIC_MULTIPLIER),
        })
        .collect();
    quick_wins.sort_by(|a, b| b.potential_traffic_gain.cmp(&a.potential_traffic_gain));

    KeywordInsights {
        high_priority_keywords,
        quick_wins,
    }
}
