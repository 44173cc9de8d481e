use crate::analyzer::AnalyzeOptions;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

const TITLE_MAX_CHARS: usize = 70;
const TITLE_MIN_CHARS: usize = 10;
const DESCRIPTION_MAX_CHARS: usize = 255;
const DESCRIPTION_MIN_CHARS: usize = 140;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// On-page SEO facts extracted from a single page (or a seed page with its
/// followed pages folded in).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub url: String,
    pub status_code: u16,
    pub title: String,
    pub description: String,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub word_count: u64,
    /// Occurrence count per keyword (unigrams and bigrams, stop words removed).
    pub keyword_densities: BTreeMap<String, f64>,
    pub warnings: Vec<String>,
    pub images_without_alt: Vec<String>,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_tags: BTreeMap<String, String>,
    pub pages_analyzed: usize,
}

impl PageAnalysis {
    pub fn new(url: String) -> Self {
        Self {
            url,
            pages_analyzed: 1,
            ..Default::default()
        }
    }

    /// Fold a followed page into this record. Only content totals and
    /// warnings are merged; page-level facts stay those of the seed page.
    pub fn absorb(&mut self, other: PageAnalysis) {
        self.word_count += other.word_count;
        for (keyword, count) in other.keyword_densities {
            *self.keyword_densities.entry(keyword).or_insert(0.0) += count;
        }
        self.warnings.extend(other.warnings);
        self.pages_analyzed += other.pages_analyzed;
    }

    /// Same-host links, used as the follow set when crawling.
    pub fn followable_links(&self) -> impl Iterator<Item = &String> {
        self.internal_links.iter()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Parse an HTML document into a [`PageAnalysis`]. Pure: performs no I/O.
pub fn parse_page(html: &str, url: &str, options: &AnalyzeOptions) -> PageAnalysis {
    let document = Html::parse_document(html);
    let mut page = PageAnalysis::new(url.to_string());

    page.title = document
        .select(&selector("title"))
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    page.description = document
        .select(&selector("meta[name]"))
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .unwrap_or_default();

    if options.analyze_headings {
        page.h1 = heading_texts(&document, "h1");
        page.h2 = heading_texts(&document, "h2");
    }

    let text = visible_text(&document);
    let tokens = tokenize(&text);
    page.word_count = tokens.len() as u64;
    page.keyword_densities = count_keywords(&tokens);

    for img in document.select(&selector("img")) {
        let has_alt = img
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty());
        if !has_alt {
            page.images_without_alt
                .push(img.value().attr("src").unwrap_or_default().to_string());
        }
    }

    let base = Url::parse(url).ok();
    let mut anchors_without_title = Vec::new();
    for anchor in document.select(&selector("a[href]")) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = base.as_ref().and_then(|b| resolve_link(b, href)) else {
            continue;
        };

        if anchor
            .value()
            .attr("title")
            .is_none_or(|title| title.trim().is_empty())
        {
            anchors_without_title.push(href.to_string());
        }

        let same_host = base
            .as_ref()
            .and_then(|b| b.host_str())
            .zip(resolved.host_str())
            .is_some_and(|(a, b)| a.eq_ignore_ascii_case(b));

        if same_host {
            page.internal_links.push(resolved.to_string());
        } else {
            page.external_links.push(resolved.to_string());
        }
    }

    if options.analyze_extra_tags {
        page.extra_tags = extra_tags(&document);
    }

    page.warnings = page_warnings(&page, &anchors_without_title, options);
    debug!(
        url,
        word_count = page.word_count,
        warnings = page.warnings.len(),
        "Parsed page"
    );
    page
}

fn heading_texts(document: &Html, tag: &str) -> Vec<String> {
    document
        .select(&selector(tag))
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

fn visible_text(document: &Html) -> String {
    let body_selector = selector("body");
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ElementRef::wrap(ancestor).is_some_and(|el| {
                matches!(el.value().name(), "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|token| token.trim_matches('\''))
        .filter(|token| token.chars().any(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

fn is_keyword_token(token: &str) -> bool {
    token.chars().count() > 1 && !STOP_WORDS.contains(&token)
}

fn count_keywords(tokens: &[String]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in tokens.iter().filter(|t| is_keyword_token(t)) {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    for pair in tokens.windows(2) {
        if is_keyword_token(&pair[0]) && is_keyword_token(&pair[1]) {
            *counts
                .entry(format!("{} {}", pair[0], pair[1]))
                .or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

fn extra_tags(document: &Html) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for meta in document.select(&selector("meta")) {
        let key = meta
            .value()
            .attr("property")
            .or_else(|| meta.value().attr("name"))
            .map(str::to_lowercase);
        if let Some(key) = key
            && (key.starts_with("og:") || key.starts_with("twitter:"))
            && let Some(content) = meta.value().attr("content")
        {
            tags.entry(key).or_insert_with(|| content.trim().to_string());
        }
    }
    for link in document.select(&selector("link[rel][href]")) {
        let is_canonical = link
            .value()
            .attr("rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("canonical"));
        if is_canonical && let Some(href) = link.value().attr("href") {
            tags.entry("canonical".to_string())
                .or_insert_with(|| href.trim().to_string());
        }
    }
    tags
}

fn page_warnings(
    page: &PageAnalysis,
    anchors_without_title: &[String],
    options: &AnalyzeOptions,
) -> Vec<String> {
    let mut warnings = Vec::new();

    let title_len = page.title.chars().count();
    if title_len == 0 {
        warnings.push("Missing title tag".to_string());
    } else if title_len > TITLE_MAX_CHARS {
        warnings.push(format!(
            "Title tag is too long (> {} characters): {}",
            TITLE_MAX_CHARS, page.title
        ));
    } else if title_len < TITLE_MIN_CHARS {
        warnings.push(format!(
            "Title tag is too short (< {} characters): {}",
            TITLE_MIN_CHARS, page.title
        ));
    }

    let desc_len = page.description.chars().count();
    if desc_len == 0 {
        warnings.push("Missing description".to_string());
    } else if desc_len > DESCRIPTION_MAX_CHARS {
        warnings.push(format!(
            "Description is too long (> {} characters): {}",
            DESCRIPTION_MAX_CHARS, page.description
        ));
    } else if desc_len < DESCRIPTION_MIN_CHARS {
        warnings.push(format!(
            "Description is too short (< {} characters): {}",
            DESCRIPTION_MIN_CHARS, page.description
        ));
    }

    for src in &page.images_without_alt {
        warnings.push(format!("Image missing alt tag: {}", src));
    }

    for href in anchors_without_title {
        warnings.push(format!("Anchor missing title tag: {}", href));
    }

    if options.analyze_headings && page.h1.is_empty() {
        warnings.push("Each page should have at least one h1 tag".to_string());
    }

    if options.analyze_extra_tags {
        for tag in ["og:title", "og:description"] {
            if !page.extra_tags.contains_key(tag) {
                warnings.push(format!("Missing {} tag", tag));
            }
        }
    }

    warnings
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
