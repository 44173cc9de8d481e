use crate::error::{Result, ScanError};
use crate::page::{PageAnalysis, parse_page};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Knobs forwarded to the analyzer. The comparison engine never interprets
/// these; it only consumes the resulting record.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub follow_links: bool,
    pub analyze_headings: bool,
    pub analyze_extra_tags: bool,
    /// Local path or http(s) URL of a sitemap.xml
    pub sitemap: Option<String>,
    /// Upper bound on pages fetched per analysis, seed page included
    pub max_pages: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            analyze_headings: false,
            analyze_extra_tags: false,
            sitemap: None,
            max_pages: 10,
        }
    }
}

/// Source of [`PageAnalysis`] records.
pub trait PageAnalyzer {
    fn analyze(
        &self,
        url: &str,
        options: &AnalyzeOptions,
    ) -> impl Future<Output = Result<PageAnalysis>> + Send;
}

pub struct SiteAnalyzer {
    client: Client,
    workers: usize,
}

impl SiteAnalyzer {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "Rankscope/",
                env!("CARGO_PKG_VERSION"),
                " (+https://github.com/rankscope/rankscope)"
            ))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, workers: 4 })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    async fn fetch_html(&self, url: &str) -> Result<(u16, String)> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScanError::UnexpectedResponse {
                url: url.to_string(),
                reason: format!("HTTP status {}", status.as_u16()),
            });
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("text/html") || ct.contains("application/xhtml"));
        if !is_html {
            return Err(ScanError::UnexpectedResponse {
                url: url.to_string(),
                reason: "response is not HTML".to_string(),
            });
        }

        Ok((status.as_u16(), response.text().await?))
    }

    async fn analyze_single(&self, url: &str, options: &AnalyzeOptions) -> Result<PageAnalysis> {
        let (status_code, body) = self.fetch_html(url).await?;
        let mut page = parse_page(&body, url, options);
        page.status_code = status_code;
        Ok(page)
    }

    async fn load_sitemap(&self, location: &str) -> Result<Vec<String>> {
        let content = if location.starts_with("http://") || location.starts_with("https://") {
            let response = self.client.get(location).send().await?;
            if !response.status().is_success() {
                return Err(ScanError::SitemapError(format!(
                    "{} returned HTTP status {}",
                    location,
                    response.status().as_u16()
                )));
            }
            response.text().await?
        } else {
            tokio::fs::read_to_string(location).await?
        };

        let urls = sitemap_locations(&content);
        info!("Loaded {} URLs from sitemap {}", urls.len(), location);
        Ok(urls)
    }

    async fn analyze_site(
        &self,
        start_url: &str,
        options: &AnalyzeOptions,
    ) -> Result<PageAnalysis> {
        let start = Instant::now();
        let mut seed = self.analyze_single(start_url, options).await?;

        let mut candidates: Vec<String> = Vec::new();
        if let Some(ref sitemap) = options.sitemap {
            candidates.extend(self.load_sitemap(sitemap).await?);
        }
        if options.follow_links {
            candidates.extend(seed.followable_links().cloned());
        }

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(start_url.trim_end_matches('/').to_string());
        let follow: Vec<String> = candidates
            .into_iter()
            .filter(|url| seen.insert(url.trim_end_matches('/').to_string()))
            .take(options.max_pages.saturating_sub(1))
            .collect();

        info!(
            "Analyzing {} additional pages for {} with {} workers",
            follow.len(),
            start_url,
            self.workers
        );

        let pages: Vec<(String, Result<PageAnalysis>)> = stream::iter(follow)
            .map(|url| async move {
                let result = self.analyze_single(&url, options).await;
                (url, result)
            })
            .buffered(self.workers)
            .collect()
            .await;

        for (url, result) in pages {
            match result {
                Ok(page) => seed.absorb(page),
                Err(e) => warn!("Skipping {}: {}", url, e),
            }
        }

        info!(
            "Analysis of {} complete: {} pages in {}ms",
            start_url,
            seed.pages_analyzed,
            start.elapsed().as_millis()
        );
        Ok(seed)
    }
}

impl PageAnalyzer for SiteAnalyzer {
    async fn analyze(&self, url: &str, options: &AnalyzeOptions) -> Result<PageAnalysis> {
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        if options.follow_links || options.sitemap.is_some() {
            self.analyze_site(url, options).await
        } else {
            info!("Analyzing {}", url);
            self.analyze_single(url, options).await
        }
    }
}

/// Extract `<loc>` entries from a sitemap document.
pub fn sitemap_locations(xml: &str) -> Vec<String> {
    let document = Html::parse_document(xml);
    let loc_selector = Selector::parse("loc").unwrap();
    document
        .select(&loc_selector)
        .map(|loc| loc.text().collect::<String>().trim().to_string())
        .filter(|loc| Url::parse(loc).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn html_response(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html; charset=utf-8")
            .set_body_bytes(body.as_bytes().to_vec())
    }

    #[test]
    fn test_sitemap_locations() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>https://example.com/</loc></url>
                <url><loc> https://example.com/blog </loc></url>
                <url><loc>not a url</loc></url>
            </urlset>"#;
        assert_eq!(
            sitemap_locations(xml),
            vec!["https://example.com/", "https://example.com/blog"]
        );
    }

    #[tokio::test]
    async fn test_analyze_single_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_response(
                "<html><head><title>Widgets and gadgets store</title></head>\
                 <body><h1>Widgets</h1><p>widgets widgets gadgets</p></body></html>",
            ))
            .mount(&mock_server)
            .await;

        let analyzer = SiteAnalyzer::new().unwrap();
        let options = AnalyzeOptions {
            analyze_headings: true,
            ..AnalyzeOptions::default()
        };
        let page = analyzer
            .analyze(&format!("{}/", mock_server.uri()), &options)
            .await
            .unwrap();

        assert_eq!(page.status_code, 200);
        assert_eq!(page.title, "Widgets and gadgets store");
        assert_eq!(page.h1, vec!["Widgets"]);
        assert_eq!(page.keyword_densities.get("widgets"), Some(&3.0));
        assert_eq!(page.pages_analyzed, 1);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let analyzer = SiteAnalyzer::new().unwrap();
        let result = analyzer
            .analyze(
                &format!("{}/missing", mock_server.uri()),
                &AnalyzeOptions::default(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ScanError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_html_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(b"{}".to_vec()),
            )
            .mount(&mock_server)
            .await;

        let analyzer = SiteAnalyzer::new().unwrap();
        let result = analyzer
            .analyze(
                &format!("{}/data.json", mock_server.uri()),
                &AnalyzeOptions::default(),
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let analyzer = SiteAnalyzer::new().unwrap();
        let result = analyzer
            .analyze("not a url", &AnalyzeOptions::default())
            .await;
        assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_follow_links_folds_internal_pages() {
        let mock_server = MockServer::start().await;
        let root_html = format!(
            r#"<html><body><p>alpha</p>
                <a href="{0}/one">One</a>
                <a href="{0}/two">Two</a>
                <a href="{0}/broken">Broken</a>
            </body></html>"#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_response(&root_html))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/one"))
            .respond_with(html_response("<html><body><p>alpha beta</p></body></html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/two"))
            .respond_with(html_response("<html><body><p>alpha gamma</p></body></html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let analyzer = SiteAnalyzer::new().unwrap().with_workers(2);
        let options = AnalyzeOptions {
            follow_links: true,
            ..AnalyzeOptions::default()
        };
        let page = analyzer
            .analyze(&format!("{}/", mock_server.uri()), &options)
            .await
            .unwrap();

        assert_eq!(page.pages_analyzed, 3);
        assert_eq!(page.keyword_densities.get("alpha"), Some(&3.0));
        assert_eq!(page.keyword_densities.get("gamma"), Some(&1.0));
        assert_eq!(page.internal_links.len(), 3);
    }

    #[tokio::test]
    async fn test_max_pages_bounds_follow() {
        let mock_server = MockServer::start().await;
        let mut root_html = String::from("<html><body>");
        for i in 1..=5 {
            root_html.push_str(&format!(r#"<a href="{}/p{}">P</a>"#, mock_server.uri(), i));
        }
        root_html.push_str("</body></html>");

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_response(&root_html))
            .mount(&mock_server)
            .await;
        for i in 1..=5 {
            Mock::given(method("GET"))
                .and(path(format!("/p{}", i)))
                .respond_with(html_response("<html><body>page</body></html>"))
                .mount(&mock_server)
                .await;
        }

        let analyzer = SiteAnalyzer::new().unwrap();
        let options = AnalyzeOptions {
            follow_links: true,
            max_pages: 3,
            ..AnalyzeOptions::default()
        };
        let page = analyzer
            .analyze(&format!("{}/", mock_server.uri()), &options)
            .await
            .unwrap();

        assert_eq!(page.pages_analyzed, 3);
    }

    #[tokio::test]
    async fn test_sitemap_from_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html_response("<html><body>home</body></html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(html_response("<html><body>about company</body></html>"))
            .mount(&mock_server)
            .await;

        let mut sitemap = tempfile::NamedTempFile::new().unwrap();
        write!(
            sitemap,
            "<urlset><url><loc>{0}/about</loc></url></urlset>",
            mock_server.uri()
        )
        .unwrap();

        let analyzer = SiteAnalyzer::new().unwrap();
        let options = AnalyzeOptions {
            sitemap: Some(sitemap.path().display().to_string()),
            ..AnalyzeOptions::default()
        };
        let page = analyzer
            .analyze(&format!("{}/", mock_server.uri()), &options)
            .await
            .unwrap();

        assert_eq!(page.pages_analyzed, 2);
        assert!(page.keyword_densities.contains_key("company"));
    }
}
