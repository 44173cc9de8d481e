use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rankscope_core::comparison::SiteComparison;
use rankscope_core::report::{
    ComparisonReport, KeywordReport, ReportFormat, export_json, generate_analysis_text_report,
    generate_comparison_text_report, generate_keyword_text_report,
    generate_suggestions_text_report, render_gaps, save_report, to_json,
};
use rankscope_core::{ComparisonEngine, KeywordCatalog, SortBy};
use rankscope_scanner::{AnalyzeOptions, PageAnalyzer, SiteAnalyzer};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, warn};
use url::Url;

/// Install the fmt subscriber. Debug output only with `--verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse a URL argument, adding https:// when no scheme is given.
pub fn normalize_url(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(input.to_string());
    }

    let with_scheme = format!("https://{}", input);
    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some_and(|h| h.contains('.') || h == "localhost") => {
            Some(with_scheme)
        }
        _ => None,
    }
}

/// Tilde-expand a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub fn load_catalog(path: &str) -> Result<KeywordCatalog> {
    let path = expand_path(path);
    let mut catalog = KeywordCatalog::new();
    let summary = catalog
        .load_csv(&path)
        .with_context(|| format!("Could not load keywords from {}", path.display()))?;

    if summary.skipped > 0 {
        eprintln!(
            "{} Skipped {} malformed rows in {}",
            "⚠".yellow().bold(),
            summary.skipped,
            path.display()
        );
    }
    Ok(catalog)
}

fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Print `content`, or write it to `--output` when given.
pub fn emit(content: &str, output: Option<&String>) -> Result<()> {
    match output {
        Some(path) => {
            let path = expand_path(path);
            save_report(content, &path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn spinner(quiet: bool, message: String) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}

fn required_url(args: &ArgMatches, id: &str) -> Result<String> {
    let raw = args
        .get_one::<String>(id)
        .with_context(|| format!("{} is required", id))?;
    match normalize_url(raw) {
        Some(url) => Ok(url),
        None => bail!("Invalid URL '{}'", raw),
    }
}

pub fn handle_keywords(args: &ArgMatches) -> Result<()> {
    let csv = args.get_one::<String>("CSV").context("CSV is required")?;
    let limit = *args.get_one::<usize>("top").unwrap_or(&20);
    let sort_by = args
        .get_one::<String>("sort")
        .and_then(|s| SortBy::from_str(s))
        .unwrap_or(SortBy::Volume);

    let catalog = load_catalog(csv)?;
    let report = KeywordReport::new(&catalog, limit, sort_by);

    let content = match report_format(args) {
        ReportFormat::Text => generate_keyword_text_report(&report),
        ReportFormat::Json => to_json(&report)?,
    };
    emit(&content, args.get_one::<String>("output"))
}

pub fn handle_gaps(args: &ArgMatches) -> Result<()> {
    let csv = args.get_one::<String>("CSV").context("CSV is required")?;
    let catalog = load_catalog(csv)?;
    let gaps = catalog.keyword_gaps();

    let content = match report_format(args) {
        ReportFormat::Text => render_gaps(&gaps),
        ReportFormat::Json => to_json(&gaps)?,
    };
    emit(&content, args.get_one::<String>("output"))
}

pub fn handle_suggest(args: &ArgMatches) -> Result<()> {
    let csv = args.get_one::<String>("CSV").context("CSV is required")?;
    let targets: Vec<String> = args
        .get_many::<String>("keyword")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if targets.is_empty() {
        bail!("At least one --keyword is required");
    }

    let catalog = load_catalog(csv)?;
    let suggestions = catalog.content_suggestions(targets.as_slice());

    let content = match report_format(args) {
        ReportFormat::Text => generate_suggestions_text_report(&targets, &suggestions),
        ReportFormat::Json => to_json(&suggestions)?,
    };
    emit(&content, args.get_one::<String>("output"))
}

pub async fn handle_compare(args: &ArgMatches, quiet: bool) -> Result<()> {
    let competitor_url = required_url(args, "COMPETITOR_URL")?;
    let my_url = required_url(args, "MY_URL")?;
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&30);

    // A broken keyword export only costs the keyword insights.
    let catalog = match args.get_one::<String>("csv") {
        Some(csv) => match load_catalog(csv) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("Keyword analysis failed: {:#}", e);
                eprintln!(
                    "{} Keyword analysis failed, continuing without it: {:#}",
                    "⚠".yellow().bold(),
                    e
                );
                None
            }
        },
        None => None,
    };

    let analyzer = SiteAnalyzer::with_timeout(timeout)?;
    let progress = spinner(
        quiet,
        format!("Comparing {} against {}", competitor_url, my_url),
    )?;
    let comparison: SiteComparison = ComparisonEngine::new()
        .analyze_competitor_vs_my_site(&analyzer, &competitor_url, &my_url, catalog.as_ref())
        .await;
    progress.finish_and_clear();

    let failure = comparison.result.error.clone();
    let report = ComparisonReport::new(&competitor_url, &my_url, comparison);

    let format = report_format(args);
    match (args.get_one::<String>("output"), format) {
        (Some(path), ReportFormat::Json) => {
            let path = expand_path(path);
            export_json(&report, &path)?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        (output, ReportFormat::Json) => emit(&to_json(&report)?, output)?,
        (output, ReportFormat::Text) => emit(&generate_comparison_text_report(&report), output)?,
    }

    if let Some(error) = failure {
        bail!("Comparison failed: {}", error);
    }
    Ok(())
}

pub async fn handle_analyze(args: &ArgMatches, quiet: bool) -> Result<()> {
    let url = required_url(args, "URL")?;
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&30);
    let options = AnalyzeOptions {
        follow_links: args.get_flag("follow-links"),
        analyze_headings: args.get_flag("analyze-headings"),
        analyze_extra_tags: args.get_flag("analyze-extra-tags"),
        sitemap: args.get_one::<String>("sitemap").map(|s| {
            if s.starts_with("http://") || s.starts_with("https://") {
                s.clone()
            } else {
                expand_path(s).display().to_string()
            }
        }),
        max_pages: *args.get_one::<usize>("max-pages").unwrap_or(&10),
    };

    let analyzer = SiteAnalyzer::with_timeout(timeout)?;
    let progress = spinner(quiet, format!("Analyzing {}", url))?;
    let result = analyzer.analyze(&url, &options).await;
    progress.finish_and_clear();
    let analysis = result.with_context(|| format!("Analysis of {} failed", url))?;

    let content = match report_format(args) {
        ReportFormat::Text => generate_analysis_text_report(&analysis),
        ReportFormat::Json => to_json(&analysis)?,
    };
    emit(&content, args.get_one::<String>("output"))
}
