use crate::CLAP_STYLING;
use clap::{arg, command};

fn format_arg() -> clap::Arg {
    arg!(-f --"format" <FORMAT>)
        .required(false)
        .help("Report format: text, json")
        .value_parser(["text", "json"])
        .default_value("text")
}

fn output_arg() -> clap::Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("Save report to file (default: display to screen)")
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Request timeout in seconds")
        .value_parser(clap::value_parser!(u64))
        .default_value("30")
}

fn csv_arg() -> clap::Arg {
    arg!(<CSV>).help("Path to a keyword export in CSV format")
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("rankscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("rankscope")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("keywords")
                .about("Rank keywords from an export and summarize ranking opportunities")
                .arg(csv_arg())
                .arg(
                    arg!(-n --"top" <N>)
                        .required(false)
                        .help("Number of top keywords to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"sort" <METRIC>)
                        .required(false)
                        .help("Ranking metric: volume, traffic, position")
                        .value_parser(["volume", "traffic", "position"])
                        .default_value("volume"),
                )
                .arg(output_arg())
                .arg(format_arg()),
        )
        .subcommand(
            command!("gaps")
                .about("Classify keywords into high-volume, low-competition and improvement buckets")
                .arg(csv_arg())
                .arg(output_arg())
                .arg(format_arg()),
        )
        .subcommand(
            command!("suggest")
                .about("Suggest primary, secondary and long-tail keywords for target topics")
                .arg(csv_arg())
                .arg(
                    arg!(-k --"keyword" <TARGET>)
                        .required(true)
                        .help("Target keyword to build suggestions around (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(output_arg())
                .arg(format_arg()),
        )
        .subcommand(
            command!("compare")
                .about(
                    "Compare a competitor page against your own and generate SEO \
                recommendations",
                )
                .arg(arg!(<COMPETITOR_URL>).help("The competitor page to analyze"))
                .arg(arg!(<MY_URL>).help("Your page to analyze"))
                .arg(
                    arg!(--"csv" <PATH>)
                        .required(false)
                        .help("Keyword export used to add keyword insights"),
                )
                .arg(output_arg())
                .arg(format_arg())
                .arg(timeout_arg()),
        )
        .subcommand(
            command!("analyze")
                .about("Analyze a single page or site for on-page SEO signals")
                .arg(arg!(<URL>).help("The page to analyze"))
                .arg(
                    arg!(--"sitemap" <PATH>)
                        .required(false)
                        .help("Sitemap (local path or URL) listing additional pages to analyze"),
                )
                .arg(
                    arg!(--"follow-links")
                        .required(false)
                        .help("Also analyze same-host pages linked from the start page")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"analyze-headings")
                        .required(false)
                        .help("Collect H1/H2 headings")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"analyze-extra-tags")
                        .required(false)
                        .help("Collect Open Graph, Twitter card and canonical tags")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-pages" <N>)
                        .required(false)
                        .help("Maximum pages to analyze, start page included")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(output_arg())
                .arg(format_arg())
                .arg(timeout_arg()),
        )
}
