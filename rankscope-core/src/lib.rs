pub mod comparison;
pub mod error;
pub mod ingest;
pub mod keywords;
pub mod report;

pub use comparison::{ComparisonEngine, ComparisonResult, KeywordInsights, Recommendation};
pub use error::{CoreError, RowError};
pub use keywords::{KeywordCatalog, KeywordRecord, SortBy};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
    ╦═╗╔═╗╔╗╔╦╔═╔═╗╔═╗╔═╗╔═╗╔═╗
    ╠╦╝╠═╣║║║╠╩╗╚═╗║  ║ ║╠═╝║╣
    ╩╚═╩ ╩╝╚╝╩ ╩╚═╝╚═╝╚═╝╩  ╚═╝"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "    {} {}\n",
        "keyword gaps & competitor comparison".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
