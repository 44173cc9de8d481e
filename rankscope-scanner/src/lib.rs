pub mod analyzer;
pub mod error;
pub mod page;

pub use analyzer::{AnalyzeOptions, PageAnalyzer, SiteAnalyzer};
pub use error::ScanError;
pub use page::{PageAnalysis, parse_page};
