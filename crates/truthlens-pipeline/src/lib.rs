//! truthlens-pipeline — Article analysis orchestration.
//!
//! cache lookup → call pacing → model call → JSON repair → grounding
//! → ensemble scoring → cache store. Also serves the recommended-news feed.

pub mod error;
pub mod cache;
pub mod analyzer;
pub mod news;

pub use analyzer::{finalize_scores, AnalysisFetcher, Analyzer, AnalyzerConfig};
pub use cache::{cache_key, default_ttl, AnalysisCache, TtlCache};
pub use error::PipelineError;
pub use news::{filter_news, NewsFeed};
