//! truthlens-common — Shared report types and errors used across all TruthLens crates.

pub mod error;
pub mod analysis;
pub mod input;

// Re-export commonly used types
pub use analysis::{
    CreatorReputationCheck, EnsembleBreakdown, GroundingSource, HighlightAnnotation, IssueKind,
    MetaAnalysis, PoliticalLeaning, TruthLensAnalysis, Verdict,
};
pub use error::TruthLensError;
pub use input::{InputData, InputKind, Language, NewsCategory, NewsItem};
