//! truthlens-ranker — Ensemble credibility scoring engine.
//!
//! Converts five qualitative sub-assessments of an article into a single
//! 0–100 credibility score under adjustable module weights. Everything here
//! is pure and synchronous; the same inputs always produce the same outputs.

pub mod scorer;
pub mod weights;
pub mod verdict;

pub use scorer::{
    compute_ensemble_score, compute_ensemble_score_default, compute_module_scores, sample_record,
    AnalysisRecord, ContributionBreakdown, EnsembleScore, ModuleScores,
};
pub use verdict::classify_verdict;
pub use weights::{Module, ModuleWeights, WeightError, DEFAULT_WEIGHTS};
