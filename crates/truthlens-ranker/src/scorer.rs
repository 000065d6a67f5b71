//! Ensemble credibility score computation.
//!
//! score        = round( Σ(s_k × w_k) / Σ w_k )
//! contribution = round( (s_k × w_k) / Σ(s_j × w_j) × 100 )
//!
//! The score is normalised by the total weight while contributions are
//! shares of the weighted sum. Both divisors fall back to 1 when zero.

use serde::{Deserialize, Serialize};
use truthlens_common::{EnsembleBreakdown, HighlightAnnotation, IssueKind, TruthLensAnalysis, Verdict};

use crate::verdict::classify_verdict;
use crate::weights::{ModuleWeights, DEFAULT_WEIGHTS};

/// Raw, weight-independent module scores, each in [0, 100].
pub type ModuleScores = EnsembleBreakdown;

/// Each module's percentage share of the weighted sum.
pub type ContributionBreakdown = EnsembleBreakdown;

/// The subset of a report that drives scoring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Evidence points supporting the publisher's reputation.
    #[serde(default)]
    pub reputation_checkpoints: Vec<String>,
    /// Independent corroborating references found.
    #[serde(default)]
    pub grounding_source_count: usize,
    /// Issue kind of every flagged passage.
    #[serde(default)]
    pub annotations: Vec<IssueKind>,
    #[serde(default)]
    pub missing_context_items: Vec<String>,
    /// Rhetorical charge, 0–10.
    #[serde(default)]
    pub emotional_intensity: f64,
}

impl From<&TruthLensAnalysis> for AnalysisRecord {
    fn from(analysis: &TruthLensAnalysis) -> Self {
        Self {
            reputation_checkpoints: analysis.creator_reputation_check.check_points.clone(),
            grounding_source_count: analysis.grounding_sources.len(),
            annotations: analysis
                .highlight_annotations
                .iter()
                .map(|a: &HighlightAnnotation| a.issue_type)
                .collect(),
            missing_context_items: analysis.missing_context.clone(),
            emotional_intensity: analysis.meta_analysis.emotional_intensity,
        }
    }
}

/// Result of one ensemble scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleScore {
    /// Final weighted score in [0, 100].
    pub score: u32,
    pub module_scores: ModuleScores,
    pub contribution: ContributionBreakdown,
}

impl EnsembleScore {
    pub fn verdict(&self) -> Verdict {
        classify_verdict(f64::from(self.score))
    }
}

fn clamp_score(value: f64) -> f64 {
    // f64::max/min ignore NaN, so a NaN input lands on 0.
    value.max(0.0).min(100.0)
}

/// Derive the five raw module scores from a record.
pub fn compute_module_scores(record: &AnalysisRecord) -> ModuleScores {
    // 1. Source reputation: sparse evidence is penalised heavily
    let source_penalty = if record.reputation_checkpoints.len() < 2 { 40.0 } else { 10.0 };
    let source = clamp_score(100.0 - source_penalty);

    // 2. Cross-check: plateau once more than two sources corroborate
    let cross_check = if record.grounding_source_count > 2 { 95.0 } else { 60.0 };

    // 3. Logical integrity: 20 points per fallacy
    let fallacies = record
        .annotations
        .iter()
        .filter(|k| **k == IssueKind::LogicalFallacy)
        .count();
    let logic = clamp_score(100.0 - 20.0 * fallacies as f64);

    // 4. Contextual completeness: 15 points per missing item
    let context = clamp_score(100.0 - 15.0 * record.missing_context_items.len() as f64);

    // 5. Rhetorical neutrality: linear in emotional intensity
    let bias = clamp_score(100.0 - 10.0 * record.emotional_intensity);

    ModuleScores { source, cross_check, logic, context, bias }
}

/// Rescale weights whose weighted sum would overflow. Score and contribution
/// are ratios of the weights, so a common factor leaves them unchanged.
fn keep_finite(weights: ModuleWeights, scores: &ModuleScores) -> ModuleWeights {
    let weighted_sum: f64 = scores
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(s, w)| s * w)
        .sum();
    if weights.total().is_finite() && weighted_sum.is_finite() {
        return weights;
    }
    let max = weights.as_array().into_iter().fold(0.0, f64::max);
    ModuleWeights {
        source:      weights.source / max,
        cross_check: weights.cross_check / max,
        logic:       weights.logic / max,
        context:     weights.context / max,
        bias:        weights.bias / max,
    }
}

/// Combine module scores under `weights` into a final score and contribution breakdown.
pub fn compute_ensemble_score(record: &AnalysisRecord, weights: &ModuleWeights) -> EnsembleScore {
    let module_scores = compute_module_scores(record);
    let weights = keep_finite(weights.sanitized(), &module_scores);

    let total_weight = weights.total();
    let safe_total_weight = if total_weight == 0.0 { 1.0 } else { total_weight };
    if total_weight == 0.0 {
        tracing::debug!("all module weights are zero; ensemble score degrades to 0");
    }

    let weighted: Vec<f64> = module_scores
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(s, w)| s * w)
        .collect();
    let weighted_sum: f64 = weighted.iter().sum();

    let raw = weighted_sum / safe_total_weight;
    let score = if raw.is_finite() { raw.round().clamp(0.0, 100.0) as u32 } else { 0 };

    let total_weighted_value = if weighted_sum == 0.0 { 1.0 } else { weighted_sum };
    let share = |value: f64| {
        let pct = ((value / total_weighted_value) * 100.0).round();
        if pct.is_finite() { pct } else { 0.0 }
    };
    let contribution = ContributionBreakdown {
        source:      share(weighted[0]),
        cross_check: share(weighted[1]),
        logic:       share(weighted[2]),
        context:     share(weighted[3]),
        bias:        share(weighted[4]),
    };

    EnsembleScore { score, module_scores, contribution }
}

/// [`compute_ensemble_score`] with [`DEFAULT_WEIGHTS`].
pub fn compute_ensemble_score_default(record: &AnalysisRecord) -> EnsembleScore {
    compute_ensemble_score(record, &DEFAULT_WEIGHTS)
}

/// Simulation record used by the methodology view to demonstrate weighting.
pub fn sample_record() -> AnalysisRecord {
    AnalysisRecord {
        reputation_checkpoints: vec![
            "Registered press outlet".to_string(),
            "No prior correction history".to_string(),
        ],
        grounding_source_count: 3,
        annotations: vec![IssueKind::LogicalFallacy, IssueKind::LogicalFallacy],
        missing_context_items: vec![
            "Missing background".to_string(),
            "Insufficient statistics".to_string(),
        ],
        emotional_intensity: 4.0,
    }
}
