//! Structured credibility report as returned by the analysis model.
//!
//! Field names follow the JSON schema the model is constrained to, so these
//! types deserialize the model output directly.

use serde::{Deserialize, Serialize};

// ── Verdict ──────────────────────────────────────────────────────────────────

/// Four-tier label derived from the final credibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Trustworthy,
    Caution,
    Misleading,
    Propaganda,
    /// Whatever the model wrote before the score was recomputed.
    #[serde(other)]
    Unclassified,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Trustworthy  => "Trustworthy",
            Verdict::Caution      => "Caution",
            Verdict::Misleading   => "Misleading",
            Verdict::Propaganda   => "Propaganda",
            Verdict::Unclassified => "Unclassified",
        }
    }

    /// Inclusive score band covered by this verdict.
    pub fn score_range(&self) -> &'static str {
        match self {
            Verdict::Trustworthy  => "88-100",
            Verdict::Caution      => "65-87",
            Verdict::Misleading   => "40-64",
            Verdict::Propaganda   => "0-39",
            Verdict::Unclassified => "-",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Trustworthy  => "Claims are corroborated and the reporting is balanced.",
            Verdict::Caution      => "Broadly accurate but with gaps in context or sourcing.",
            Verdict::Misleading   => "Significant distortion, omissions or faulty reasoning.",
            Verdict::Propaganda   => "Systematic distortion or unverifiable content.",
            Verdict::Unclassified => "",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Annotations ──────────────────────────────────────────────────────────────

/// Kind of issue flagged on a quoted passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    #[serde(rename = "Factual Error")]
    FactualError,
    #[serde(rename = "Logical Fallacy")]
    LogicalFallacy,
    #[serde(rename = "Missing Context")]
    MissingContext,
    #[serde(rename = "Biased Wording")]
    BiasedWording,
    #[serde(rename = "Exaggeration")]
    Exaggeration,
    /// Unrecognised label from the model; never counted by any scoring module.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightAnnotation {
    pub quoted_text: String,
    pub issue_type: IssueKind,
    pub explanation: String,
    pub correction_evidence: String,
    pub search_query_suggestion: String,
}

// ── Meta analysis ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoliticalLeaning {
    Left,
    #[serde(rename = "Center-Left")]
    CenterLeft,
    Center,
    #[serde(rename = "Center-Right")]
    CenterRight,
    Right,
    Extreme,
    #[serde(other)]
    Unknown,
}

/// Per-module values keyed by the five ensemble modules.
///
/// Used both for raw module scores and for contribution percentages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnsembleBreakdown {
    pub source: f64,
    pub cross_check: f64,
    pub logic: f64,
    pub context: f64,
    pub bias: f64,
}

impl EnsembleBreakdown {
    pub fn as_array(&self) -> [f64; 5] {
        [self.source, self.cross_check, self.logic, self.context, self.bias]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaAnalysis {
    pub credibility_score: f64,
    pub verdict_badge: Verdict,
    pub political_leaning_assessment: PoliticalLeaning,
    /// Rhetorical charge on a 0–10 scale.
    pub emotional_intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensemble_breakdown: Option<EnsembleBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreatorReputationCheck {
    pub evaluation: String,
    pub check_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Complete credibility report for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthLensAnalysis {
    pub article_title: String,
    pub reporter_name: String,
    pub meta_analysis: MetaAnalysis,
    pub summary: String,
    pub bias_check: String,
    pub highlight_annotations: Vec<HighlightAnnotation>,
    pub missing_context: Vec<String>,
    pub creator_reputation_check: CreatorReputationCheck,
    pub correction_suggestion: String,
    /// Long-form editorial commentary.
    pub truthlens_commentary: String,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_time_ms: Option<u64>,
}

impl TruthLensAnalysis {
    /// Number of flagged passages of the given kind.
    pub fn count_issues(&self, kind: IssueKind) -> usize {
        self.highlight_annotations
            .iter()
            .filter(|a| a.issue_type == kind)
            .count()
    }
}
