//! Ensemble scoring API — runs the scorer on caller-supplied records.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use truthlens_common::Verdict;
use truthlens_ranker::{
    compute_ensemble_score, sample_record, AnalysisRecord, ContributionBreakdown, Module, ModuleScores,
    ModuleWeights,
};
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub record: AnalysisRecord,
    #[serde(default)]
    pub weights: Option<ModuleWeights>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u32,
    pub verdict: Verdict,
    pub verdict_range: String,
    pub verdict_description: String,
    pub module_scores: ModuleScores,
    pub contribution: ContributionBreakdown,
    pub total_weight: f64,
}

/// Weight overrides for the methodology view; omitted modules keep the server default.
#[derive(Debug, Default, Deserialize)]
pub struct WeightParams {
    pub source: Option<f64>,
    pub cross_check: Option<f64>,
    pub logic: Option<f64>,
    pub context: Option<f64>,
    pub bias: Option<f64>,
}

impl WeightParams {
    fn apply(&self, base: ModuleWeights) -> ModuleWeights {
        ModuleWeights {
            source: self.source.unwrap_or(base.source),
            cross_check: self.cross_check.unwrap_or(base.cross_check),
            logic: self.logic.unwrap_or(base.logic),
            context: self.context.unwrap_or(base.context),
            bias: self.bias.unwrap_or(base.bias),
        }
    }
}

/// One row of the methodology table.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModuleRow {
    pub key: String,
    pub label: String,
    pub weight: f64,
    pub score: f64,
    pub contribution: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MethodologyResponse {
    pub weights: ModuleWeights,
    pub record: AnalysisRecord,
    #[serde(flatten)]
    pub result: ScoreResponse,
    pub modules: Vec<ModuleRow>,
}

fn score(record: &AnalysisRecord, weights: &ModuleWeights) -> Result<ScoreResponse, ApiError> {
    weights.validate()?;
    let result = compute_ensemble_score(record, weights);
    let verdict = result.verdict();
    Ok(ScoreResponse {
        score: result.score,
        verdict,
        verdict_range: verdict.score_range().to_string(),
        verdict_description: verdict.description().to_string(),
        module_scores: result.module_scores,
        contribution: result.contribution,
        total_weight: weights.total(),
    })
}

/// GET /api/weights/default — Weights applied when a request supplies none
pub async fn api_default_weights(State(state): State<SharedState>) -> Json<ModuleWeights> {
    Json(state.weights)
}

/// POST /api/score — Score a record with optional custom weights
pub async fn api_score(
    State(state): State<SharedState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let Json(req) = payload?;
    let weights = req.weights.unwrap_or(state.weights);
    Ok(Json(score(&req.record, &weights)?))
}

/// GET /api/methodology — Simulate the sample record under adjusted weights
pub async fn api_methodology(
    State(state): State<SharedState>,
    params: Result<Query<WeightParams>, QueryRejection>,
) -> Result<Json<MethodologyResponse>, ApiError> {
    let Query(params) = params?;
    let weights = params.apply(state.weights);
    let record = sample_record();
    let result = score(&record, &weights)?;

    let scores = result.module_scores.as_array();
    let contribution = result.contribution.as_array();
    let modules = Module::ALL
        .iter()
        .enumerate()
        .map(|(i, module)| ModuleRow {
            key: module.key().to_string(),
            label: module.label().to_string(),
            weight: weights.get(*module),
            score: scores[i],
            contribution: contribution[i],
        })
        .collect();

    Ok(Json(MethodologyResponse { weights, record, result, modules }))
}
