//! Article analysis endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use truthlens_common::{InputData, TruthLensAnalysis};
use crate::error::ApiError;
use crate::state::SharedState;

/// POST /api/analyze — Produce a scored credibility report for one article
pub async fn api_analyze(
    State(state): State<SharedState>,
    payload: Result<Json<InputData>, JsonRejection>,
) -> Result<Json<TruthLensAnalysis>, ApiError> {
    let Json(input) = payload?;
    let analysis = state.fetcher.fetch_analysis(&input).await?;
    Ok(Json(analysis))
}
