//! Recommended-news endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use truthlens_common::{Language, NewsCategory, NewsItem};
use truthlens_pipeline::filter_news;
use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub category: Option<String>,
    pub query: Option<String>,
    pub filter: Option<String>,
    pub language: Option<Language>,
}

/// GET /api/news — Latest articles for a category, optionally filtered
pub async fn api_news(
    State(state): State<SharedState>,
    params: Result<Query<NewsParams>, QueryRejection>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let Query(params) = params?;
    let category = match params.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => name.parse::<NewsCategory>().map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => NewsCategory::default(),
    };
    let language = params.language.unwrap_or(state.language);

    let items = state.news.fetch_top_news(category, params.query.as_deref(), language).await;
    let items = match params.filter.as_deref() {
        Some(filter) => filter_news(&items, filter),
        None => items,
    };
    Ok(Json(items))
}
