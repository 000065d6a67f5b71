//! Shared application state for the web server.

use std::sync::Arc;
use truthlens_common::Language;
use truthlens_pipeline::{AnalysisFetcher, NewsFeed};
use truthlens_ranker::ModuleWeights;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn AnalysisFetcher>,
    pub news: Arc<dyn NewsFeed>,
    /// Weights used when a request does not supply its own.
    pub weights: ModuleWeights,
    /// Feed language when the request does not name one.
    pub language: Language,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn AnalysisFetcher>, news: Arc<dyn NewsFeed>) -> Self {
        Self { fetcher, news, weights: ModuleWeights::default(), language: Language::default() }
    }

    pub fn with_weights(mut self, weights: ModuleWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

pub type SharedState = Arc<AppState>;
