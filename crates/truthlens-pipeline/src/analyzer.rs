//! Article analysis: the `fetch_analysis` operation.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use truthlens_common::{InputData, TruthLensAnalysis, Verdict};
use truthlens_llm::audit::LlmAuditEntry;
use truthlens_llm::parse::parse_ai_output;
use truthlens_llm::prompt::{analysis_prompt, analysis_response_schema, is_unavailable_title};
use truthlens_llm::quota::QuotaManager;
use truthlens_llm::{LlmBackend, LlmRequest};
use truthlens_ranker::{classify_verdict, compute_ensemble_score, AnalysisRecord, ModuleWeights};

use crate::cache::{cache_key, default_ttl, AnalysisCache};
use crate::error::{PipelineError, Result};

/// Source of structured credibility reports.
#[async_trait]
pub trait AnalysisFetcher: Send + Sync {
    async fn fetch_analysis(&self, input: &InputData) -> Result<TruthLensAnalysis>;
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Overrides the backend's default model when set.
    pub model: Option<String>,
    pub max_output_tokens: u32,
    pub thinking_budget: Option<u32>,
    pub temperature: Option<f32>,
    pub web_search: bool,
    pub max_grounding_sources: usize,
    pub min_call_interval: Duration,
    /// Weights applied when scoring fresh reports.
    pub weights: ModuleWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_output_tokens: 12_000,
            thinking_budget: Some(4_000),
            temperature: None,
            web_search: true,
            max_grounding_sources: 5,
            min_call_interval: Duration::from_millis(30),
            weights: ModuleWeights::default(),
        }
    }
}

/// Overwrite the model's own score and verdict with the ensemble result.
///
/// Reports the model marked as unverifiable are pinned to score 0 and
/// `Propaganda` with no breakdown.
pub fn finalize_scores(analysis: &mut TruthLensAnalysis, weights: &ModuleWeights) {
    if is_unavailable_title(&analysis.article_title) {
        let meta = &mut analysis.meta_analysis;
        meta.credibility_score = 0.0;
        meta.verdict_badge = Verdict::Propaganda;
        meta.ensemble_breakdown = None;
        return;
    }

    let result = compute_ensemble_score(&AnalysisRecord::from(&*analysis), weights);
    let meta = &mut analysis.meta_analysis;
    meta.credibility_score = f64::from(result.score);
    meta.verdict_badge = classify_verdict(meta.credibility_score);
    meta.ensemble_breakdown = Some(result.contribution);
}

/// Model-backed analyzer with result caching and call pacing.
pub struct Analyzer {
    backend: Arc<dyn LlmBackend>,
    cache: Arc<AnalysisCache>,
    quota: QuotaManager,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn LlmBackend>, config: AnalyzerConfig) -> Self {
        Self::with_cache(backend, Arc::new(AnalysisCache::new(default_ttl())), config)
    }

    pub fn with_cache(backend: Arc<dyn LlmBackend>, cache: Arc<AnalysisCache>, config: AnalyzerConfig) -> Self {
        Self {
            backend,
            cache,
            quota: QuotaManager::new(config.min_call_interval),
            config,
        }
    }

    pub fn backend(&self) -> &dyn LlmBackend {
        self.backend.as_ref()
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub(crate) fn quota(&self) -> &QuotaManager {
        &self.quota
    }

    fn build_request(&self, input: &InputData) -> LlmRequest {
        LlmRequest {
            messages: vec![truthlens_llm::Message::user(analysis_prompt(input))],
            model: self.config.model.clone(),
            max_tokens: Some(self.config.max_output_tokens),
            temperature: self.config.temperature,
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(analysis_response_schema()),
            web_search: self.config.web_search,
            thinking_budget: self.config.thinking_budget,
        }
    }
}

#[async_trait]
impl AnalysisFetcher for Analyzer {
    async fn fetch_analysis(&self, input: &InputData) -> Result<TruthLensAnalysis> {
        input.validate().map_err(|e| PipelineError::InvalidInput(e.to_string()))?;

        let started = Instant::now();
        let key = cache_key(input);
        if let Some(mut cached) = self.cache.get(&key) {
            debug!(key = %key, "analysis served from cache");
            cached.analysis_time_ms = Some(0);
            return Ok(cached);
        }

        self.quota.wait().await;

        let request = self.build_request(input);
        let call_started = Instant::now();
        let response = self.backend.complete(request).await.map_err(|e| {
            warn!(error = %e, model = self.backend.model_id(), "analysis call failed");
            PipelineError::from(e)
        })?;
        LlmAuditEntry::new("analysis", self.backend.as_ref(), &response, call_started.elapsed().as_millis() as u64)
            .record();

        let mut analysis: TruthLensAnalysis = parse_ai_output(&response.content).map_err(|e| {
            warn!(error = %e, "analysis output could not be parsed");
            PipelineError::from(e)
        })?;

        // Grounding comes from the provider, never from the model text
        analysis.grounding_sources = response
            .grounding_sources
            .into_iter()
            .filter(|s| s.uri.is_some())
            .take(self.config.max_grounding_sources)
            .collect();

        finalize_scores(&mut analysis, &self.config.weights);

        let elapsed = started.elapsed().as_millis() as u64;
        analysis.analysis_time_ms = Some(elapsed);
        info!(
            title = %analysis.article_title,
            score = analysis.meta_analysis.credibility_score,
            verdict = %analysis.meta_analysis.verdict_badge,
            grounding = analysis.grounding_sources.len(),
            elapsed_ms = elapsed,
            "analysis complete"
        );

        self.cache.insert(key, analysis.clone());
        Ok(analysis)
    }
}
