//! Shared testing utilities for the TruthLens workspace: a scripted LLM
//! backend and report fixtures.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use truthlens_common::{GroundingSource, TruthLensAnalysis};
use truthlens_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

pub const MOCK_MODEL: &str = "mock-model";

/// Backend that replays queued outcomes in order.
///
/// Once the queue is drained every call fails with `Unavailable`.
#[derive(Default)]
pub struct MockBackend {
    queue: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response with the given text.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_llm_response(LlmResponse {
            content: content.into(),
            model: MOCK_MODEL.to_string(),
            ..Default::default()
        })
    }

    pub fn with_llm_response(self, response: LlmResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_error(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, outcome: Result<LlmResponse, LlmError>) {
        self.queue.lock().unwrap_or_else(|p| p.into_inner()).push_back(outcome);
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|p| p.into_inner()) = Some(req);
        self.queue
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Unavailable("mock queue exhausted".to_string())))
    }

    fn model_id(&self) -> &str { MOCK_MODEL }
    fn backend_name(&self) -> &str { "mock" }
    fn is_local(&self) -> bool { true }
    fn max_context_tokens(&self) -> usize { 32_000 }
    fn max_output_tokens(&self) -> usize { 8_192 }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Model output for a moderately reliable article: two reputation
/// checkpoints, no fallacies, one missing-context item, intensity 2.
pub fn sample_report_json() -> serde_json::Value {
    serde_json::json!({
        "article_title": "Council approves 2026 budget after long debate",
        "reporter_name": "J. Kim",
        "meta_analysis": {
            "credibility_score": 55,
            "verdict_badge": "Misleading",
            "political_leaning_assessment": "Center",
            "emotional_intensity": 2
        },
        "summary": "The city council passed next year's budget by a narrow margin.",
        "bias_check": "Language is mostly neutral.",
        "highlight_annotations": [{
            "quoted_text": "a record-breaking budget",
            "issue_type": "Exaggeration",
            "explanation": "The budget grew 1.2%, below several prior years.",
            "correction_evidence": "Council records for 2019 and 2021.",
            "search_query_suggestion": "city budget growth history"
        }],
        "missing_context": ["Prior-year spending figures"],
        "creator_reputation_check": {
            "evaluation": "Established local outlet.",
            "check_points": ["Registered news organisation", "Named reporter with archive"]
        },
        "correction_suggestion": "Report the growth rate alongside the headline figure.",
        "truthlens_commentary": "Broadly accurate coverage with one overstated claim."
    })
}

pub fn sample_report() -> TruthLensAnalysis {
    serde_json::from_value(sample_report_json()).unwrap_or_else(|e| panic!("fixture does not deserialize: {e}"))
}

pub fn grounding(n: usize) -> Vec<GroundingSource> {
    (0..n)
        .map(|i| GroundingSource {
            title: Some(format!("Source {i}")),
            uri: Some(format!("https://source.example/{i}")),
        })
        .collect()
}

/// Provider response carrying [`sample_report_json`] and `sources` grounding entries.
pub fn sample_response(sources: usize) -> LlmResponse {
    LlmResponse {
        content: sample_report_json().to_string(),
        model: MOCK_MODEL.to_string(),
        prompt_tokens: 1_200,
        completion_tokens: 900,
        grounding_sources: grounding(sources),
    }
}
