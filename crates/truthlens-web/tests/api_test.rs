use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use truthlens_llm::LlmError;
use truthlens_pipeline::{Analyzer, AnalyzerConfig};
use truthlens_test_utils::{sample_response, MockBackend};
use truthlens_web::{build_router, AppState};

fn app(backend: MockBackend) -> Router {
    let analyzer = Arc::new(Analyzer::new(Arc::new(backend), AnalyzerConfig::default()));
    build_router(AppState::new(analyzer.clone(), analyzer))
}

async fn read_json(resp: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── Health / weights ────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let resp = app(MockBackend::new())
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["status"], "ok");
}

#[tokio::test]
async fn default_weights_are_expert_priors() {
    let resp = app(MockBackend::new())
        .oneshot(Request::get("/api/weights/default").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        read_json(resp).await,
        json!({"source": 30.0, "cross_check": 25.0, "logic": 20.0, "context": 15.0, "bias": 10.0})
    );
}

// ── POST /api/score ─────────────────────────────────────────────────

fn record() -> Value {
    json!({
        "reputation_checkpoints": ["registered outlet", "named reporter"],
        "grounding_source_count": 3,
        "annotations": [],
        "missing_context_items": ["prior-year figures"],
        "emotional_intensity": 2.0
    })
}

#[tokio::test]
async fn score_with_default_weights() {
    let resp = app(MockBackend::new())
        .oneshot(post_json("/api/score", json!({ "record": record() })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = read_json(resp).await;
    assert_eq!(body["score"], 92);
    assert_eq!(body["verdict"], "Trustworthy");
    assert_eq!(body["verdict_range"], "88-100");
    assert_eq!(body["verdict_description"], "Claims are corroborated and the reporting is balanced.");
    assert_eq!(body["total_weight"], 100.0);
    assert_eq!(
        body["contribution"],
        json!({"source": 30.0, "cross_check": 26.0, "logic": 22.0, "context": 14.0, "bias": 9.0})
    );
    assert_eq!(body["module_scores"]["context"], 85.0);
}

#[tokio::test]
async fn score_with_single_module_weight() {
    let weights = json!({"source": 0.0, "cross_check": 0.0, "logic": 0.0, "context": 0.0, "bias": 1.0});
    let resp = app(MockBackend::new())
        .oneshot(post_json("/api/score", json!({ "record": record(), "weights": weights })))
        .await
        .unwrap();
    let body = read_json(resp).await;
    assert_eq!(body["score"], 80);
    assert_eq!(body["contribution"]["bias"], 100.0);
    assert_eq!(body["contribution"]["source"], 0.0);
}

#[tokio::test]
async fn score_rejects_negative_weight() {
    let weights = json!({"source": -1.0, "cross_check": 25.0, "logic": 20.0, "context": 15.0, "bias": 10.0});
    let resp = app(MockBackend::new())
        .oneshot(post_json("/api/score", json!({ "record": record(), "weights": weights })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(resp).await["error"].as_str().unwrap().contains("source"));
}

#[tokio::test]
async fn score_rejects_malformed_body() {
    let req = Request::post("/api/score")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app(MockBackend::new()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(resp).await.get("error").is_some());
}

// ── GET /api/methodology ────────────────────────────────────────────

#[tokio::test]
async fn methodology_scores_sample_record() {
    let resp = app(MockBackend::new())
        .oneshot(Request::get("/api/methodology").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = read_json(resp).await;
    assert_eq!(body["score"], 79);
    assert_eq!(body["verdict"], "Caution");
    assert_eq!(body["modules"].as_array().unwrap().len(), 5);
    assert_eq!(body["modules"][0]["label"], "Source Reputation");
    assert_eq!(body["modules"][2]["score"], 60.0);
}

#[tokio::test]
async fn methodology_applies_weight_overrides() {
    let uri = "/api/methodology?source=0&cross_check=0&logic=1&context=0&bias=0";
    let resp = app(MockBackend::new())
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = read_json(resp).await;
    // Two fallacies in the sample record
    assert_eq!(body["score"], 60);
    assert_eq!(body["verdict"], "Misleading");
    assert_eq!(body["weights"]["logic"], 1.0);
}

// ── POST /api/analyze ───────────────────────────────────────────────

#[tokio::test]
async fn analyze_returns_scored_report() {
    let backend = MockBackend::new().with_llm_response(sample_response(3));
    let resp = app(backend)
        .oneshot(post_json("/api/analyze", json!({"url": "https://news.example/a", "inputType": "url"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = read_json(resp).await;
    assert_eq!(body["meta_analysis"]["credibility_score"], 92.0);
    assert_eq!(body["meta_analysis"]["verdict_badge"], "Trustworthy");
    assert_eq!(body["grounding_sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn analyze_upstream_failure_is_bad_gateway() {
    let backend = MockBackend::new().with_error(LlmError::Unavailable("quota".to_string()));
    let resp = app(backend)
        .oneshot(post_json("/api/analyze", json!({"url": "https://news.example/a"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(read_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn analyze_rejects_empty_manual_input() {
    let resp = app(MockBackend::new())
        .oneshot(post_json("/api/analyze", json!({"inputType": "manual", "body": "   "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── GET /api/news ───────────────────────────────────────────────────

#[tokio::test]
async fn news_is_filtered() {
    let payload = json!([
        {"title": "Rates held steady", "url": "https://news.example/1", "source": "Wire", "time": "1h"},
        {"title": "Budget passes", "url": "https://news.example/2", "source": "Daily", "time": "2h"}
    ]);
    let backend = MockBackend::new().with_response(payload.to_string());
    let resp = app(backend)
        .oneshot(Request::get("/api/news?category=economy&filter=RATES").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = read_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["source"], "Wire");
}

#[tokio::test]
async fn news_upstream_failure_is_empty_list() {
    let resp = app(MockBackend::new())
        .oneshot(Request::get("/api/news").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!([]));
}

#[tokio::test]
async fn news_rejects_unknown_category() {
    let resp = app(MockBackend::new())
        .oneshot(Request::get("/api/news?category=sports").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
