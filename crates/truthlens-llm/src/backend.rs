//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   GeminiBackend           — Google Gemini API (structured JSON output,
//!                             Google Search grounding, thinking budget)
//!   OpenAiCompatibleBackend — any OpenAI-compatible endpoint (Ollama,
//!                             LMStudio, vLLM, OpenRouter, …); no grounding

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use truthlens_common::GroundingSource;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Malformed model output: {0}")]
    MalformedResponse(String),
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// e.g. "application/json"
    pub response_mime_type: Option<String>,
    /// Provider-format schema the output must conform to.
    pub response_schema: Option<serde_json::Value>,
    /// Let the provider ground the answer with web search.
    #[serde(default)]
    pub web_search: bool,
    pub thinking_budget: Option<u32>,
}

impl LlmRequest {
    pub fn user_prompt(prompt: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(prompt)], ..Default::default() }
    }

    fn wants_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some("application/json")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Web sources the provider used to ground the answer.
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    fn backend_name(&self) -> &str;
    fn is_local(&self) -> bool;
    fn max_context_tokens(&self) -> usize;
    fn max_output_tokens(&self) -> usize;
}

// ── Helpers ──────────────────────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    if status == 429 {
        return Err(LlmError::RateLimitExceeded);
    }
    let text = resp.text().await?;
    if status >= 400 {
        let body: serde_json::Value = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(serde_json::from_str(&text)?)
}

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        grounding_sources: Vec::new(),
    }
}

/// Parse a `generateContent` response body.
pub(crate) fn parse_gemini_response(json: &serde_json::Value, model: &str) -> LlmResponse {
    let candidate = &json["candidates"][0];

    // Thought summaries come back as parts flagged `thought: true`
    let content = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p["thought"].as_bool().unwrap_or(false))
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let grounding_sources = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .map(|c| GroundingSource {
                    title: c["web"]["title"].as_str().map(str::to_string),
                    uri:   c["web"]["uri"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    LlmResponse {
        content,
        model: json["modelVersion"].as_str().unwrap_or(model).to_string(),
        prompt_tokens:     json["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
        grounding_sources,
    }
}

// ── 1. Google Gemini ──────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    pub base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the `generateContent` request body.
    pub(crate) fn request_body(&self, req: &LlmRequest) -> serde_json::Value {
        // System message → systemInstruction
        let system_text = req.messages.iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone());

        let contents: Vec<serde_json::Value> = req.messages.iter()
            .filter(|m| m.role != "system")
            .map(|m| {
                let role = if m.role == "assistant" { "model" } else { "user" };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": m.content }]
                })
            })
            .collect();

        let mut generation_config = serde_json::json!({
            "maxOutputTokens": req.max_tokens.unwrap_or(4096),
            "temperature":     req.temperature.unwrap_or(0.1),
        });
        if let Some(mime) = &req.response_mime_type {
            generation_config["responseMimeType"] = serde_json::Value::String(mime.clone());
        }
        if let Some(schema) = &req.response_schema {
            generation_config["responseSchema"] = schema.clone();
        }
        if let Some(budget) = req.thinking_budget {
            generation_config["thinkingConfig"] = serde_json::json!({ "thinkingBudget": budget });
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(sys) = system_text {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": sys }]
            });
        }
        if req.web_search {
            body["tools"] = serde_json::json!([{ "googleSearch": {} }]);
        }
        body
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = req.model.as_deref().unwrap_or(&self.model).to_string();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let body = self.request_body(&req);

        let resp = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        if json["candidates"].as_array().map_or(true, |c| c.is_empty()) {
            let reason = json["promptFeedback"]["blockReason"].as_str().unwrap_or("no candidates");
            return Err(LlmError::Unavailable(format!("Gemini returned no answer: {reason}")));
        }

        Ok(parse_gemini_response(&json, &model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "gemini" }
    fn is_local(&self) -> bool { false }
    fn max_context_tokens(&self) -> usize { 1_000_000 }
    fn max_output_tokens(&self) -> usize { 65_536 }
}

// ── 2. OpenAI-Compatible (Ollama, LMStudio, vLLM, OpenRouter, …) ─────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k),
            None    => req,
        }
    }

    fn is_loopback(&self) -> bool {
        self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1")
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        if req.web_search {
            tracing::debug!(model = %self.model, "web search requested but not supported; answering ungrounded");
        }
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let mut body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(4096),
            "temperature": req.temperature.unwrap_or(0.1),
        });
        if req.wants_json() {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        let resp = self.auth(self.client.post(&url)).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "openai_compatible" }
    fn is_local(&self) -> bool { self.is_loopback() }
    fn max_context_tokens(&self) -> usize { 128_000 }
    fn max_output_tokens(&self) -> usize { 8_192 }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gemini_backend_is_not_local() {
        let b = GeminiBackend::new("AIza-test", "gemini-2.5-flash");
        assert!(!b.is_local());
        assert_eq!(b.model_id(), "gemini-2.5-flash");
        assert_eq!(b.backend_name(), "gemini");
    }

    #[test]
    fn test_gemini_request_body_structured_output() {
        let b = GeminiBackend::new("k", "gemini-2.5-flash");
        let req = LlmRequest {
            messages: vec![Message::system("be precise"), Message::user("analyse this")],
            max_tokens: Some(12_000),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(serde_json::json!({ "type": "OBJECT" })),
            web_search: true,
            thinking_budget: Some(4000),
            ..Default::default()
        };
        let body = b.request_body(&req);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be precise");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 12_000);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 4000);
        assert_eq!(body["tools"][0], serde_json::json!({ "googleSearch": {} }));
    }

    #[test]
    fn test_gemini_request_body_plain() {
        let b = GeminiBackend::new("k", "m");
        let body = b.request_body(&LlmRequest::user_prompt("hi"));
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_parse_gemini_response_with_grounding() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]},
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "title": "Wire report", "uri": "https://wire.example/1" } },
                    { "web": { "title": "No link" } }
                ]}
            }],
            "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 40 }
        });
        let resp = parse_gemini_response(&json, "gemini-2.5-flash");
        assert_eq!(resp.content, "{\"a\":1}");
        assert_eq!(resp.model, "gemini-2.5-flash");
        assert_eq!(resp.prompt_tokens, 120);
        assert_eq!(resp.completion_tokens, 40);
        assert_eq!(resp.grounding_sources.len(), 2);
        assert_eq!(resp.grounding_sources[0].uri.as_deref(), Some("https://wire.example/1"));
        assert_eq!(resp.grounding_sources[1].uri, None);
    }

    #[test]
    fn test_openai_compatible_with_no_key() {
        let b = OpenAiCompatibleBackend::new("http://localhost:11434", "llama3:8b", None);
        // No API key is valid for a local server
        assert_eq!(b.model_id(), "llama3:8b");
        assert!(b.is_local());
    }

    #[test]
    fn test_openai_compatible_remote_is_not_local() {
        let b = OpenAiCompatibleBackend::new("https://openrouter.ai/api", "m", Some("k".into()));
        assert!(!b.is_local());
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "model": "llama3:8b",
            "choices": [{ "message": { "content": "[]" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 2 }
        });
        let resp = parse_openai_response(&json, "fallback");
        assert_eq!(resp.content, "[]");
        assert_eq!(resp.model, "llama3:8b");
        assert!(resp.grounding_sources.is_empty());
    }
}
