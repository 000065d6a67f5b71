//! Recommended-articles feed.

use async_trait::async_trait;
use tracing::{debug, warn};
use truthlens_common::{Language, NewsCategory, NewsItem};
use truthlens_llm::parse::parse_ai_json;
use truthlens_llm::prompt::{news_prompt, NEWS_ITEM_COUNT};
use truthlens_llm::{LlmError, LlmRequest, Message};

use crate::analyzer::Analyzer;

#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Latest articles for a category. Never fails: any upstream problem
    /// yields an empty list.
    async fn fetch_top_news(
        &self,
        category: NewsCategory,
        query: Option<&str>,
        language: Language,
    ) -> Vec<NewsItem>;
}

/// Keep items whose title or source contains `filter`, ignoring case.
/// A blank filter keeps everything.
pub fn filter_news(items: &[NewsItem], filter: &str) -> Vec<NewsItem> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&needle) || item.source.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Accepts either a bare array or an object wrapping it under `items`/`articles`.
fn extract_items(value: serde_json::Value) -> Result<Vec<NewsItem>, LlmError> {
    let list = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .remove("items")
            .or_else(|| map.remove("articles"))
            .ok_or_else(|| LlmError::MalformedResponse("news payload has no item list".to_string()))?,
        other => return Err(LlmError::MalformedResponse(format!("unexpected news payload: {other}"))),
    };
    let items: Vec<NewsItem> =
        serde_json::from_value(list).map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
    Ok(items
        .into_iter()
        .filter(|i| !i.title.trim().is_empty() && !i.url.trim().is_empty())
        .take(NEWS_ITEM_COUNT)
        .collect())
}

impl Analyzer {
    async fn request_news(
        &self,
        category: NewsCategory,
        query: Option<&str>,
        language: Language,
    ) -> Result<Vec<NewsItem>, LlmError> {
        self.quota().wait().await;
        let request = LlmRequest {
            messages: vec![Message::user(news_prompt(category, query, language))],
            model: self.config().model.clone(),
            response_mime_type: Some("application/json".to_string()),
            web_search: true,
            thinking_budget: Some(0),
            ..Default::default()
        };
        let response = self.backend().complete(request).await?;
        match parse_ai_json(&response.content)? {
            Some(value) => extract_items(value),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl NewsFeed for Analyzer {
    async fn fetch_top_news(
        &self,
        category: NewsCategory,
        query: Option<&str>,
        language: Language,
    ) -> Vec<NewsItem> {
        match self.request_news(category, query, language).await {
            Ok(items) => {
                debug!(category = category.as_str(), count = items.len(), "news feed fetched");
                items
            }
            Err(e) => {
                warn!(category = category.as_str(), error = %e, "news feed unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(title: &str, source: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            url: format!("https://news.example/{}", title.len()),
            source: source.to_string(),
            time: "1h".to_string(),
        }
    }

    #[test]
    fn test_filter_matches_title_or_source_case_insensitive() {
        let items = vec![item("Budget vote delayed", "Daily"), item("Chip exports", "BUDGET Watch"), item("Rain", "Wire")];
        let hits = filter_news(&items, "budget");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Budget vote delayed");
        assert_eq!(hits[1].source, "BUDGET Watch");
    }

    #[test]
    fn test_blank_filter_keeps_all() {
        let items = vec![item("a", "x"), item("b", "y")];
        assert_eq!(filter_news(&items, "  "), items);
    }

    #[test]
    fn test_extract_items_accepts_wrapped_list() {
        let value = json!({"items": [{"title": "T", "url": "https://a", "source": "S", "time": "now"}]});
        let items = extract_items(value).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "S");
    }

    #[test]
    fn test_extract_items_drops_incomplete_and_caps() {
        let mut list: Vec<_> = (0..12)
            .map(|i| json!({"title": format!("T{i}"), "url": format!("https://a/{i}")}))
            .collect();
        list.insert(0, json!({"title": "", "url": "https://a/x"}));
        let items = extract_items(serde_json::Value::Array(list)).unwrap();
        assert_eq!(items.len(), NEWS_ITEM_COUNT);
        assert_eq!(items[0].title, "T0");
    }

    #[test]
    fn test_extract_items_rejects_scalar() {
        assert!(extract_items(json!("nope")).is_err());
    }
}
