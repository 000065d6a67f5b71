//! Recovery of JSON payloads from model output.
//!
//! Models asked for JSON still occasionally wrap it in a Markdown fence or
//! emit typographic quotes. Both are repaired here before deserializing.

use serde::de::DeserializeOwned;

use crate::backend::LlmError;

/// Strip a surrounding ```` ``` ```` or ```` ```json ```` fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.strip_suffix('\n').unwrap_or(rest)
}

/// Parse model output as JSON. Empty output yields `Ok(None)`.
///
/// On a first parse failure, curly double quotes (U+201C, U+201D) are
/// replaced by ASCII quotes and parsing is retried once.
pub fn parse_ai_json(text: &str) -> Result<Option<serde_json::Value>, LlmError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let cleaned = strip_code_fence(text);

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(Some(value)),
        Err(first) => {
            tracing::warn!(error = %first, "model output is not valid JSON, attempting repair");
            let repaired = cleaned.replace(['\u{201C}', '\u{201D}'], "\"");
            serde_json::from_str(&repaired)
                .map(Some)
                .map_err(|e| LlmError::MalformedResponse(e.to_string()))
        }
    }
}

/// Parse and deserialize model output into `T`.
pub fn parse_ai_output<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let value = parse_ai_json(text)?
        .ok_or_else(|| LlmError::MalformedResponse("empty model output".to_string()))?;
    serde_json::from_value(value).map_err(|e| LlmError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let v = parse_ai_json(r#"{"a": 1}"#).unwrap().unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(parse_ai_json("").unwrap().is_none());
        assert!(parse_ai_json("  \n ").unwrap().is_none());
    }

    #[test]
    fn test_json_fence_is_stripped() {
        let text = "```json\n{\"title\": \"x\"}\n```";
        let v = parse_ai_json(text).unwrap().unwrap();
        assert_eq!(v["title"], "x");
    }

    #[test]
    fn test_bare_fence_is_stripped() {
        let text = "  ```\n[1, 2, 3]\n```  ";
        let v = parse_ai_json(text).unwrap().unwrap();
        assert_eq!(v.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_smart_quotes_are_repaired() {
        let text = "{\u{201C}title\u{201D}: \u{201C}Budget vote\u{201D}}";
        let v = parse_ai_json(text).unwrap().unwrap();
        assert_eq!(v["title"], "Budget vote");
    }

    #[test]
    fn test_unrepairable_is_malformed() {
        let err = parse_ai_json("{title: nope").unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_ai_output_typed() {
        #[derive(serde::Deserialize)]
        struct Item { title: String }
        let items: Vec<Item> = parse_ai_output("```json\n[{\"title\":\"a\"}]\n```").unwrap();
        assert_eq!(items[0].title, "a");
        assert!(parse_ai_output::<Vec<Item>>("").is_err());
    }
}
