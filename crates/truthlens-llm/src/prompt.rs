//! Analysis and news-feed prompts, and the response schema the analysis
//! model is constrained to.

use truthlens_common::{InputData, InputKind, Language, NewsCategory};

/// Title the model must use when the content cannot be verified.
pub const UNAVAILABLE_TITLE: &str = "Analysis unavailable: access denied or insufficient information";

/// Markers recognised in a returned title as "could not analyse".
pub const UNAVAILABLE_MARKERS: [&str; 2] = ["Analysis unavailable", "분석 불가"];

/// Number of headlines requested from the news feed.
pub const NEWS_ITEM_COUNT: usize = 8;

pub fn is_unavailable_title(title: &str) -> bool {
    UNAVAILABLE_MARKERS.iter().any(|m| title.contains(m))
}

fn describe_target(input: &InputData) -> String {
    match input.input_type {
        InputKind::Url => format!(
            "Target URL: {} (hinted title: {})",
            input.url().unwrap_or(""),
            input.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("unknown"),
        ),
        InputKind::Manual => {
            let mut target = format!(
                "Article title: {}, Body: {}",
                input.title.as_deref().unwrap_or(""),
                input.truncated_body(),
            );
            if let Some(author) = input.author.as_deref().filter(|a| !a.is_empty()) {
                target.push_str(&format!(", Author: {author}"));
            }
            target
        }
    }
}

/// Build the forensic analysis prompt for one article.
pub fn analysis_prompt(input: &InputData) -> String {
    format!(
        "You are a top-tier media forensics analyst and fact-checker.\n\
         Analyse the following content in depth, assess its credibility and write a report: {target}.\n\
         \n\
         STRICT INSTRUCTIONS:\n\
         1. Live URL verification: use the Google Search tool to confirm the actual content of any URL provided. \
         For video links, search the title, description and external coverage to establish what is actually said.\n\
         2. NO HALLUCINATION: if the URL cannot be accessed or its content cannot be confirmed through search, \
         never invent content. Set 'article_title' to \"{unavailable}\" and explain why in 'summary'.\n\
         3. Forensic criteria: check whether the core claims agree with other reliable outlets, whether there are \
         logical leaps, and whether context has been deliberately omitted.\n\
         4. Commentary: write 'truthlens_commentary' as a professional journalism column grounded in confirmed facts.\n\
         5. Use only these issue types in 'highlight_annotations': \"Factual Error\", \"Logical Fallacy\", \
         \"Missing Context\", \"Biased Wording\", \"Exaggeration\". Rate 'emotional_intensity' from 0 to 10.\n\
         6. Language: write every analysis field in {language}.",
        target = describe_target(input),
        unavailable = UNAVAILABLE_TITLE,
        language = input.language.as_str(),
    )
}

fn string() -> serde_json::Value {
    serde_json::json!({ "type": "STRING" })
}

fn string_array() -> serde_json::Value {
    serde_json::json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Gemini `responseSchema` describing a `TruthLensAnalysis`.
pub fn analysis_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "article_title": string(),
            "reporter_name": string(),
            "meta_analysis": {
                "type": "OBJECT",
                "properties": {
                    "credibility_score": { "type": "NUMBER" },
                    "verdict_badge": string(),
                    "political_leaning_assessment": string(),
                    "emotional_intensity": { "type": "NUMBER" }
                },
                "required": ["credibility_score", "verdict_badge", "political_leaning_assessment", "emotional_intensity"]
            },
            "summary": string(),
            "bias_check": string(),
            "highlight_annotations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "quoted_text": string(),
                        "issue_type": string(),
                        "explanation": string(),
                        "correction_evidence": string(),
                        "search_query_suggestion": string()
                    },
                    "required": ["quoted_text", "issue_type", "explanation", "correction_evidence", "search_query_suggestion"]
                }
            },
            "missing_context": string_array(),
            "creator_reputation_check": {
                "type": "OBJECT",
                "properties": {
                    "evaluation": string(),
                    "check_points": string_array()
                },
                "required": ["evaluation", "check_points"]
            },
            "correction_suggestion": string(),
            "truthlens_commentary": string()
        },
        "required": [
            "article_title", "reporter_name", "meta_analysis", "summary", "bias_check",
            "highlight_annotations", "missing_context", "creator_reputation_check",
            "correction_suggestion", "truthlens_commentary"
        ]
    })
}

/// Prompt for the recommended-articles feed.
pub fn news_prompt(category: NewsCategory, query: Option<&str>, language: Language) -> String {
    let query = query.map(str::trim).filter(|q| !q.is_empty()).unwrap_or("top headlines");
    format!(
        "Return the {count} latest news articles written in {language} as a JSON array. \
         Category: {category}. Search terms: {query}. \
         Format: [{{\"title\", \"url\", \"source\", \"time\"}}].",
        count = NEWS_ITEM_COUNT,
        language = language.as_str(),
        category = category.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prompt_mentions_url_and_hint() {
        let mut input = InputData::from_url("https://news.example/story");
        input.title = Some("Hinted".to_string());
        let p = analysis_prompt(&input);
        assert!(p.contains("Target URL: https://news.example/story"));
        assert!(p.contains("hinted title: Hinted"));
        assert!(p.contains(UNAVAILABLE_TITLE));
        assert!(p.contains("in Korean"));
    }

    #[test]
    fn test_manual_prompt_truncates_body() {
        let mut input = InputData::from_text("Title", "x".repeat(20_000));
        input.language = Language::English;
        let p = analysis_prompt(&input);
        assert!(p.contains("Article title: Title"));
        assert!(!p.contains(&"x".repeat(8001)));
        assert!(p.contains(&"x".repeat(8000)));
        assert!(p.contains("in English"));
    }

    #[test]
    fn test_unavailable_markers() {
        assert!(is_unavailable_title(UNAVAILABLE_TITLE));
        assert!(is_unavailable_title("분석 불가: 접근 권한 또는 정보 부족"));
        assert!(!is_unavailable_title("City council passes budget"));
    }

    #[test]
    fn test_schema_requires_scoring_fields() {
        let schema = analysis_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["highlight_annotations", "missing_context", "creator_reputation_check", "meta_analysis"] {
            assert!(required.contains(&field), "{field} missing from required");
        }
        assert_eq!(
            schema["properties"]["meta_analysis"]["properties"]["emotional_intensity"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn test_news_prompt_defaults_query() {
        let p = news_prompt(NewsCategory::ItTech, Some("  "), Language::Korean);
        assert!(p.contains("Category: IT/Tech"));
        assert!(p.contains("top headlines"));
        assert!(p.contains("8 latest"));
    }
}
