//! Analysis requests and news feed items.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TruthLensError};

/// Maximum number of body characters forwarded to the model.
pub const MAX_BODY_CHARS: usize = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    English,
    #[default]
    Korean,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Korean  => "Korean",
        }
    }
}

/// Whether the article is referenced by URL or pasted as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Manual,
    #[default]
    Url,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default, rename = "inputType")]
    pub input_type: InputKind,
}

impl InputData {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), input_type: InputKind::Url, ..Default::default() }
    }

    pub fn from_text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            input_type: InputKind::Manual,
            ..Default::default()
        }
    }

    /// Body limited to [`MAX_BODY_CHARS`] characters.
    pub fn truncated_body(&self) -> &str {
        let body = self.body.as_deref().unwrap_or("");
        match body.char_indices().nth(MAX_BODY_CHARS) {
            Some((idx, _)) => &body[..idx],
            None => body,
        }
    }

    /// Non-empty URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// An input is usable when it names a URL or carries some text.
    pub fn validate(&self) -> Result<()> {
        match self.input_type {
            InputKind::Url if self.url().is_none() => Err(TruthLensError::InvalidInput("url input requires a non-empty url".to_string())),
            InputKind::Manual if self.truncated_body().trim().is_empty()
                && self.title.as_deref().unwrap_or("").trim().is_empty() =>
            {
                Err(TruthLensError::InvalidInput("manual input requires a title or body".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewsCategory {
    #[default]
    Politics,
    Economy,
    Society,
    #[serde(rename = "IT/Tech")]
    ItTech,
    World,
    Search,
    Keywords,
}

impl NewsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::Politics => "Politics",
            NewsCategory::Economy  => "Economy",
            NewsCategory::Society  => "Society",
            NewsCategory::ItTech   => "IT/Tech",
            NewsCategory::World    => "World",
            NewsCategory::Search   => "Search",
            NewsCategory::Keywords => "Keywords",
        }
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = TruthLensError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "politics" => Ok(NewsCategory::Politics),
            "economy"  => Ok(NewsCategory::Economy),
            "society"  => Ok(NewsCategory::Society),
            "it/tech" | "it" | "tech" => Ok(NewsCategory::ItTech),
            "world"    => Ok(NewsCategory::World),
            "search"   => Ok(NewsCategory::Search),
            "keywords" => Ok(NewsCategory::Keywords),
            other => Err(TruthLensError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_body_counts_chars_not_bytes() {
        let body = "가".repeat(MAX_BODY_CHARS + 10);
        let input = InputData::from_text("t", body);
        assert_eq!(input.truncated_body().chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn test_validate_requires_url_for_url_input() {
        let mut input = InputData::from_url("   ");
        assert!(input.validate().is_err());
        input.url = Some("https://news.example/a".to_string());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_manual_needs_text() {
        assert!(InputData::from_text("", "").validate().is_err());
        assert!(InputData::from_text("", "body").validate().is_ok());
    }

    #[test]
    fn test_input_type_wire_name() {
        let input: InputData =
            serde_json::from_str(r#"{"body":"x","inputType":"manual","language":"English"}"#).unwrap();
        assert_eq!(input.input_type, InputKind::Manual);
        assert_eq!(input.language, Language::English);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("it/tech".parse::<NewsCategory>().unwrap(), NewsCategory::ItTech);
        assert_eq!(
            "sports".parse::<NewsCategory>(),
            Err(TruthLensError::UnknownCategory("sports".to_string()))
        );
    }
}
