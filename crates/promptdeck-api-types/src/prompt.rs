use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Closed set of prompt categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Image,
    Video,
    #[default]
    Text,
    Code,
    Automation,
}

impl PromptCategory {
    pub const ALL: [PromptCategory; 5] = [
        PromptCategory::Image,
        PromptCategory::Video,
        PromptCategory::Text,
        PromptCategory::Code,
        PromptCategory::Automation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PromptCategory::Image => "image",
            PromptCategory::Video => "video",
            PromptCategory::Text => "text",
            PromptCategory::Code => "code",
            PromptCategory::Automation => "automation",
        }
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown prompt category `{}`", self.0)
    }
}

impl std::error::Error for CategoryParseError {}

impl FromStr for PromptCategory {
    type Err = CategoryParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PromptCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| CategoryParseError(value.to_string()))
    }
}

/// A prompt as it appears on the wire. `tags` is always an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: PromptCategory,
    pub tags: Vec<String>,
    pub votes: i64,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<bool>,
}

/// Body of `POST /api/prompts`. Every field is optional on the wire so the
/// server can answer with a field-specific message instead of a parse error.
///
/// `tags` that is not an array of strings reads as absent, and so does an
/// empty `category`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<PromptCategory>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(tag) => Some(tag),
            _ => None,
        })
        .collect())
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<PromptCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) if name.trim().is_empty() => Ok(None),
        Some(Value::String(name)) => name.parse().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("category must be a string, got {other}"))),
    }
}

/// Body of `PATCH /api/prompts/:id/vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub delta: i64,
}

impl From<VoteDirection> for VoteRequest {
    fn from(direction: VoteDirection) -> Self {
        Self {
            delta: direction.delta(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis: bool,
}

/// Every non-2xx body the API produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
