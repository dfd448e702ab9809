//! Prompt submission rules, vote deltas and the stored tag encoding.

use serde_json::Value;

use crate::domain::{
    PromptCategory,
    error::{DomainError, PromptValidationError},
};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Unvalidated submission as received from a client.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<PromptCategory>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
}

/// A submission that passed validation: text fields are trimmed and
/// non-empty, there is at least one tag, category and author are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrompt {
    title: String,
    description: String,
    content: String,
    category: PromptCategory,
    tags: Vec<String>,
    author: String,
}

impl NewPrompt {
    /// Checks run in field order so the first missing field is reported.
    pub fn validate(draft: PromptDraft) -> Result<Self, PromptValidationError> {
        let title = required(draft.title, PromptValidationError::MissingTitle)?;
        let description = required(draft.description, PromptValidationError::MissingDescription)?;
        let content = required(draft.content, PromptValidationError::MissingContent)?;

        let tags = match draft.tags {
            Some(tags) if !tags.is_empty() => tags,
            _ => return Err(PromptValidationError::MissingTags),
        };

        let author = draft
            .author
            .map(|author| author.trim().to_string())
            .filter(|author| !author.is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

        Ok(Self {
            title,
            description,
            content,
            category: draft.category.unwrap_or_default(),
            tags,
            author,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> PromptCategory {
        self.category
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

fn required(value: Option<String>, error: PromptValidationError) -> Result<String, PromptValidationError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(error)
}

/// A single vote: exactly +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDelta {
    Up,
    Down,
}

impl VoteDelta {
    /// Accepts the JSON numbers `1` and `-1` (`1.0` and `-1.0` included).
    /// Anything else, strings and booleans included, is rejected.
    pub fn from_json(value: Option<&Value>) -> Result<Self, PromptValidationError> {
        let number = match value {
            Some(Value::Number(number)) => number,
            _ => return Err(PromptValidationError::InvalidDelta),
        };

        if let Some(int) = number.as_i64() {
            return Self::try_from(int);
        }
        match number.as_f64() {
            Some(float) if float == 1.0 => Ok(VoteDelta::Up),
            Some(float) if float == -1.0 => Ok(VoteDelta::Down),
            _ => Err(PromptValidationError::InvalidDelta),
        }
    }

    pub fn value(self) -> i64 {
        match self {
            VoteDelta::Up => 1,
            VoteDelta::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteDelta {
    type Error = PromptValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteDelta::Up),
            -1 => Ok(VoteDelta::Down),
            _ => Err(PromptValidationError::InvalidDelta),
        }
    }
}

/// Encode tags for the text column.
pub fn encode_tags(tags: &[String]) -> String {
    // Serializing a slice of strings cannot fail.
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the text column back into tags.
pub fn decode_tags(encoded: &str) -> Result<Vec<String>, DomainError> {
    serde_json::from_str(encoded)
        .map_err(|err| DomainError::invariant(format!("stored tags are not a JSON string array: {err}")))
}

/// How `term` appears inside [`encode_tags`] output, used to pre-filter the
/// encoded column in the store.
pub fn encoded_tag_fragment(term: &str) -> String {
    let quoted = serde_json::to_string(term).unwrap_or_default();
    quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(term)
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn draft() -> PromptDraft {
        PromptDraft {
            title: Some("  Title  ".into()),
            description: Some("Description".into()),
            content: Some("Content".into()),
            category: None,
            tags: Some(vec!["a".into()]),
            author: None,
        }
    }

    #[test]
    fn valid_draft_is_trimmed_and_defaulted() {
        let prompt = NewPrompt::validate(draft()).expect("valid draft");
        assert_eq!(prompt.title(), "Title");
        assert_eq!(prompt.category(), PromptCategory::Text);
        assert_eq!(prompt.author(), ANONYMOUS_AUTHOR);
    }

    #[test]
    fn blank_author_becomes_anonymous() {
        let mut input = draft();
        input.author = Some("   ".into());
        assert_eq!(
            NewPrompt::validate(input).expect("valid").author(),
            ANONYMOUS_AUTHOR
        );

        let mut input = draft();
        input.author = Some(" Ada ".into());
        assert_eq!(NewPrompt::validate(input).expect("valid").author(), "Ada");
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut input = draft();
        input.title = Some("   ".into());
        input.content = None;
        assert_eq!(
            NewPrompt::validate(input),
            Err(PromptValidationError::MissingTitle)
        );

        let mut input = draft();
        input.description = None;
        assert_eq!(
            NewPrompt::validate(input).map_err(|err| err.to_string()),
            Err("Description is required".to_string())
        );

        let mut input = draft();
        input.content = Some("\n".into());
        assert_eq!(
            NewPrompt::validate(input),
            Err(PromptValidationError::MissingContent)
        );
    }

    #[test]
    fn tags_must_be_present_and_non_empty() {
        let mut input = draft();
        input.tags = Some(Vec::new());
        assert_eq!(
            NewPrompt::validate(input),
            Err(PromptValidationError::MissingTags)
        );

        let mut input = draft();
        input.tags = None;
        assert_eq!(
            NewPrompt::validate(input).map_err(|err| err.to_string()),
            Err("At least one tag is required".to_string())
        );
    }

    #[test]
    fn delta_accepts_only_unit_steps() {
        assert_eq!(VoteDelta::from_json(Some(&json!(1))), Ok(VoteDelta::Up));
        assert_eq!(VoteDelta::from_json(Some(&json!(-1))), Ok(VoteDelta::Down));
        assert_eq!(VoteDelta::from_json(Some(&json!(1.0))), Ok(VoteDelta::Up));

        for rejected in [json!(0), json!(2), json!(-2), json!(0.5), json!("1"), json!(true), json!(null)] {
            assert_eq!(
                VoteDelta::from_json(Some(&rejected)),
                Err(PromptValidationError::InvalidDelta),
                "{rejected} should be rejected"
            );
        }
        assert_eq!(
            VoteDelta::from_json(None),
            Err(PromptValidationError::InvalidDelta)
        );
    }

    #[test]
    fn tags_round_trip_through_encoding() {
        let tags = vec!["react".to_string(), "say \"hi\"".to_string()];
        let encoded = encode_tags(&tags);
        assert_eq!(decode_tags(&encoded).expect("decode"), tags);
        assert!(decode_tags("not json").is_err());
        assert!(decode_tags("{\"a\":1}").is_err());
    }

    #[test]
    fn encoded_fragment_matches_encoded_column() {
        let encoded = encode_tags(&["say \"hi\"".to_string()]);
        assert!(encoded.contains(&encoded_tag_fragment("\"hi")));
        assert_eq!(encoded_tag_fragment("plain"), "plain");
    }
}
