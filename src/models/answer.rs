use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A user's submitted answer for one question.
///
/// Choice questions always store a set of option ids, single choice included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choices(BTreeSet<String>),
    Text(String),
}

impl Answer {
    /// A single selected option.
    pub fn choice(id: impl Into<String>) -> Self {
        Self::Choices(BTreeSet::from([id.into()]))
    }

    /// A set of selected options. Duplicates collapse and order is irrelevant.
    pub fn choices<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(ids.into_iter().map(Into::into).collect())
    }

    /// Free-text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Empty selections and blank text count as no answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Choices(ids) => ids.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn contains(&self, option_id: &str) -> bool {
        matches!(self, Self::Choices(ids) if ids.contains(option_id))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Choices(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_ignore_order_and_duplicates() {
        assert_eq!(Answer::choices(["c", "a", "c"]), Answer::choices(["a", "c"]));
    }

    #[test]
    fn test_is_empty() {
        assert!(Answer::choices(Vec::<String>::new()).is_empty());
        assert!(Answer::text("   ").is_empty());
        assert!(!Answer::text(" x ").is_empty());
        assert!(!Answer::choice("a").is_empty());
    }

    #[test]
    fn test_deserialize_untagged() {
        let answer: Answer = serde_json::from_str(r#"["b", "a"]"#).unwrap();
        assert_eq!(answer, Answer::choices(["a", "b"]));

        let answer: Answer = serde_json::from_str(r#""Paris""#).unwrap();
        assert_eq!(answer.as_text(), Some("Paris"));
    }
}
