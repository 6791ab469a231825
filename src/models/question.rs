use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

fn default_points() -> u32 {
    1
}

/// How a question is answered and graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionKind {
    /// Whether answers are option ids rather than free text.
    pub fn is_choice(self) -> bool {
        !matches!(self, Self::ShortAnswer)
    }

    /// Whether selecting an option replaces the previous selection.
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::SingleChoice | Self::TrueFalse)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single choice",
            Self::MultipleChoice => "Multiple choice",
            Self::TrueFalse => "True / False",
            Self::ShortAnswer => "Short answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }
}

/// A quiz question. Never mutated once an attempt has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Optional code snippet shown under the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<AnswerOption>,
    /// Canonical answer for short answer, or "true"/"false" for true/false
    /// questions declared without options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    fn bare(id: impl Into<String>, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            code: None,
            options: Vec::new(),
            correct_answer: None,
            points: default_points(),
            explanation: None,
        }
    }

    pub fn single_choice(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Self {
        Self {
            options,
            ..Self::bare(id, text, QuestionKind::SingleChoice)
        }
    }

    pub fn multiple_choice(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Self {
        Self {
            options,
            ..Self::bare(id, text, QuestionKind::MultipleChoice)
        }
    }

    /// True/false question with the standard `true` and `false` options.
    pub fn true_false(id: impl Into<String>, text: impl Into<String>, answer: bool) -> Self {
        Self {
            options: Self::true_false_options(Some(answer)),
            ..Self::bare(id, text, QuestionKind::TrueFalse)
        }
    }

    pub fn short_answer(
        id: impl Into<String>,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            correct_answer: Some(correct_answer.into()),
            ..Self::bare(id, text, QuestionKind::ShortAnswer)
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// `true` / `false` options, flagged from a canonical value when one is known.
    pub fn true_false_options(answer: Option<bool>) -> Vec<AnswerOption> {
        vec![
            AnswerOption::new("true", "True", answer == Some(true)),
            AnswerOption::new("false", "False", answer == Some(false)),
        ]
    }

    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == id)
    }

    pub fn correct_option_ids(&self) -> BTreeSet<&str> {
        self.options
            .iter()
            .filter(|option| option.is_correct)
            .map(|option| option.id.as_str())
            .collect()
    }
}
