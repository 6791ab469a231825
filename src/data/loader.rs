use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::QuizSettings;
use crate::models::{Question, QuestionKind};

/// Error type for loading a quiz definition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse quiz JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("quiz must contain at least one question")]
    Empty,

    #[error("duplicate question id '{0}'")]
    DuplicateQuestion(String),

    #[error("question '{question}' has duplicate option id '{option}'")]
    DuplicateOption { question: String, option: String },

    #[error("question '{0}' has no options")]
    MissingOptions(String),

    #[error("question '{0}' has no correct answer")]
    MissingCorrectAnswer(String),

    #[error("single choice question '{0}' has more than one correct option")]
    AmbiguousSingleChoice(String),

    #[error("true/false question '{question}' has invalid answer '{answer}'")]
    InvalidTrueFalse { question: String, answer: String },
}

/// A quiz file: questions plus optional settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizDefinition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub passing_threshold: Option<u8>,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// Settings declared by the file, on top of the defaults.
    pub fn settings(&self) -> QuizSettings {
        let defaults = QuizSettings::default();
        QuizSettings {
            passing_threshold: self.passing_threshold.unwrap_or(defaults.passing_threshold),
            time_limit: self.time_limit_secs.map(Duration::from_secs),
            max_attempts: self.max_attempts,
        }
    }
}

/// Loads and validates a quiz from a JSON file.
///
/// The file holds either a bare array of questions or an object with a
/// `questions` array and optional settings.
pub fn load_quiz_from_json<P: AsRef<Path>>(path: P) -> Result<QuizDefinition, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_quiz(&content)
}

/// Parses and validates quiz JSON.
pub fn parse_quiz(json: &str) -> Result<QuizDefinition, LoadError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let mut definition = if value.is_array() {
        QuizDefinition {
            questions: serde_json::from_value(value)?,
            ..QuizDefinition::default()
        }
    } else {
        serde_json::from_value(value)?
    };

    if definition.questions.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut seen = HashSet::new();
    for question in &mut definition.questions {
        if !seen.insert(question.id.clone()) {
            return Err(LoadError::DuplicateQuestion(question.id.clone()));
        }
        normalize(question)?;
        validate(question)?;
    }

    Ok(definition)
}

/// Gives true/false questions declared with only `correct_answer` their options.
fn normalize(question: &mut Question) -> Result<(), LoadError> {
    if question.kind != QuestionKind::TrueFalse || !question.options.is_empty() {
        return Ok(());
    }
    let Some(answer) = question.correct_answer.as_deref() else {
        return Err(LoadError::MissingCorrectAnswer(question.id.clone()));
    };

    let value = match answer.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            return Err(LoadError::InvalidTrueFalse {
                question: question.id.clone(),
                answer: answer.to_string(),
            });
        }
    };
    question.options = Question::true_false_options(Some(value));
    Ok(())
}

fn validate(question: &Question) -> Result<(), LoadError> {
    if question.kind == QuestionKind::ShortAnswer {
        return match question.correct_answer.as_deref() {
            Some(answer) if !answer.trim().is_empty() => Ok(()),
            _ => Err(LoadError::MissingCorrectAnswer(question.id.clone())),
        };
    }

    if question.options.is_empty() {
        return Err(LoadError::MissingOptions(question.id.clone()));
    }

    let mut option_ids = HashSet::new();
    for option in &question.options {
        if !option_ids.insert(option.id.as_str()) {
            return Err(LoadError::DuplicateOption {
                question: question.id.clone(),
                option: option.id.clone(),
            });
        }
    }

    match question.correct_option_ids().len() {
        0 => Err(LoadError::MissingCorrectAnswer(question.id.clone())),
        1 => Ok(()),
        _ if question.kind.is_exclusive() => {
            Err(LoadError::AmbiguousSingleChoice(question.id.clone()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL: &str = r#"{
        "title": "Ownership basics",
        "passing_threshold": 80,
        "time_limit_secs": 300,
        "questions": [
            {
                "id": "q1",
                "text": "Which trait enables implicit copies?",
                "type": "single_choice",
                "options": [
                    { "id": "a", "text": "Clone" },
                    { "id": "b", "text": "Copy", "is_correct": true }
                ]
            },
            {
                "id": "q2",
                "text": "Box<T> lives on the heap.",
                "type": "true_false",
                "correct_answer": "True"
            },
            {
                "id": "q3",
                "text": "Name the borrow checker mascot.",
                "type": "short_answer",
                "correct_answer": "Ferris",
                "points": 2,
                "explanation": "Ferris the crab."
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_definition() {
        let quiz = parse_quiz(FULL).unwrap();
        assert_eq!(quiz.title.as_deref(), Some("Ownership basics"));
        assert_eq!(quiz.questions.len(), 3);

        let settings = quiz.settings();
        assert_eq!(settings.passing_threshold, 80);
        assert_eq!(settings.time_limit, Some(Duration::from_secs(300)));
        assert_eq!(settings.max_attempts, None);

        let true_false = &quiz.questions[1];
        assert_eq!(true_false.options.len(), 2);
        assert!(true_false.option("true").unwrap().is_correct);
    }

    #[test]
    fn test_parse_bare_array_uses_defaults() {
        let json = r#"[{ "id": "q", "text": "?", "type": "short_answer", "correct_answer": "x" }]"#;
        let quiz = parse_quiz(json).unwrap();
        assert!(quiz.title.is_none());
        assert_eq!(quiz.settings(), QuizSettings::default());
    }

    #[test]
    fn test_rejects_invalid_quizzes() {
        assert!(matches!(parse_quiz("[]"), Err(LoadError::Empty)));
        assert!(matches!(parse_quiz("{"), Err(LoadError::Parse(_))));

        let duplicate = r#"[
            { "id": "q", "text": "?", "type": "short_answer", "correct_answer": "x" },
            { "id": "q", "text": "?", "type": "short_answer", "correct_answer": "y" }
        ]"#;
        assert!(matches!(
            parse_quiz(duplicate),
            Err(LoadError::DuplicateQuestion(id)) if id == "q"
        ));

        let no_options = r#"[{ "id": "q", "text": "?", "type": "multiple_choice" }]"#;
        assert!(matches!(parse_quiz(no_options), Err(LoadError::MissingOptions(_))));

        let no_correct = r#"[{ "id": "q", "text": "?", "type": "single_choice",
            "options": [{ "id": "a", "text": "A" }] }]"#;
        assert!(matches!(parse_quiz(no_correct), Err(LoadError::MissingCorrectAnswer(_))));

        let ambiguous = r#"[{ "id": "q", "text": "?", "type": "single_choice",
            "options": [{ "id": "a", "text": "A", "is_correct": true },
                        { "id": "b", "text": "B", "is_correct": true }] }]"#;
        assert!(matches!(parse_quiz(ambiguous), Err(LoadError::AmbiguousSingleChoice(_))));

        let duplicate_option = r#"[{ "id": "q", "text": "?", "type": "multiple_choice",
            "options": [{ "id": "a", "text": "A", "is_correct": true },
                        { "id": "a", "text": "B" }] }]"#;
        assert!(matches!(
            parse_quiz(duplicate_option),
            Err(LoadError::DuplicateOption { option, .. }) if option == "a"
        ));

        let blank = r#"[{ "id": "q", "text": "?", "type": "short_answer",
            "correct_answer": "  " }]"#;
        assert!(matches!(parse_quiz(blank), Err(LoadError::MissingCorrectAnswer(_))));

        let bad_tf = r#"[{ "id": "q", "text": "?", "type": "true_false",
            "correct_answer": "maybe" }]"#;
        assert!(matches!(parse_quiz(bad_tf), Err(LoadError::InvalidTrueFalse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let quiz = load_quiz_from_json(file.path()).unwrap();
        assert_eq!(quiz.questions[2].points, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_quiz_from_json(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}
