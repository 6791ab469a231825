mod loader;

pub use loader::{LoadError, QuizDefinition, load_quiz_from_json, parse_quiz};
