mod answer;
mod question;

pub use answer::Answer;
pub use question::{AnswerOption, Question, QuestionKind};
