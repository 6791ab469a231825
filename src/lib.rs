//! # quiz-attempt
//!
//! A quiz-taking engine: an attempt state machine with deterministic grading
//! and an optional time limit, plus a terminal front end that drives it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quiz_attempt::{Quiz, QuizError};
//!
//! fn main() -> Result<(), QuizError> {
//!     // Load questions and settings from a JSON file
//!     let quiz = Quiz::from_json("questions.json")?;
//!
//!     // Run the quiz in the terminal and collect the last result
//!     if let Some(result) = quiz.run()? {
//!         println!("{}% ({})", result.percentage, if result.passed { "pass" } else { "fail" });
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The engine can also be driven directly:
//!
//! ```rust
//! use quiz_attempt::{Answer, AnswerOption, Attempt, Question, QuizSettings};
//!
//! let questions = vec![Question::single_choice(
//!     "q1",
//!     "Which keyword makes a binding mutable?",
//!     vec![
//!         AnswerOption::new("a", "mut", true),
//!         AnswerOption::new("b", "var", false),
//!     ],
//! )];
//!
//! let mut attempt = Attempt::new(questions, QuizSettings::default());
//! attempt.answer("q1", Answer::choice("a"));
//! attempt.request_submit();
//! let result = attempt.confirm_submit().unwrap();
//! assert!(result.passed);
//! ```

mod app;
pub mod attempt;
pub mod config;
mod data;
pub mod grading;
mod models;
pub mod terminal;
pub mod timer;
mod ui;

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;
use tracing::info;

pub use app::{App, Screen};
pub use attempt::{Attempt, AttemptState, CompletionCallback, Tick};
pub use config::{ConfigError, DEFAULT_PASSING_THRESHOLD, DEFAULT_TICK_RATE, QuizSettings};
pub use data::{LoadError, QuizDefinition, load_quiz_from_json, parse_quiz};
pub use grading::{QuestionOutcome, QuizResult};
pub use models::{Answer, AnswerOption, Question, QuestionKind};
pub use timer::{Clock, ManualClock, SystemClock};

use terminal::{QuizTerminal, TerminalGuard};

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),

    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize result: {0}")]
    Export(#[from] serde_json::Error),
}

/// A quiz that can be run in the terminal.
pub struct Quiz {
    app: App,
    tick_rate: Duration,
}

impl Quiz {
    /// Create a new quiz from questions and settings.
    pub fn new(questions: Vec<Question>, settings: QuizSettings) -> Result<Self, QuizError> {
        settings.validate()?;
        Ok(Self {
            app: App::new(questions, settings),
            tick_rate: DEFAULT_TICK_RATE,
        })
    }

    /// Create a quiz from a loaded definition, using `settings` in place of
    /// the file's own settings.
    pub fn from_definition(
        definition: QuizDefinition,
        settings: QuizSettings,
    ) -> Result<Self, QuizError> {
        let mut quiz = Self::new(definition.questions, settings)?;
        quiz.app.set_title(definition.title);
        Ok(quiz)
    }

    /// Load a quiz and its settings from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use quiz_attempt::Quiz;
    ///
    /// let quiz = Quiz::from_json("questions.json").expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let definition = load_quiz_from_json(path)?;
        let settings = definition.settings();
        Self::from_definition(definition, settings)
    }

    /// How often the countdown is polled while waiting for input.
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Register a callback that receives every graded result.
    pub fn on_complete(mut self, callback: impl FnMut(&QuizResult) + 'static) -> Self {
        self.app.set_on_complete(Box::new(callback));
        self
    }

    /// Run the quiz in the terminal.
    ///
    /// Takes over the terminal until the user quits, then returns the result
    /// of the last graded attempt, if any.
    pub fn run(mut self) -> Result<Option<QuizResult>, QuizError> {
        {
            let mut guard = TerminalGuard::enter()?;
            run_event_loop(guard.terminal(), &mut self.app, self.tick_rate)?;
        }
        Ok(self.app.result().cloned())
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

/// Write a result as pretty JSON.
pub fn export_result<P: AsRef<Path>>(result: &QuizResult, path: P) -> Result<(), QuizError> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path.as_ref(), json)?;
    info!(path = %path.as_ref().display(), "result exported");
    Ok(())
}

fn run_event_loop(
    terminal: &mut QuizTerminal,
    app: &mut App,
    tick_rate: Duration,
) -> Result<(), QuizError> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(app, key) {
                    break;
                }
            }
        }

        if app.tick() == Tick::TimedOut {
            info!("time limit reached, answers submitted");
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.screen() {
        Screen::Welcome => handle_welcome_input(app, key.code),
        Screen::Quiz => handle_quiz_input(app, key),
        Screen::ConfirmSubmit => handle_confirm_input(app, key.code),
        Screen::Result => handle_result_input(app, key.code),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_quiz();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

fn handle_quiz_input(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            app.request_submit();
        }
        return false;
    }

    match key.code {
        KeyCode::Left => app.previous_question(),
        KeyCode::Right => app.next_question(),
        KeyCode::Esc => return true,
        _ => {
            let is_choice = app.current_question().is_some_and(|q| q.kind.is_choice());
            return if is_choice {
                handle_choice_input(app, key.code)
            } else {
                handle_text_input(app, key.code)
            };
        }
    }
    false
}

fn handle_choice_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_option(),
        KeyCode::Char('h') => app.previous_question(),
        KeyCode::Char('l') | KeyCode::Tab => app.next_question(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.request_submit(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_text_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) => app.input_char(c),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Enter | KeyCode::Tab => app.next_question(),
        _ => {}
    }
    false
}

fn handle_confirm_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_submit(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_submit(),
        _ => {}
    }
    false
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.retry();
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let questions = vec![
            Question::multiple_choice(
                "q1",
                "Pick a and c",
                vec![
                    AnswerOption::new("a", "A", true),
                    AnswerOption::new("b", "B", false),
                    AnswerOption::new("c", "C", true),
                ],
            ),
            Question::short_answer("q2", "Type ok", "ok"),
        ];
        App::new(questions, QuizSettings::default())
    }

    #[test]
    fn test_keyboard_walkthrough() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Enter));
        assert_eq!(app.screen(), Screen::Quiz);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('l'));

        // Letters are text on a short answer question.
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.text_input(), "ok");

        handle_input(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.screen(), Screen::ConfirmSubmit);

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.screen(), Screen::Result);
        let result = app.result().unwrap();
        assert_eq!(result.percentage, 100);

        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_cancel_and_retry_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Quiz);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.result().unwrap().passed);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.screen(), Screen::Quiz);
        assert!(app.result().is_none());
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut app = app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_input(&mut app, ctrl_c));
        press(&mut app, KeyCode::Enter);
        assert!(handle_input(&mut app, ctrl_c));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Quiz::new(Vec::new(), QuizSettings::default().with_passing_threshold(150))
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::Config(ConfigError::ThresholdOutOfRange(150))));
    }

    #[test]
    fn test_export_result() {
        let mut attempt = Attempt::new(app().questions().to_vec(), QuizSettings::default());
        attempt.request_submit();
        let result = attempt.confirm_submit().cloned().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        export_result(&result, &path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let parsed: QuizResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
