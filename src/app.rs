use std::rc::Rc;

use crate::attempt::{Attempt, AttemptState, CompletionCallback, Tick};
use crate::config::QuizSettings;
use crate::grading::QuizResult;
use crate::models::{Answer, Question};
use crate::timer::{Clock, SystemClock};

/// Which screen the terminal front end shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Quiz,
    ConfirmSubmit,
    Result,
}

/// Front-end state around a single [`Attempt`].
pub struct App {
    title: Option<String>,
    questions: Vec<Question>,
    settings: QuizSettings,
    clock: Rc<dyn Clock>,
    attempt: Option<Attempt>,
    on_complete: Option<CompletionCallback>,
    cursor: usize,
    text_input: String,
    result_scroll: usize,
}

impl App {
    pub fn new(questions: Vec<Question>, settings: QuizSettings) -> Self {
        Self::with_clock(questions, settings, Rc::new(SystemClock))
    }

    pub fn with_clock(
        questions: Vec<Question>,
        settings: QuizSettings,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            title: None,
            questions,
            settings,
            clock,
            attempt: None,
            on_complete: None,
            cursor: 0,
            text_input: String::new(),
            result_scroll: 0,
        }
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    /// Callback handed to the attempt when the quiz starts.
    pub fn set_on_complete(&mut self, callback: CompletionCallback) {
        self.on_complete = Some(callback);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.attempt.as_ref().and_then(Attempt::result)
    }

    pub fn screen(&self) -> Screen {
        match self.attempt.as_ref().map(Attempt::state) {
            None => Screen::Welcome,
            Some(AttemptState::InProgress { .. }) => Screen::Quiz,
            Some(AttemptState::AwaitingConfirmation { .. }) => Screen::ConfirmSubmit,
            Some(AttemptState::Graded(_)) => Screen::Result,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.attempt.as_ref().and_then(Attempt::current_question)
    }

    pub fn start_quiz(&mut self) {
        if self.attempt.is_some() {
            return;
        }
        let mut attempt = Attempt::with_clock(
            self.questions.clone(),
            self.settings,
            Rc::clone(&self.clock),
        );
        if let Some(callback) = self.on_complete.take() {
            attempt.on_complete(callback);
        }
        self.attempt = Some(attempt);
        self.sync_question();
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    /// Selects (or toggles) the option under the cursor.
    pub fn select_option(&mut self) {
        let Some(question) = self.current_question() else {
            return;
        };
        let Some(option) = question.options.get(self.cursor) else {
            return;
        };
        let (question_id, option_id) = (question.id.clone(), option.id.clone());

        if let Some(attempt) = self.attempt.as_mut() {
            attempt.toggle_choice(&question_id, &option_id);
        }
    }

    pub fn input_char(&mut self, c: char) {
        self.text_input.push(c);
        self.store_text();
    }

    pub fn input_backspace(&mut self) {
        self.text_input.pop();
        self.store_text();
    }

    pub fn next_question(&mut self) {
        if self.attempt.as_mut().is_some_and(Attempt::next) {
            self.sync_question();
        }
    }

    pub fn previous_question(&mut self) {
        if self.attempt.as_mut().is_some_and(Attempt::previous) {
            self.sync_question();
        }
    }

    pub fn request_submit(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.request_submit();
        }
    }

    pub fn cancel_submit(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.cancel_submit();
        }
    }

    pub fn confirm_submit(&mut self) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.confirm_submit();
        }
        self.result_scroll = 0;
    }

    pub fn tick(&mut self) -> Tick {
        match self.attempt.as_mut() {
            Some(attempt) => attempt.tick(),
            None => Tick::Idle,
        }
    }

    /// Starts another attempt if the retry cap allows it.
    pub fn retry(&mut self) -> bool {
        let restarted = self.attempt.as_mut().is_some_and(Attempt::reset);
        if restarted {
            self.result_scroll = 0;
            self.sync_question();
        }
        restarted
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.result_line_count().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Lines in the results breakdown: one per question plus one per explanation.
    pub fn result_line_count(&self) -> usize {
        self.questions.len()
            + self
                .questions
                .iter()
                .filter(|q| q.explanation.is_some())
                .count()
    }

    fn option_count(&self) -> usize {
        self.current_question().map_or(0, |q| q.options.len())
    }

    fn store_text(&mut self) {
        let Some(question_id) = self.current_question().map(|q| q.id.clone()) else {
            return;
        };
        let text = self.text_input.clone();
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.answer(&question_id, Answer::Text(text));
        }
    }

    /// Resets the cursor and reloads any text already typed for the question.
    fn sync_question(&mut self) {
        self.cursor = 0;
        self.text_input = self
            .current_question()
            .and_then(|q| self.attempt.as_ref()?.answer_for(&q.id))
            .and_then(Answer::as_text)
            .unwrap_or_default()
            .to_string();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::AnswerOption;
    use crate::timer::ManualClock;

    fn questions() -> Vec<Question> {
        vec![
            Question::single_choice(
                "q1",
                "Pick b",
                vec![
                    AnswerOption::new("a", "A", false),
                    AnswerOption::new("b", "B", true),
                ],
            ),
            Question::short_answer("q2", "Say hi", "hi"),
        ]
    }

    #[test]
    fn test_screens_follow_attempt_state() {
        let mut app = App::new(questions(), QuizSettings::default());
        assert_eq!(app.screen(), Screen::Welcome);

        app.start_quiz();
        assert_eq!(app.screen(), Screen::Quiz);

        app.request_submit();
        assert_eq!(app.screen(), Screen::ConfirmSubmit);

        app.cancel_submit();
        assert_eq!(app.screen(), Screen::Quiz);

        app.request_submit();
        app.confirm_submit();
        assert_eq!(app.screen(), Screen::Result);
    }

    #[test]
    fn test_answering_through_the_ui() {
        let mut app = App::new(questions(), QuizSettings::default());
        app.start_quiz();

        app.select_next_option();
        app.select_option();
        app.next_question();
        for c in "Hi ".chars() {
            app.input_char(c);
        }
        app.input_backspace();

        app.previous_question();
        assert_eq!(app.cursor(), 0);
        app.next_question();
        assert_eq!(app.text_input(), "Hi");

        app.request_submit();
        app.confirm_submit();
        let result = app.result().unwrap();
        assert_eq!(result.earned_points, 2);
        assert!(result.passed);
    }

    #[test]
    fn test_results_scroll_reaches_explanations() {
        let questions = questions()
            .into_iter()
            .map(|q| q.with_explanation("because"))
            .collect();
        let mut app = App::new(questions, QuizSettings::default());
        app.start_quiz();
        app.request_submit();
        app.confirm_submit();
        assert_eq!(app.result_line_count(), 4);

        for _ in 0..10 {
            app.scroll_results_down();
        }
        assert_eq!(app.result_scroll(), 3);

        app.scroll_results_up();
        assert_eq!(app.result_scroll(), 2);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut app = App::new(questions(), QuizSettings::default());
        app.start_quiz();
        app.select_previous_option();
        assert_eq!(app.cursor(), 1);
        app.select_next_option();
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn test_timeout_moves_to_results_and_retry() {
        let clock = ManualClock::new();
        let settings = QuizSettings::default().with_time_limit(Duration::from_secs(60));
        let mut app = App::with_clock(questions(), settings, Rc::new(clock.clone()));
        app.start_quiz();
        app.next_question();

        clock.advance(Duration::from_secs(61));
        assert_eq!(app.tick(), Tick::TimedOut);
        assert_eq!(app.screen(), Screen::Result);

        assert!(app.retry());
        assert_eq!(app.screen(), Screen::Quiz);
        assert_eq!(app.attempt().and_then(Attempt::current_index), Some(0));
    }
}
