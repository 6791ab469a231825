//! The quiz attempt state machine.
//!
//! An [`Attempt`] walks a user through an ordered question set, stores their
//! answers, enforces the optional time limit and grades exactly once. After
//! grading every mutating call is ignored, so a timer-driven submission and a
//! user-driven one can race freely: the first one wins and the second is a
//! no-op.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{Span, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::QuizSettings;
use crate::grading::{self, QuizResult};
use crate::models::{Answer, Question};
use crate::timer::{Clock, Countdown, SystemClock};

/// Receives each result once, at the moment of grading.
pub type CompletionCallback = Box<dyn FnMut(&QuizResult)>;

/// Where an attempt is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// Answering questions; `index` is the question on screen.
    InProgress { index: usize },
    /// The user asked to submit and has to confirm.
    AwaitingConfirmation { index: usize, unanswered: usize },
    /// Terminal. Holds the one result of this attempt.
    Graded(QuizResult),
}

/// Outcome of polling the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still open. `remaining` is `None` without a time limit.
    Running { remaining: Option<Duration> },
    /// The time limit ran out and this tick graded the attempt.
    TimedOut,
    /// Already graded.
    Idle,
}

pub struct Attempt {
    id: Uuid,
    number: u32,
    questions: Vec<Question>,
    settings: QuizSettings,
    answers: HashMap<String, Answer>,
    state: AttemptState,
    countdown: Countdown,
    on_complete: Option<CompletionCallback>,
    span: Span,
}

impl Attempt {
    /// Starts an attempt timed by the system clock.
    pub fn new(questions: Vec<Question>, settings: QuizSettings) -> Self {
        Self::with_clock(questions, settings, Rc::new(SystemClock))
    }

    /// Starts an attempt timed by `clock`. The countdown starts immediately.
    pub fn with_clock(
        questions: Vec<Question>,
        settings: QuizSettings,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("attempt", id = %id, number = 1u32);
        span.in_scope(|| {
            info!(
                questions = questions.len(),
                time_limit_secs = settings.time_limit.map(|limit| limit.as_secs()),
                "attempt started"
            )
        });

        Self {
            id,
            number: 1,
            countdown: Countdown::start(clock, settings.time_limit),
            questions,
            settings,
            answers: HashMap::new(),
            state: AttemptState::InProgress { index: 0 },
            on_complete: None,
            span,
        }
    }

    /// Registers the callback that receives every result.
    pub fn on_complete(&mut self, callback: impl FnMut(&QuizResult) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 1-based; increases on every successful [`reset`](Self::reset).
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question on screen, `None` once graded.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            AttemptState::InProgress { index }
            | AttemptState::AwaitingConfirmation { index, .. } => Some(index),
            AttemptState::Graded(_) => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.questions.get(index))
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            AttemptState::Graded(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_graded(&self) -> bool {
        matches!(self.state, AttemptState::Graded(_))
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| self.is_answered(&question.id))
            .count()
    }

    pub fn unanswered_count(&self) -> usize {
        self.total_questions() - self.answered_count()
    }

    pub fn elapsed(&self) -> Duration {
        self.countdown.elapsed()
    }

    /// Time left; `None` without a time limit.
    pub fn remaining(&self) -> Option<Duration> {
        self.countdown.remaining()
    }

    /// Whether [`reset`](Self::reset) would start another attempt.
    pub fn can_retry(&self) -> bool {
        self.settings
            .max_attempts
            .is_none_or(|max_attempts| self.number < max_attempts)
    }

    /// Stores or replaces the answer for `question_id`.
    ///
    /// An empty selection or blank text clears the stored answer. Returns
    /// whether the answer was accepted.
    pub fn answer(&mut self, question_id: &str, answer: Answer) -> bool {
        let _span = self.span.clone().entered();
        if !self.accepts_input() {
            debug!(question = question_id, "answer ignored, attempt not in progress");
            return false;
        }
        if !self.questions.iter().any(|question| question.id == question_id) {
            warn!(question = question_id, "answer for unknown question ignored");
            return false;
        }

        if answer.is_empty() {
            self.answers.remove(question_id);
        } else {
            self.answers.insert(question_id.to_string(), answer);
        }
        true
    }

    /// Selects `option_id` on a choice question.
    ///
    /// Exclusive questions replace the selection; multiple choice toggles
    /// membership.
    pub fn toggle_choice(&mut self, question_id: &str, option_id: &str) -> bool {
        let _span = self.span.clone().entered();
        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            warn!(question = question_id, "choice for unknown question ignored");
            return false;
        };
        if !question.kind.is_choice() {
            return false;
        }

        let answer = if question.kind.is_exclusive() {
            Answer::choice(option_id)
        } else {
            let mut ids = match self.answers.get(question_id) {
                Some(Answer::Choices(ids)) => ids.clone(),
                _ => Default::default(),
            };
            if !ids.remove(option_id) {
                ids.insert(option_id.to_string());
            }
            Answer::Choices(ids)
        };
        self.answer(question_id, answer)
    }

    /// Moves to `index`, clamped to the question range.
    pub fn go_to(&mut self, index: usize) -> bool {
        let _span = self.span.clone().entered();
        if !self.expire_if_due() {
            return false;
        }
        let AttemptState::InProgress { index: current } = &mut self.state else {
            return false;
        };
        *current = index.min(self.questions.len().saturating_sub(1));
        true
    }

    pub fn next(&mut self) -> bool {
        match self.state {
            AttemptState::InProgress { index } => self.go_to(index.saturating_add(1)),
            _ => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.state {
            AttemptState::InProgress { index } => self.go_to(index.saturating_sub(1)),
            _ => false,
        }
    }

    /// Opens the submit confirmation and returns the unanswered count.
    pub fn request_submit(&mut self) -> Option<usize> {
        let _span = self.span.clone().entered();
        if !self.expire_if_due() {
            return None;
        }
        let AttemptState::InProgress { index } = self.state else {
            return None;
        };

        let unanswered = self.unanswered_count();
        debug!(unanswered, "submit requested");
        self.state = AttemptState::AwaitingConfirmation { index, unanswered };
        Some(unanswered)
    }

    /// Closes the submit confirmation.
    pub fn cancel_submit(&mut self) -> bool {
        let _span = self.span.clone().entered();
        if !self.expire_if_due() {
            return false;
        }
        let AttemptState::AwaitingConfirmation { index, .. } = self.state else {
            return false;
        };
        self.state = AttemptState::InProgress { index };
        true
    }

    /// Grades the attempt, or returns the existing result if already graded.
    ///
    /// Returns `None` when called without a pending confirmation.
    pub fn confirm_submit(&mut self) -> Option<&QuizResult> {
        let _span = self.span.clone().entered();
        match self.state {
            AttemptState::AwaitingConfirmation { .. } => {
                let timed_out = self.countdown.is_expired();
                self.finish(timed_out);
            }
            AttemptState::Graded(_) => {
                debug!("already graded, returning cached result");
            }
            AttemptState::InProgress { .. } => {
                self.expire_if_due();
            }
        }
        self.result()
    }

    /// Polls the countdown and forces the submission once time is up.
    pub fn tick(&mut self) -> Tick {
        let _span = self.span.clone().entered();
        if self.is_graded() {
            return Tick::Idle;
        }
        if self.countdown.is_expired() {
            self.finish(true);
            return Tick::TimedOut;
        }
        Tick::Running {
            remaining: self.countdown.remaining(),
        }
    }

    /// Discards answers and the result and starts over at the first question.
    ///
    /// Refused once `max_attempts` is used up.
    pub fn reset(&mut self) -> bool {
        if !self.can_retry() {
            let _span = self.span.clone().entered();
            info!("retry refused, no attempts left");
            return false;
        }

        self.id = Uuid::new_v4();
        self.number += 1;
        self.span = info_span!("attempt", id = %self.id, number = self.number);
        self.answers.clear();
        self.state = AttemptState::InProgress { index: 0 };
        self.countdown.restart();
        let _span = self.span.clone().entered();
        info!("attempt restarted");
        true
    }

    /// Whether answers may still change. Forces the timeout submission if due.
    fn accepts_input(&mut self) -> bool {
        self.expire_if_due() && matches!(self.state, AttemptState::InProgress { .. })
    }

    /// Grades on expiry. Returns false once graded.
    fn expire_if_due(&mut self) -> bool {
        if self.is_graded() {
            return false;
        }
        if self.countdown.is_expired() {
            self.finish(true);
            return false;
        }
        true
    }

    fn finish(&mut self, timed_out: bool) {
        self.countdown.stop();
        let elapsed = self.countdown.elapsed();
        let time_spent = match self.countdown.limit() {
            Some(limit) => elapsed.min(limit),
            None => elapsed,
        };

        let result = grading::grade(
            &self.questions,
            &self.answers,
            self.settings.passing_threshold,
            time_spent,
            timed_out,
        );
        info!(
            earned = result.earned_points,
            total = result.total_points,
            percentage = result.percentage,
            passed = result.passed,
            timed_out,
            "attempt graded"
        );

        if let Some(callback) = self.on_complete.as_mut() {
            callback(&result);
        }
        self.state = AttemptState::Graded(result);
    }
}

impl fmt::Debug for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempt")
            .field("id", &self.id)
            .field("number", &self.number)
            .field("questions", &self.questions.len())
            .field("answered", &self.answers.len())
            .field("state", &self.state)
            .field("countdown", &self.countdown)
            .finish()
    }
}
