//! Test doubles for the controller's seams: a scripted backend, a silent
//! clip player, and a view that records every call.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use wordflash_core::SurvivalSummary;
use wordflash_core::model::{
    Attempt, AttemptOutcome, FinishSummary, SessionId, SessionPlan,
};

use crate::api::{SessionBackend, StartSessionRequest};
use crate::audio::{ClipPlayer, PlaybackError};
use crate::error::ApiError;
use crate::view::GameView;

/// In-memory backend behaving like the real server: it stores attempts,
/// decrements survival lives on wrong answers, and derives the finish
/// summary from what was submitted.
pub struct FakeBackend {
    plan: SessionPlan,
    survival_lives: Option<u32>,
    wrongs: AtomicU32,
    attempts: Mutex<Vec<Attempt>>,
    fail_start: bool,
    fail_attempts: bool,
    fail_finish: bool,
}

impl FakeBackend {
    #[must_use]
    pub fn new(plan: SessionPlan) -> Self {
        let survival_lives = if plan.mode.has_lives() {
            Some(plan.lives_start.unwrap_or(3))
        } else {
            None
        };
        Self {
            plan,
            survival_lives,
            wrongs: AtomicU32::new(0),
            attempts: Mutex::new(Vec::new()),
            fail_start: false,
            fail_attempts: false,
            fail_finish: false,
        }
    }

    #[must_use]
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    #[must_use]
    pub fn failing_attempts(mut self) -> Self {
        self.fail_attempts = true;
        self
    }

    #[must_use]
    pub fn failing_finish(mut self) -> Self {
        self.fail_finish = true;
        self
    }

    /// All attempts received so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    fn rejected() -> ApiError {
        ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn start_session(&self, _req: &StartSessionRequest) -> Result<SessionPlan, ApiError> {
        if self.fail_start {
            return Err(Self::rejected());
        }
        Ok(self.plan.clone())
    }

    async fn submit_attempt(
        &self,
        _session: SessionId,
        attempt: &Attempt,
    ) -> Result<AttemptOutcome, ApiError> {
        if self.fail_attempts {
            return Err(Self::rejected());
        }
        self.attempts.lock().unwrap().push(attempt.clone());

        let Some(lives_start) = self.survival_lives else {
            return Ok(AttemptOutcome {
                ok: true,
                lives_left: None,
                finished: false,
            });
        };

        if !attempt.correct {
            self.wrongs.fetch_add(1, Ordering::SeqCst);
        }
        let lives_left = lives_start.saturating_sub(self.wrongs.load(Ordering::SeqCst));
        Ok(AttemptOutcome {
            ok: true,
            lives_left: Some(lives_left),
            finished: lives_left == 0,
        })
    }

    async fn finish_session(&self, session: SessionId) -> Result<FinishSummary, ApiError> {
        if self.fail_finish {
            return Err(Self::rejected());
        }
        let attempts = self.attempts.lock().unwrap();
        let total = attempts.len();
        let correct = attempts.iter().filter(|a| a.correct).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        let avg_reaction_ms = if total == 0 {
            0.0
        } else {
            attempts.iter().map(|a| f64::from(a.reaction_ms)).sum::<f64>() / total as f64
        };
        Ok(FinishSummary {
            session_id: session,
            accuracy,
            avg_reaction_ms,
            next_exposure_ms: self.plan.exposure_ms,
        })
    }
}

/// A clip player that never makes a sound.
#[derive(Debug, Default)]
pub struct NullPlayer;

#[async_trait]
impl ClipPlayer for NullPlayer {
    async fn play(&self, _path: &str) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn stop(&self) {}
}

/// Everything a view was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Status(String),
    Prompt(String),
    Conceal,
    Options { options: Vec<String>, letters_grid: bool },
    Typed(String),
    Feedback { correct: bool, reaction_ms: u32 },
    Lives { left: u32, start: u32 },
    Progress { answered: usize, total: usize },
    Result { stars: u8, survival: bool },
    Reset,
}

/// View that records calls for assertions.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    /// Events matching a predicate, e.g. all prompts.
    pub fn filtered(&self, pred: impl Fn(&ViewEvent) -> bool) -> Vec<&ViewEvent> {
        self.events.iter().filter(|event| pred(event)).collect()
    }
}

#[async_trait]
impl GameView for RecordingView {
    async fn set_status(&mut self, text: &str) {
        self.events.push(ViewEvent::Status(text.to_string()));
    }

    async fn show_prompt(&mut self, text: &str) {
        self.events.push(ViewEvent::Prompt(text.to_string()));
    }

    async fn conceal_prompt(&mut self) {
        self.events.push(ViewEvent::Conceal);
    }

    async fn show_options(&mut self, options: &[String], letters_grid: bool) {
        self.events.push(ViewEvent::Options {
            options: options.to_vec(),
            letters_grid,
        });
    }

    async fn show_typed(&mut self, typed: &str) {
        self.events.push(ViewEvent::Typed(typed.to_string()));
    }

    async fn show_feedback(&mut self, correct: bool, reaction_ms: u32) {
        self.events.push(ViewEvent::Feedback {
            correct,
            reaction_ms,
        });
    }

    async fn show_lives(&mut self, left: u32, start: u32) {
        self.events.push(ViewEvent::Lives { left, start });
    }

    async fn show_progress(&mut self, answered: usize, total: usize) {
        self.events.push(ViewEvent::Progress { answered, total });
    }

    async fn show_result(
        &mut self,
        summary: &FinishSummary,
        stars: u8,
        survival: Option<&SurvivalSummary>,
    ) {
        let _ = summary;
        self.events.push(ViewEvent::Result {
            stars,
            survival: survival.is_some(),
        });
    }

    async fn reset(&mut self) {
        self.events.push(ViewEvent::Reset);
    }
}
