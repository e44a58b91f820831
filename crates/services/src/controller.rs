use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use wordflash_core::model::{
    Attempt, ChildId, Difficulty, FinishSummary, GameMode, Item, Presentation, SessionId,
    SessionPlan, ThemeId,
};
use wordflash_core::{
    Clock, GameProgress, LetterBuffer, LetterPress, SurvivalSummary, stars_from_accuracy,
};

use crate::api::{SessionBackend, StartSessionRequest};
use crate::audio::{AudioFeedback, EffectEvent, VoiceEvent};
use crate::error::GameFlowError;
use crate::view::GameView;

//
// ─── PUBLIC TYPES ──────────────────────────────────────────────────────────────
//

/// What the player picked on the start screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartParams {
    pub child_id: ChildId,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub theme_id: ThemeId,
}

/// Delays the controller inserts between UI transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Pause after feedback before the next item is presented.
    pub feedback_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_millis(450),
        }
    }
}

/// Controller lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Loading,
    Presenting,
    AwaitingAnswer,
    Scoring,
    Finished,
}

/// Result of one presentation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// An item is on screen; the driver should collect an answer.
    AwaitingAnswer {
        options: Vec<String>,
        letters: bool,
    },
    /// The item list was exhausted and the session closed.
    Finished(SessionOutcome),
}

/// Result of answering one item.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub reaction_ms: u32,
    /// Set when the server ended the session (lives exhausted): the
    /// controller already ran the finish flow.
    pub session: Option<SessionOutcome>,
}

/// Result of one letter press in the letter-builder mode.
#[derive(Debug, Clone, PartialEq)]
pub enum LetterStep {
    /// Buffer is locked; the press was dropped.
    Ignored,
    /// Letter appended, word not complete yet.
    Typed,
    /// The word completed and was submitted as a single attempt.
    Submitted(AnswerOutcome),
}

/// Everything known once a session closes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub summary: FinishSummary,
    pub stars: u8,
    pub survival: Option<SurvivalSummary>,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

struct ActiveGame {
    plan: SessionPlan,
    progress: GameProgress,
    letters: LetterBuffer,
    shown_at: Option<Instant>,
}

/// Drives one game session: mode dispatch, timing, scoring and lives
/// bookkeeping.
///
/// State lives in a single owned `ActiveGame`, created on `start` and
/// dropped on `restart`. Anything scheduled against an old session finds no
/// active game afterwards and fails with `NoActiveSession` instead of
/// mutating a superseded session.
///
/// Reaction time is measured uniformly in every mode from the moment
/// `GameView::show_options` resolves, which is the point where options
/// become interactable.
pub struct GameController<V: GameView> {
    backend: Arc<dyn SessionBackend>,
    audio: AudioFeedback,
    view: V,
    clock: Clock,
    timing: TimingConfig,
    phase: GamePhase,
    game: Option<ActiveGame>,
}

impl<V: GameView> GameController<V> {
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>, audio: AudioFeedback, view: V) -> Self {
        Self {
            backend,
            audio,
            view,
            clock: Clock::Default,
            timing: TimingConfig::default(),
            phase: GamePhase::Idle,
            game: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn progress(&self) -> Option<&GameProgress> {
        self.game.as_ref().map(|game| &game.progress)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.game.as_ref().map(|game| game.plan.session_id)
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&Item> {
        let game = self.game.as_ref()?;
        game.plan.items.get(game.progress.index())
    }

    #[must_use]
    pub fn audio(&self) -> &AudioFeedback {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioFeedback {
        &mut self.audio
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Start a new session.
    ///
    /// Validates locally that a child profile is selected before any
    /// request goes out, then resets all progress and presents the first
    /// item state.
    ///
    /// # Errors
    ///
    /// `GameFlowError::NoChildSelected` without touching the server when no
    /// profile is selected; `GameFlowError::Api` when the start call fails,
    /// leaving the controller idle and restartable.
    pub async fn start(&mut self, params: StartParams) -> Result<(), GameFlowError> {
        if params.child_id.is_unset() {
            return Err(GameFlowError::NoChildSelected);
        }

        self.reset_local().await;
        self.phase = GamePhase::Loading;
        self.view.set_status("Loading…").await;

        let req = StartSessionRequest {
            child_id: params.child_id,
            mode: params.mode,
            difficulty: params.difficulty,
            theme_id: params.theme_id,
        };
        let plan = match self.backend.start_session(&req).await {
            Ok(plan) => plan,
            Err(err) => {
                self.phase = GamePhase::Idle;
                self.view.set_status("Ready").await;
                return Err(err.into());
            }
        };

        let lives = if plan.mode.has_lives() {
            let start = plan.lives_start.unwrap_or(3);
            Some((start, plan.lives_left.unwrap_or(start)))
        } else {
            None
        };
        let progress = GameProgress::new(self.clock.now(), lives);

        tracing::info!(
            session = %plan.session_id,
            mode = %plan.mode,
            items = plan.items.len(),
            "session started"
        );

        if plan.mode.has_lives() {
            self.view
                .show_lives(progress.lives_left(), progress.lives_start())
                .await;
        }
        self.view.set_status("Play!").await;

        self.game = Some(ActiveGame {
            plan,
            progress,
            letters: LetterBuffer::default(),
            shown_at: None,
        });
        self.phase = GamePhase::Presenting;

        self.audio.play(VoiceEvent::Start, true).await;
        Ok(())
    }

    /// Present the current item, or close the session when items ran out.
    ///
    /// Flash modes hold the prompt for the item's exposure window before
    /// concealing it; the other modes reveal everything at once.
    ///
    /// # Errors
    ///
    /// `NoActiveSession`/`NotPresenting` when called out of turn, and any
    /// `Api` error from the finish call on exhaustion.
    pub async fn advance(&mut self) -> Result<Step, GameFlowError> {
        let (index, total, mode, item) = {
            let game = self.game.as_ref().ok_or(GameFlowError::NoActiveSession)?;
            let index = game.progress.index();
            (
                index,
                game.plan.items.len(),
                game.plan.mode,
                game.plan.items.get(index).cloned(),
            )
        };
        if self.phase != GamePhase::Presenting {
            return Err(GameFlowError::NotPresenting);
        }

        let Some(item) = item else {
            debug_assert!(index >= total);
            return Ok(Step::Finished(self.finish().await?));
        };

        let letters = mode.presentation() == Presentation::Letters;
        match mode.presentation() {
            Presentation::Flash => {
                self.view.set_status("Watch the word…").await;
                self.audio.hint(VoiceEvent::Look, index).await;
                self.view.show_prompt(item.prompt_text()).await;

                sleep(Duration::from_millis(u64::from(item.exposure_ms))).await;

                self.view.conceal_prompt().await;
                self.view.set_status(mode.default_prompt()).await;
                self.audio.hint(VoiceEvent::Choose, index).await;
                self.view.show_options(&item.options, false).await;
            }
            Presentation::Simultaneous => {
                let prompt = item
                    .prompt
                    .clone()
                    .unwrap_or_else(|| mode.default_prompt().to_string());
                self.view.show_prompt(&prompt).await;
                self.audio.hint(VoiceEvent::Choose, index).await;
                self.view.show_options(&item.options, false).await;
            }
            Presentation::Letters => {
                // No prompt and no hint voices in this mode.
                if let Some(game) = self.game.as_mut() {
                    game.letters.reset(item.answer_key().chars().count());
                }
                self.view.show_typed("").await;
                self.view.show_options(&item.options, true).await;
            }
        }

        let game = self.game.as_mut().ok_or(GameFlowError::NoActiveSession)?;
        game.shown_at = Some(Instant::now());
        self.phase = GamePhase::AwaitingAnswer;

        Ok(Step::AwaitingAnswer {
            options: item.options,
            letters,
        })
    }

    /// Score the chosen option against the current item.
    ///
    /// Sends the attempt, applies the server's authoritative lives and
    /// `finished` signals, then either runs the finish flow (game over) or
    /// pauses for feedback and moves to the next item.
    ///
    /// # Errors
    ///
    /// `NoActiveSession`/`NotAwaitingAnswer` out of turn. On an `Api` error
    /// the answer is re-opened so the driver can surface the failure and
    /// let the player retry instead of being stuck mid-score.
    pub async fn submit_answer(&mut self, chosen: &str) -> Result<AnswerOutcome, GameFlowError> {
        let (item, session_id, survival, total, reaction_ms) = {
            let game = self.game.as_ref().ok_or(GameFlowError::NoActiveSession)?;
            let index = game.progress.index();
            let item = game
                .plan
                .items
                .get(index)
                .cloned()
                .ok_or(GameFlowError::NotAwaitingAnswer)?;
            let reaction_ms = game
                .shown_at
                .map(|at| u32::try_from(at.elapsed().as_millis()).unwrap_or(u32::MAX))
                .unwrap_or(0);
            (
                item,
                game.plan.session_id,
                game.plan.mode.has_lives(),
                game.plan.items.len(),
                reaction_ms,
            )
        };
        if self.phase != GamePhase::AwaitingAnswer {
            return Err(GameFlowError::NotAwaitingAnswer);
        }
        self.phase = GamePhase::Scoring;

        let correct = item.is_correct(chosen);
        let attempt = Attempt {
            item_id: item.item_id.clone(),
            correct,
            reaction_ms,
            shown_ms: item.exposure_ms,
        };

        let outcome = match self.backend.submit_attempt(session_id, &attempt).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Counters were not touched yet; reopen the answer.
                self.phase = GamePhase::AwaitingAnswer;
                return Err(err.into());
            }
        };

        {
            let game = self.game.as_mut().ok_or(GameFlowError::NoActiveSession)?;
            game.progress.record(correct, survival);
            if survival {
                if let Some(left) = outcome.lives_left {
                    game.progress.apply_lives(left);
                }
            }
        }
        if survival {
            let (left, start) = {
                let game = self.game.as_ref().ok_or(GameFlowError::NoActiveSession)?;
                (game.progress.lives_left(), game.progress.lives_start())
            };
            self.view.show_lives(left, start).await;
        }

        if outcome.finished {
            // Server says game over; skip feedback and close out now.
            if let Some(game) = self.game.as_mut() {
                game.progress.mark_dead();
            }
            let session = self.finish().await?;
            return Ok(AnswerOutcome {
                correct,
                reaction_ms,
                session: Some(session),
            });
        }

        self.view.show_feedback(correct, reaction_ms).await;
        let voice = if correct {
            self.audio.play_effect(EffectEvent::Ding);
            VoiceEvent::Good
        } else {
            VoiceEvent::Almost
        };
        self.audio.play(voice, false).await;

        sleep(self.timing.feedback_delay).await;

        let game = self.game.as_mut().ok_or(GameFlowError::NoActiveSession)?;
        game.progress.advance(total);
        let answered = game.progress.index();
        self.view.show_progress(answered, total).await;
        self.view.set_status("Play!").await;
        self.phase = GamePhase::Presenting;

        Ok(AnswerOutcome {
            correct,
            reaction_ms,
            session: None,
        })
    }

    /// Feed one letter tile to the letter-builder buffer.
    ///
    /// Completing the word submits exactly one attempt; the buffer stays
    /// locked until the next item, so rapid extra presses are ignored.
    ///
    /// # Errors
    ///
    /// `NotLetterMode` for other modes, `NotAwaitingAnswer` out of turn,
    /// plus anything `submit_answer` can return.
    pub async fn press_letter(&mut self, letter: char) -> Result<LetterStep, GameFlowError> {
        let game = self.game.as_mut().ok_or(GameFlowError::NoActiveSession)?;
        if game.plan.mode.presentation() != Presentation::Letters {
            return Err(GameFlowError::NotLetterMode);
        }
        if self.phase != GamePhase::AwaitingAnswer {
            return Err(GameFlowError::NotAwaitingAnswer);
        }

        match game.letters.press(letter) {
            LetterPress::Rejected => Ok(LetterStep::Ignored),
            LetterPress::Accepted => {
                let typed = game.letters.typed().to_string();
                self.view.show_typed(&typed).await;
                Ok(LetterStep::Typed)
            }
            LetterPress::Complete => {
                let typed = game.letters.typed().to_string();
                self.view.show_typed(&typed).await;
                let outcome = self.submit_answer(&typed).await?;
                Ok(LetterStep::Submitted(outcome))
            }
        }
    }

    /// Close the session: fetch the authoritative summary, derive the local
    /// survival summary, and present both.
    ///
    /// # Errors
    ///
    /// `NoActiveSession` without a session, `Api` when the finish call
    /// fails (the controller stays restartable).
    pub async fn finish(&mut self) -> Result<SessionOutcome, GameFlowError> {
        let (session_id, survival, total) = {
            let game = self.game.as_ref().ok_or(GameFlowError::NoActiveSession)?;
            (
                game.plan.session_id,
                game.plan.mode.has_lives(),
                game.plan.items.len(),
            )
        };

        self.view.set_status("Counting the result…").await;
        let summary = self.backend.finish_session(session_id).await?;

        let survival_summary = if survival {
            let game = self.game.as_ref().ok_or(GameFlowError::NoActiveSession)?;
            Some(SurvivalSummary::from_progress(
                &game.progress,
                self.clock.now(),
                total,
            ))
        } else {
            None
        };

        let stars = stars_from_accuracy(summary.accuracy);
        self.view
            .show_result(&summary, stars, survival_summary.as_ref())
            .await;
        self.view.set_status("Done! Play again?").await;
        self.phase = GamePhase::Finished;

        tracing::info!(
            session = %session_id,
            accuracy = summary.accuracy,
            stars,
            "session finished"
        );

        let voice = if stars == 3 {
            VoiceEvent::Reward
        } else {
            VoiceEvent::Finish
        };
        self.audio.play(voice, true).await;

        Ok(SessionOutcome {
            summary,
            stars,
            survival: survival_summary,
        })
    }

    /// Drop the active session and return to the idle state.
    ///
    /// All counters go back to their initial values and the voice channel
    /// goes quiet; any step scheduled against the old session will fail
    /// with `NoActiveSession` rather than act on stale state.
    pub async fn restart(&mut self) {
        self.reset_local().await;
    }

    async fn reset_local(&mut self) {
        self.game = None;
        self.phase = GamePhase::Idle;
        self.audio.silence();
        self.view.reset().await;
        self.view.set_status("Ready").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::{FakeBackend, NullPlayer, RecordingView};
    use wordflash_core::model::{AttemptOutcome, ItemId};

    fn flash_plan(items: usize) -> SessionPlan {
        SessionPlan {
            session_id: SessionId::new(1),
            mode: GameMode::WordFlash,
            difficulty: Difficulty::Normal,
            theme_id: ThemeId::new(1),
            exposure_ms: 1200,
            items_total: u32::try_from(items).unwrap(),
            items: (0..items)
                .map(|i| Item {
                    item_id: ItemId::new(format!("it-{i}")),
                    exposure_ms: 1200,
                    target: format!("word{i}"),
                    options: vec![format!("word{i}"), "decoy".to_string()],
                    prompt: None,
                    correct: None,
                })
                .collect(),
            lives_start: None,
            lives_left: None,
        }
    }

    fn controller(
        backend: FakeBackend,
    ) -> GameController<RecordingView> {
        let audio = AudioFeedback::new(
            Arc::new(NullPlayer::default()),
            Arc::new(NullPlayer::default()),
            "audio",
        );
        GameController::new(Arc::new(backend), audio, RecordingView::default())
    }

    fn params() -> StartParams {
        StartParams {
            child_id: ChildId::new(7),
            mode: GameMode::WordFlash,
            difficulty: Difficulty::Normal,
            theme_id: ThemeId::new(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_a_child_profile() {
        let mut ctrl = controller(FakeBackend::new(flash_plan(1)));
        let err = ctrl
            .start(StartParams {
                child_id: ChildId::new(0),
                ..params()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GameFlowError::NoChildSelected));
        assert_eq!(ctrl.phase(), GamePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_leaves_controller_idle() {
        let backend = FakeBackend::new(flash_plan(1)).failing_start();
        let mut ctrl = controller(backend);
        let err = ctrl.start(params()).await.unwrap_err();
        assert!(matches!(err, GameFlowError::Api(ApiError::Status { .. })));
        assert_eq!(ctrl.phase(), GamePhase::Idle);
        assert!(ctrl.progress().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn advance_out_of_turn_is_rejected() {
        let mut ctrl = controller(FakeBackend::new(flash_plan(1)));
        let err = ctrl.advance().await.unwrap_err();
        assert!(matches!(err, GameFlowError::NoActiveSession));

        ctrl.start(params()).await.unwrap();
        ctrl.advance().await.unwrap();
        // Now awaiting an answer; a second presentation is out of turn.
        let err = ctrl.advance().await.unwrap_err();
        assert!(matches!(err, GameFlowError::NotPresenting));
    }

    #[tokio::test(start_paused = true)]
    async fn answer_error_reopens_the_item() {
        let backend = FakeBackend::new(flash_plan(1)).failing_attempts();
        let mut ctrl = controller(backend);
        ctrl.start(params()).await.unwrap();
        ctrl.advance().await.unwrap();

        let err = ctrl.submit_answer("word0").await.unwrap_err();
        assert!(matches!(err, GameFlowError::Api(_)));
        assert_eq!(ctrl.phase(), GamePhase::AwaitingAnswer);
        // Nothing was recorded for the failed send.
        assert_eq!(ctrl.progress().unwrap().answered(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_counters_and_blocks_stale_advance() {
        let mut ctrl = controller(FakeBackend::new(flash_plan(3)));
        ctrl.start(params()).await.unwrap();
        ctrl.advance().await.unwrap();
        ctrl.submit_answer("word0").await.unwrap();
        assert_eq!(ctrl.progress().unwrap().index(), 1);

        ctrl.restart().await;
        assert_eq!(ctrl.phase(), GamePhase::Idle);
        assert!(ctrl.progress().is_none());

        // A stale scheduled advance finds no session to mutate.
        let err = ctrl.advance().await.unwrap_err();
        assert!(matches!(err, GameFlowError::NoActiveSession));
    }

    #[tokio::test(start_paused = true)]
    async fn progression_is_one_item_per_answer() {
        let backend = FakeBackend::new(flash_plan(3));
        let mut ctrl = controller(backend);
        ctrl.start(params()).await.unwrap();

        for expected in 1..=3_usize {
            let step = ctrl.advance().await.unwrap();
            assert!(matches!(step, Step::AwaitingAnswer { .. }));
            ctrl.submit_answer("decoy").await.unwrap();
            assert_eq!(ctrl.progress().unwrap().index(), expected);
        }

        let step = ctrl.advance().await.unwrap();
        let Step::Finished(outcome) = step else {
            panic!("expected session to finish");
        };
        assert_eq!(ctrl.phase(), GamePhase::Finished);
        assert!(outcome.survival.is_none());
    }
}
