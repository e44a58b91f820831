use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::progress::GameProgress;

/// Star rating from session accuracy.
///
/// Thresholds are inclusive: 0.85 and above earns all three stars,
/// 0.70 and above earns two, anything lower one.
#[must_use]
pub fn stars_from_accuracy(accuracy: f64) -> u8 {
    if accuracy >= 0.85 {
        3
    } else if accuracy >= 0.70 {
        2
    } else {
        1
    }
}

/// Why a survival session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The server signalled that lives ran out.
    LivesExhausted,
    /// Every item was answered.
    ItemsExhausted,
    /// Session ended without either signal (e.g. aborted finish).
    Completed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EndReason::LivesExhausted => "Game over: out of lives.",
            EndReason::ItemsExhausted => "Training complete: no words left.",
            EndReason::Completed => "Training complete.",
        };
        f.write_str(text)
    }
}

/// Local end-of-session summary for survival mode.
///
/// Derived purely from local counters and elapsed wall-clock time; the
/// server never recomputes any of these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurvivalSummary {
    pub lives_left: u32,
    pub lives_start: u32,
    pub duration: Duration,
    pub best_streak: u32,
    pub wrong: u32,
    pub end_reason: EndReason,
}

impl SurvivalSummary {
    /// Build the summary from final progress counters.
    ///
    /// `total_items` is the planned item count; reaching it without dying
    /// reads as "no words left".
    #[must_use]
    pub fn from_progress(progress: &GameProgress, now: DateTime<Utc>, total_items: usize) -> Self {
        let duration = (now - progress.started_at()).max(Duration::zero());
        let end_reason = if progress.is_dead() {
            EndReason::LivesExhausted
        } else if progress.index() >= total_items {
            EndReason::ItemsExhausted
        } else {
            EndReason::Completed
        };
        Self {
            lives_left: progress.lives_left(),
            lives_start: progress.lives_start(),
            duration,
            best_streak: progress.best_streak(),
            wrong: progress.wrong(),
            end_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn star_thresholds_are_inclusive() {
        assert_eq!(stars_from_accuracy(0.9), 3);
        assert_eq!(stars_from_accuracy(0.85), 3);
        assert_eq!(stars_from_accuracy(0.849_999), 2);
        assert_eq!(stars_from_accuracy(0.75), 2);
        assert_eq!(stars_from_accuracy(0.70), 2);
        assert_eq!(stars_from_accuracy(0.5), 1);
        assert_eq!(stars_from_accuracy(0.0), 1);
    }

    #[test]
    fn dead_session_reports_lives_exhausted() {
        let mut p = GameProgress::new(fixed_now(), Some((3, 3)));
        p.record(false, true);
        p.apply_lives(0);
        p.mark_dead();

        let now = fixed_now() + Duration::seconds(42);
        let summary = SurvivalSummary::from_progress(&p, now, 7);
        assert_eq!(summary.end_reason, EndReason::LivesExhausted);
        assert_eq!(summary.lives_left, 0);
        assert_eq!(summary.duration, Duration::seconds(42));
        assert_eq!(summary.wrong, 1);
    }

    #[test]
    fn exhausting_items_reports_items_exhausted() {
        let mut p = GameProgress::new(fixed_now(), Some((3, 3)));
        for _ in 0..3 {
            p.record(true, true);
            p.advance(3);
        }
        let summary = SurvivalSummary::from_progress(&p, fixed_now(), 3);
        assert_eq!(summary.end_reason, EndReason::ItemsExhausted);
        assert_eq!(summary.best_streak, 3);
    }

    #[test]
    fn mid_session_finish_reports_generic_completion() {
        let p = GameProgress::new(fixed_now(), Some((3, 3)));
        let summary = SurvivalSummary::from_progress(&p, fixed_now(), 5);
        assert_eq!(summary.end_reason, EndReason::Completed);
    }

    #[test]
    fn duration_never_negative() {
        let p = GameProgress::new(fixed_now(), None);
        let before = fixed_now() - Duration::seconds(5);
        let summary = SurvivalSummary::from_progress(&p, before, 0);
        assert_eq!(summary.duration, Duration::zero());
    }
}
