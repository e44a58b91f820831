use chrono::{DateTime, Utc};

/// In-memory bookkeeping for one running session.
///
/// Owned by the controller and reset wholesale on restart. Lives reflect the
/// server's authoritative value; the other counters are local statistics
/// used for the survival summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProgress {
    index: usize,
    correct: u32,
    wrong: u32,
    streak: u32,
    best_streak: u32,
    lives_start: u32,
    lives_left: u32,
    dead: bool,
    started_at: DateTime<Utc>,
}

impl GameProgress {
    /// Fresh progress for a session started at `started_at`.
    ///
    /// `lives` seeds the survival counters; non-survival sessions pass `None`.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, lives: Option<(u32, u32)>) -> Self {
        let (lives_start, lives_left) = lives.unwrap_or((0, 0));
        Self {
            index: 0,
            correct: 0,
            wrong: 0,
            streak: 0,
            best_streak: 0,
            lives_start,
            lives_left: lives_left.min(lives_start),
            dead: false,
            started_at,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn lives_start(&self) -> u32 {
        self.lives_start
    }

    #[must_use]
    pub fn lives_left(&self) -> u32 {
        self.lives_left
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }

    /// Record a local answer outcome.
    ///
    /// Streaks only move in survival mode: a correct answer extends the
    /// streak (and possibly the best streak), a wrong one resets it to zero.
    /// The best streak never decreases.
    pub fn record(&mut self, correct: bool, survival: bool) {
        if correct {
            self.correct = self.correct.saturating_add(1);
            if survival {
                self.streak = self.streak.saturating_add(1);
                self.best_streak = self.best_streak.max(self.streak);
            }
        } else {
            self.wrong = self.wrong.saturating_add(1);
            if survival {
                self.streak = 0;
            }
        }
    }

    /// Apply the server's authoritative lives value.
    ///
    /// Lives are monotone non-increasing; a server value higher than the
    /// current one is ignored.
    pub fn apply_lives(&mut self, lives_left: u32) {
        self.lives_left = self.lives_left.min(lives_left);
    }

    /// The server signalled game-over (lives exhausted).
    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// Step to the next item. The index never moves past `total`.
    pub fn advance(&mut self, total: usize) {
        if self.index < total {
            self.index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn index_is_bounded_and_steps_by_one() {
        let mut p = GameProgress::new(fixed_now(), None);
        for expected in 1..=3 {
            p.advance(3);
            assert_eq!(p.index(), expected);
        }
        p.advance(3);
        p.advance(3);
        assert_eq!(p.index(), 3);
    }

    #[test]
    fn survival_streak_resets_on_wrong() {
        let mut p = GameProgress::new(fixed_now(), Some((3, 3)));
        p.record(true, true);
        p.record(true, true);
        assert_eq!(p.streak(), 2);
        assert_eq!(p.best_streak(), 2);

        p.record(false, true);
        assert_eq!(p.streak(), 0);
        assert_eq!(p.best_streak(), 2);

        p.record(true, true);
        assert_eq!(p.streak(), 1);
        assert_eq!(p.best_streak(), 2);
    }

    #[test]
    fn streak_ignored_outside_survival() {
        let mut p = GameProgress::new(fixed_now(), None);
        p.record(true, false);
        p.record(true, false);
        assert_eq!(p.streak(), 0);
        assert_eq!(p.best_streak(), 0);
        assert_eq!(p.correct(), 2);
    }

    #[test]
    fn lives_never_increase() {
        let mut p = GameProgress::new(fixed_now(), Some((3, 3)));
        p.apply_lives(2);
        assert_eq!(p.lives_left(), 2);
        p.apply_lives(3);
        assert_eq!(p.lives_left(), 2);
        p.apply_lives(0);
        assert_eq!(p.lives_left(), 0);
    }

    #[test]
    fn lives_left_clamped_to_start() {
        let p = GameProgress::new(fixed_now(), Some((3, 5)));
        assert_eq!(p.lives_left(), 3);
    }
}
