/// Outcome of pressing one letter tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterPress {
    /// Letter appended; more letters are still needed.
    Accepted,
    /// The buffer just reached the target length. Returned exactly once;
    /// the buffer locks afterwards until reset.
    Complete,
    /// Buffer is locked while a submission is pending; input dropped.
    Rejected,
}

/// Incrementally assembled answer for the letter-builder mode.
///
/// The lock flag is the re-entrancy guard: once the typed word reaches the
/// target length the buffer refuses further input, so rapid extra presses
/// cannot trigger a second submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LetterBuffer {
    typed: String,
    target_len: usize,
    locked: bool,
}

impl LetterBuffer {
    /// A fresh buffer for a word of `target_len` characters.
    ///
    /// A zero-length target completes on the first press; the buffer never
    /// starts locked, so `Complete` is always reachable.
    #[must_use]
    pub fn new(target_len: usize) -> Self {
        Self {
            typed: String::new(),
            target_len,
            locked: false,
        }
    }

    /// A buffer sized for the given target word.
    #[must_use]
    pub fn for_word(word: &str) -> Self {
        Self::new(word.chars().count())
    }

    #[must_use]
    pub fn typed(&self) -> &str {
        &self.typed
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.target_len.saturating_sub(self.typed.chars().count())
    }

    /// Append a letter. Lengths are counted in characters, so multi-byte
    /// letters behave the same as ASCII ones.
    pub fn press(&mut self, letter: char) -> LetterPress {
        if self.locked {
            return LetterPress::Rejected;
        }
        self.typed.push(letter);
        if self.typed.chars().count() >= self.target_len {
            self.locked = true;
            LetterPress::Complete
        } else {
            LetterPress::Accepted
        }
    }

    /// Clear the buffer for the next item.
    pub fn reset(&mut self, target_len: usize) {
        self.typed.clear();
        self.target_len = target_len;
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_exactly_once() {
        let mut buf = LetterBuffer::for_word("cat");
        assert_eq!(buf.press('c'), LetterPress::Accepted);
        assert_eq!(buf.press('a'), LetterPress::Accepted);
        assert_eq!(buf.press('t'), LetterPress::Complete);
        assert_eq!(buf.typed(), "cat");

        // Rapid extra presses are dropped while locked.
        assert_eq!(buf.press('s'), LetterPress::Rejected);
        assert_eq!(buf.press('s'), LetterPress::Rejected);
        assert_eq!(buf.typed(), "cat");
    }

    #[test]
    fn never_exceeds_target_length() {
        let mut buf = LetterBuffer::new(2);
        buf.press('о');
        buf.press('к');
        buf.press('x');
        assert_eq!(buf.typed().chars().count(), 2);
    }

    #[test]
    fn reset_unlocks_for_next_item() {
        let mut buf = LetterBuffer::for_word("ab");
        buf.press('a');
        buf.press('b');
        assert!(buf.is_locked());

        buf.reset(3);
        assert!(!buf.is_locked());
        assert_eq!(buf.typed(), "");
        assert_eq!(buf.remaining(), 3);
    }

    #[test]
    fn zero_length_target_completes_on_first_press() {
        let mut buf = LetterBuffer::new(0);
        assert!(!buf.is_locked());
        assert_eq!(buf.press('a'), LetterPress::Complete);
        assert_eq!(buf.press('b'), LetterPress::Rejected);

        // Same through reset.
        buf.reset(0);
        assert!(!buf.is_locked());
        assert_eq!(buf.press('x'), LetterPress::Complete);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut buf = LetterBuffer::for_word("ёж");
        assert_eq!(buf.press('ё'), LetterPress::Accepted);
        assert_eq!(buf.press('ж'), LetterPress::Complete);
        assert_eq!(buf.typed(), "ёж");
    }
}
