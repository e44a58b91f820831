use serde::{Deserialize, Serialize};
use std::fmt;

/// How a mode presents an item to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Show the prompt for the exposure window, conceal it, then reveal options.
    Flash,
    /// Prompt and options appear together; nothing is concealed.
    Simultaneous,
    /// No prompt; options are single letters assembled into the answer.
    Letters,
}

/// Closed set of game variants.
///
/// Adding a mode means adding a variant here and covering it in
/// [`GameMode::presentation`]; nothing else branches on mode names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    WordFlash,
    Survival,
    OddOneOut,
    LetterBuilder,
}

impl GameMode {
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        match self {
            GameMode::WordFlash | GameMode::Survival => Presentation::Flash,
            GameMode::OddOneOut => Presentation::Simultaneous,
            GameMode::LetterBuilder => Presentation::Letters,
        }
    }

    /// Survival is the only lives-based variant.
    #[must_use]
    pub fn has_lives(&self) -> bool {
        matches!(self, GameMode::Survival)
    }

    /// Prompt text shown when the item itself carries none.
    #[must_use]
    pub fn default_prompt(&self) -> &'static str {
        match self {
            GameMode::OddOneOut => "Pick the odd one out:",
            GameMode::LetterBuilder => "",
            GameMode::WordFlash | GameMode::Survival => "Pick the right answer:",
        }
    }

    /// Wire name as the server expects it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::WordFlash => "word_flash",
            GameMode::Survival => "survival",
            GameMode::OddOneOut => "odd_one_out",
            GameMode::LetterBuilder => "letter_builder",
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::WordFlash
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session difficulty preset; the server owns the concrete timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_dispatch_presentation() {
        assert_eq!(GameMode::WordFlash.presentation(), Presentation::Flash);
        assert_eq!(GameMode::Survival.presentation(), Presentation::Flash);
        assert_eq!(GameMode::OddOneOut.presentation(), Presentation::Simultaneous);
        assert_eq!(GameMode::LetterBuilder.presentation(), Presentation::Letters);
    }

    #[test]
    fn only_survival_has_lives() {
        assert!(GameMode::Survival.has_lives());
        assert!(!GameMode::WordFlash.has_lives());
        assert!(!GameMode::OddOneOut.has_lives());
        assert!(!GameMode::LetterBuilder.has_lives());
    }

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_string(&GameMode::OddOneOut).unwrap();
        assert_eq!(json, "\"odd_one_out\"");
        let mode: GameMode = serde_json::from_str("\"letter_builder\"").unwrap();
        assert_eq!(mode, GameMode::LetterBuilder);
        assert_eq!(Difficulty::Normal.as_str(), "normal");
    }
}
