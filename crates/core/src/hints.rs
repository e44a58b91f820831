use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown voice mode: {0}")]
pub struct ParseVoiceModeError(String);

/// Controls how often voice hints play before items.
///
/// Soft keeps the voice "alive" without narrating every single item: the
/// first two items always get a hint, then every fourth one after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    #[default]
    Soft,
    Full,
}

impl VoiceMode {
    /// Whether a hint should play before the item at `index`.
    ///
    /// Soft schedule: indices 0, 1, then 3, 7, 11, …
    #[must_use]
    pub fn should_hint(&self, index: usize) -> bool {
        match self {
            VoiceMode::Full => true,
            VoiceMode::Soft => index < 2 || index % 4 == 3,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceMode::Soft => "soft",
            VoiceMode::Full => "full",
        }
    }
}

impl fmt::Display for VoiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceMode {
    type Err = ParseVoiceModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(VoiceMode::Soft),
            "full" => Ok(VoiceMode::Full),
            other => Err(ParseVoiceModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_schedule_matches_expected_indices() {
        let mode = VoiceMode::Soft;
        for idx in [0, 1, 3, 7, 11, 15] {
            assert!(mode.should_hint(idx), "expected hint at {idx}");
        }
        for idx in [2, 4, 5, 6, 8, 9, 10] {
            assert!(!mode.should_hint(idx), "unexpected hint at {idx}");
        }
    }

    #[test]
    fn full_mode_always_hints() {
        for idx in 0..20 {
            assert!(VoiceMode::Full.should_hint(idx));
        }
    }

    #[test]
    fn parses_wire_strings() {
        assert_eq!("soft".parse::<VoiceMode>().unwrap(), VoiceMode::Soft);
        assert_eq!("full".parse::<VoiceMode>().unwrap(), VoiceMode::Full);
        assert!("loud".parse::<VoiceMode>().is_err());
    }
}
