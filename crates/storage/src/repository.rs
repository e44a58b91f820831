use async_trait::async_trait;
use thiserror::Error;

use wordflash_core::VoiceMode;
use wordflash_core::model::ThemeId;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Player preferences kept on the client between sessions.
///
/// Mirrors what the game reads at startup and writes on change: whether
/// sound is on, how chatty the voice hints are, and the last theme picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub sound_on: bool,
    pub voice_mode: VoiceMode,
    pub theme_id: Option<ThemeId>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_on: true,
            voice_mode: VoiceMode::Soft,
            theme_id: None,
        }
    }
}

/// Repository contract for the preference store.
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Load stored preferences, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn load(&self) -> Result<Option<Preferences>, StorageError>;

    /// Persist the preferences, replacing whatever was stored before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn save(&self, prefs: &Preferences) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run_behavior() {
        let prefs = Preferences::default();
        assert!(prefs.sound_on);
        assert_eq!(prefs.voice_mode, VoiceMode::Soft);
        assert_eq!(prefs.theme_id, None);
    }
}
