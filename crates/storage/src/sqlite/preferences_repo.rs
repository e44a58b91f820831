use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{Preferences, PreferencesRepository, StorageError};
use wordflash_core::VoiceMode;
use wordflash_core::model::ThemeId;

use super::SqliteStore;

#[async_trait]
impl PreferencesRepository for SqliteStore {
    async fn load(&self) -> Result<Option<Preferences>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT sound_on, voice_mode, theme_id
            FROM preferences
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sound_on: i64 = row
            .try_get("sound_on")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let voice_mode: String = row
            .try_get("voice_mode")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let theme_id: Option<i64> = row
            .try_get("theme_id")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        let voice_mode: VoiceMode = voice_mode
            .parse()
            .map_err(|err: wordflash_core::hints::ParseVoiceModeError| {
                StorageError::Serialization(err.to_string())
            })?;

        Ok(Some(Preferences {
            sound_on: sound_on != 0,
            voice_mode,
            theme_id: theme_id.map(ThemeId::new),
        }))
    }

    async fn save(&self, prefs: &Preferences) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO preferences (id, sound_on, voice_mode, theme_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                sound_on = excluded.sound_on,
                voice_mode = excluded.voice_mode,
                theme_id = excluded.theme_id
            ",
        )
        .bind(1_i64)
        .bind(i64::from(prefs.sound_on))
        .bind(prefs.voice_mode.as_str())
        .bind(prefs.theme_id.map(|id| id.value()))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
