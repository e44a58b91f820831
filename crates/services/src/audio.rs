use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use thiserror::Error;

use wordflash_core::VoiceMode;

/// Semantic voice-line categories. Each maps to a set of recorded clips so
/// the voice does not repeat the same file every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEvent {
    Start,
    Look,
    Choose,
    Good,
    Almost,
    Finish,
    Reward,
}

impl VoiceEvent {
    /// Directory name under the audio root.
    #[must_use]
    pub fn dir(&self) -> &'static str {
        match self {
            VoiceEvent::Start => "start",
            VoiceEvent::Look => "look",
            VoiceEvent::Choose => "choose",
            VoiceEvent::Good => "good",
            VoiceEvent::Almost => "almost",
            VoiceEvent::Finish => "finish",
            VoiceEvent::Reward => "reward",
        }
    }

    /// Candidate clip files for this event.
    #[must_use]
    pub fn clips(&self) -> &'static [&'static str] {
        match self {
            VoiceEvent::Start => &[
                "start_01.ogg",
                "start_02.ogg",
                "start_03.ogg",
                "start_04.ogg",
                "start_05.ogg",
            ],
            VoiceEvent::Look => &["look_01.ogg", "look_02.ogg", "look_03.ogg"],
            VoiceEvent::Choose => &["choose_01.ogg", "choose_02.ogg"],
            VoiceEvent::Good => &["good_01.ogg", "good_02.ogg", "good_03.ogg"],
            VoiceEvent::Almost => &["almost_01.ogg", "almost_02.ogg", "almost_03.ogg"],
            VoiceEvent::Finish => &["finish_01.ogg", "finish_02.ogg", "finish_03.ogg"],
            VoiceEvent::Reward => &["reward_01.ogg"],
        }
    }
}

/// Short sound effects; these live on a separate channel and may overlap a
/// voice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    Ding,
}

impl EffectEvent {
    #[must_use]
    pub fn dir(&self) -> &'static str {
        match self {
            EffectEvent::Ding => "ding",
        }
    }

    #[must_use]
    pub fn clips(&self) -> &'static [&'static str] {
        match self {
            EffectEvent::Ding => &["ding_01.ogg"],
        }
    }
}

#[derive(Debug, Error)]
#[error("playback failed: {0}")]
pub struct PlaybackError(pub String);

/// One playback channel. `play` resolves when the clip ends or fails.
#[async_trait]
pub trait ClipPlayer: Send + Sync {
    /// Play the clip at `path` to completion.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError` when the clip cannot be played; callers are
    /// expected to swallow it.
    async fn play(&self, path: &str) -> Result<(), PlaybackError>;

    /// Whether a clip started on this channel is still audible.
    fn is_playing(&self) -> bool;

    /// Stop whatever is playing on this channel.
    fn stop(&self);
}

/// What happened to a playback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Played {
    /// The clip ran (or failed silently) to completion.
    Done,
    /// Nothing played: sound off, no clips, or a non-interrupting call
    /// while another voice line was speaking.
    Skipped,
}

/// Voice lines and effects for the game.
///
/// Owns the single "currently playing voice" slot: a non-interrupting play
/// while the voice is busy is a no-op, an interrupting one stops the
/// current clip first. Playback failures never propagate; a missing audio
/// device or a blocked autoplay must not stop the game.
pub struct AudioFeedback {
    voice: Arc<dyn ClipPlayer>,
    effects: Arc<dyn ClipPlayer>,
    clip_root: String,
    sound_on: bool,
    voice_mode: VoiceMode,
}

impl AudioFeedback {
    #[must_use]
    pub fn new(
        voice: Arc<dyn ClipPlayer>,
        effects: Arc<dyn ClipPlayer>,
        clip_root: impl Into<String>,
    ) -> Self {
        Self {
            voice,
            effects,
            clip_root: clip_root.into(),
            sound_on: true,
            voice_mode: VoiceMode::Soft,
        }
    }

    #[must_use]
    pub fn with_voice_mode(mut self, voice_mode: VoiceMode) -> Self {
        self.voice_mode = voice_mode;
        self
    }

    #[must_use]
    pub fn with_sound_on(mut self, sound_on: bool) -> Self {
        self.sound_on = sound_on;
        self
    }

    #[must_use]
    pub fn sound_on(&self) -> bool {
        self.sound_on
    }

    #[must_use]
    pub fn voice_mode(&self) -> VoiceMode {
        self.voice_mode
    }

    /// Toggle sound; disabling also silences the current voice line.
    pub fn set_sound_on(&mut self, on: bool) {
        self.sound_on = on;
        if !on {
            self.voice.stop();
        }
    }

    pub fn set_voice_mode(&mut self, voice_mode: VoiceMode) {
        self.voice_mode = voice_mode;
    }

    /// Stop the voice channel outright (restart path).
    pub fn silence(&self) {
        self.voice.stop();
    }

    /// Play a voice line, resolving when it ends or fails.
    pub async fn play(&self, event: VoiceEvent, interrupt: bool) -> Played {
        if !self.sound_on {
            return Played::Skipped;
        }
        let Some(file) = event.clips().choose(&mut rand::rng()) else {
            return Played::Skipped;
        };
        if !interrupt && self.voice.is_playing() {
            return Played::Skipped;
        }
        if interrupt {
            self.voice.stop();
        }

        let path = format!("{}/{}/{file}", self.clip_root, event.dir());
        if let Err(err) = self.voice.play(&path).await {
            tracing::debug!(clip = %path, error = %err, "voice clip failed, continuing");
        }
        Played::Done
    }

    /// Play a pre-item hint if the voice mode's schedule allows it for
    /// `item_index`. Hints never interrupt.
    pub async fn hint(&self, event: VoiceEvent, item_index: usize) -> Played {
        if !self.voice_mode.should_hint(item_index) {
            return Played::Skipped;
        }
        self.play(event, false).await
    }

    /// Fire-and-forget short effect on the parallel channel.
    pub fn play_effect(&self, event: EffectEvent) {
        if !self.sound_on {
            return;
        }
        let Some(file) = event.clips().choose(&mut rand::rng()) else {
            return;
        };
        let path = format!("{}/sfx/{}/{file}", self.clip_root, event.dir());
        let effects = Arc::clone(&self.effects);
        tokio::spawn(async move {
            if let Err(err) = effects.play(&path).await {
                tracing::debug!(clip = %path, error = %err, "effect clip failed");
            }
        });
    }
}
