#![forbid(unsafe_code)]

pub mod api;
pub mod audio;
pub mod controller;
pub mod error;
pub mod testing;
pub mod view;

pub use wordflash_core::Clock;

pub use api::{SessionApi, SessionBackend, StartSessionRequest};
pub use audio::{AudioFeedback, ClipPlayer, EffectEvent, PlaybackError, Played, VoiceEvent};
pub use controller::{
    AnswerOutcome, GameController, GamePhase, LetterStep, SessionOutcome, StartParams, Step,
    TimingConfig,
};
pub use error::{ApiError, GameFlowError};
pub use view::GameView;
