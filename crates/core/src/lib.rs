#![forbid(unsafe_code)]

pub mod hints;
pub mod letters;
pub mod model;
pub mod progress;
pub mod summary;
pub mod time;

pub use hints::VoiceMode;
pub use letters::{LetterBuffer, LetterPress};
pub use progress::GameProgress;
pub use summary::{EndReason, SurvivalSummary, stars_from_accuracy};
pub use time::Clock;
