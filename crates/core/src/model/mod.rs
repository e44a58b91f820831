mod ids;
mod item;
mod mode;
mod session;

pub use ids::{ChildId, ItemId, SessionId, ThemeId};
pub use item::Item;
pub use mode::{Difficulty, GameMode, Presentation};
pub use session::{
    Attempt, AttemptOutcome, ChildProfile, FinishSummary, SessionPlan, Theme,
};
