use serde::{Deserialize, Serialize};

use crate::model::{ChildId, Difficulty, GameMode, Item, ItemId, SessionId, ThemeId};

/// A selectable word theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
}

/// A child profile known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: ChildId,
    pub name: String,
}

/// Everything the server hands back when a session starts.
///
/// Immutable once fetched; lives bookkeeping happens in `GameProgress`,
/// seeded from `lives_start`/`lives_left` for survival sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub session_id: SessionId,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub theme_id: ThemeId,
    pub exposure_ms: u32,
    pub items_total: u32,
    pub items: Vec<Item>,
    #[serde(default)]
    pub lives_start: Option<u32>,
    #[serde(default)]
    pub lives_left: Option<u32>,
}

/// One answer record, built locally at answer time and sent exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub item_id: ItemId,
    pub correct: bool,
    pub reaction_ms: u32,
    pub shown_ms: u32,
}

/// Server reply to an attempt. `lives_left` and `finished` are
/// authoritative; local counters never decide game-over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub ok: bool,
    #[serde(default)]
    pub lives_left: Option<u32>,
    #[serde(default)]
    pub finished: bool,
}

/// Authoritative end-of-session summary computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishSummary {
    pub session_id: SessionId,
    pub accuracy: f64,
    pub avg_reaction_ms: f64,
    pub next_exposure_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_outcome_defaults() {
        let out: AttemptOutcome = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(out.ok);
        assert_eq!(out.lives_left, None);
        assert!(!out.finished);
    }

    #[test]
    fn session_plan_deserializes_survival_fields() {
        let json = r#"{
            "session_id": 12,
            "mode": "survival",
            "difficulty": "normal",
            "theme_id": 1,
            "exposure_ms": 1200,
            "items_total": 1,
            "items": [{
                "item_id": "it-1",
                "exposure_ms": 1200,
                "target": "cat",
                "options": ["cat", "dog"]
            }],
            "lives_start": 3,
            "lives_left": 3
        }"#;
        let plan: SessionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.session_id, SessionId::new(12));
        assert_eq!(plan.mode, GameMode::Survival);
        assert_eq!(plan.lives_start, Some(3));
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].prompt, None);
    }
}
