use serde::{Deserialize, Serialize};

use crate::model::ItemId;

/// A single exercise item as delivered by the session start call.
///
/// Read-only once received. `prompt` is the text shown during the exposure
/// phase (may differ from the answer); `correct` overrides `target` as the
/// answer key for modes where the shown word and the expected pick differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub exposure_ms: u32,
    pub target: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub correct: Option<String>,
}

impl Item {
    /// The string a chosen option must match exactly.
    #[must_use]
    pub fn answer_key(&self) -> &str {
        self.correct.as_deref().unwrap_or(&self.target)
    }

    /// Exact-match correctness check.
    #[must_use]
    pub fn is_correct(&self, chosen: &str) -> bool {
        chosen == self.answer_key()
    }

    /// Prompt text for the exposure phase, falling back to the target word.
    #[must_use]
    pub fn prompt_text(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(target: &str, correct: Option<&str>) -> Item {
        Item {
            item_id: ItemId::new("it-1"),
            exposure_ms: 1200,
            target: target.to_string(),
            options: vec!["cat".into(), "dog".into(), "fox".into()],
            prompt: None,
            correct: correct.map(str::to_string),
        }
    }

    #[test]
    fn answer_key_falls_back_to_target() {
        let it = item("cat", None);
        assert_eq!(it.answer_key(), "cat");
        assert!(it.is_correct("cat"));
        assert!(!it.is_correct("dog"));
    }

    #[test]
    fn explicit_correct_overrides_target() {
        let it = item("cat", Some("dog"));
        assert_eq!(it.answer_key(), "dog");
        assert!(it.is_correct("dog"));
        assert!(!it.is_correct("cat"));
    }

    #[test]
    fn prompt_text_defaults_to_target() {
        let mut it = item("cat", None);
        assert_eq!(it.prompt_text(), "cat");
        it.prompt = Some("Look!".into());
        assert_eq!(it.prompt_text(), "Look!");
    }
}
