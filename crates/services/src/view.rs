use async_trait::async_trait;

use wordflash_core::SurvivalSummary;
use wordflash_core::model::FinishSummary;

/// Front-end seam for the controller.
///
/// The controller drives the whole presentation through this trait and
/// stamps the reaction-time origin right after `show_options` resolves, so
/// implementations must only return once the options are actually
/// interactable.
#[async_trait]
pub trait GameView: Send {
    async fn set_status(&mut self, text: &str);

    async fn show_prompt(&mut self, text: &str);

    async fn conceal_prompt(&mut self);

    /// Present the answer options. `letters_grid` is set for the
    /// letter-builder tile layout.
    async fn show_options(&mut self, options: &[String], letters_grid: bool);

    /// Letter-builder: the partially assembled word.
    async fn show_typed(&mut self, typed: &str);

    async fn show_feedback(&mut self, correct: bool, reaction_ms: u32);

    async fn show_lives(&mut self, left: u32, start: u32);

    async fn show_progress(&mut self, answered: usize, total: usize);

    async fn show_result(
        &mut self,
        summary: &FinishSummary,
        stars: u8,
        survival: Option<&SurvivalSummary>,
    );

    /// Clear everything back to the pre-session state.
    async fn reset(&mut self);
}
