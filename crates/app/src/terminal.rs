use async_trait::async_trait;
use services::GameView;
use wordflash_core::SurvivalSummary;
use wordflash_core::model::FinishSummary;

/// Plain-stdout rendering of the game.
///
/// Output ordering matters: the prompt is gone from the screen before the
/// options print in flash modes, which is exactly the contract the
/// controller drives through `GameView`.
pub struct TerminalView;

impl TerminalView {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameView for TerminalView {
    async fn set_status(&mut self, text: &str) {
        println!("-- {text}");
    }

    async fn show_prompt(&mut self, text: &str) {
        println!();
        println!("   {text}");
    }

    async fn conceal_prompt(&mut self) {
        // No terminal erase games; a visual break is enough.
        println!("   · · ·");
    }

    async fn show_options(&mut self, options: &[String], letters_grid: bool) {
        if letters_grid {
            let tiles: Vec<&str> = options.iter().map(String::as_str).collect();
            println!("   tiles: {}", tiles.join(" "));
            println!("   (type the letters, Enter submits what you have so far)");
        } else {
            for (index, option) in options.iter().enumerate() {
                println!("   {}) {option}", index + 1);
            }
        }
    }

    async fn show_typed(&mut self, typed: &str) {
        println!("   > {typed}");
    }

    async fn show_feedback(&mut self, correct: bool, reaction_ms: u32) {
        if correct {
            println!("   ✓ correct ({reaction_ms} ms)");
        } else {
            println!("   ✗ not quite ({reaction_ms} ms)");
        }
    }

    async fn show_lives(&mut self, left: u32, start: u32) {
        let full = "♥".repeat(left as usize);
        let empty = "♡".repeat(start.saturating_sub(left) as usize);
        println!("   lives: {full}{empty}");
    }

    async fn show_progress(&mut self, answered: usize, total: usize) {
        println!("   {answered}/{total}");
    }

    async fn show_result(
        &mut self,
        summary: &FinishSummary,
        stars: u8,
        survival: Option<&SurvivalSummary>,
    ) {
        println!();
        println!("=== Session {} ===", summary.session_id);
        let lit = "★".repeat(stars as usize);
        let dim = "☆".repeat(3usize.saturating_sub(stars as usize));
        println!("   {lit}{dim}");
        println!("   accuracy: {:.0}%", summary.accuracy * 100.0);
        println!("   avg reaction: {:.0} ms", summary.avg_reaction_ms);
        if let Some(survival) = survival {
            println!("   {}", survival.end_reason);
            println!(
                "   best streak: {}   wrong: {}   time: {}s",
                survival.best_streak,
                survival.wrong,
                survival.duration.num_seconds()
            );
        }
        println!("   next exposure: {} ms", summary.next_exposure_ms);
    }

    async fn reset(&mut self) {
        println!();
        println!("-- Ready");
    }
}
