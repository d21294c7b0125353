//! Step lines and progress bars for the archive and batch commands

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

/// Reading an archive or scanning a directory
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Unpacking SARC entries
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Writing a packed archive
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Exporting messages to text
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Command finished
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a numbered step, e.g. `[2/2] 📦 Extracting 12 files...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print the elapsed time once a command finishes
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Bar style shared by `sarc extract` and `convert`: `Exporting [████░░░░] 50/100`
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
}

/// Bar over `total` files; hidden when `quiet`
#[must_use]
pub fn simple_bar(total: u64, msg: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(bar_style());
    pb.set_message(msg.to_string());
    pb
}
