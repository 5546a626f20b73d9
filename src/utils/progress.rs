//! Spinners for the pipeline steps and the classifier trial bar

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner shown while one pipeline step runs
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar over the unseeded classifier trials; the message carries the
/// number of skipped trials.
pub fn create_trial_bar(trials: u64) -> ProgressBar {
    let pb = ProgressBar::new(trials);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} trials {msg:.yellow}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Record one skipped trial on a bar from `create_trial_bar`
pub fn note_skipped_trial(pb: &ProgressBar, skipped: usize) {
    pb.set_message(format!("({} skipped)", skipped));
}

/// Finish a spinner with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

/// Finish a spinner with a warning message
pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠️  {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_bar_tracks_skips() {
        let pb = create_trial_bar(50);
        assert_eq!(pb.length(), Some(50));
        note_skipped_trial(&pb, 2);
        assert_eq!(pb.message(), "(2 skipped)");
    }
}
