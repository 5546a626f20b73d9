//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static BALLOT: Emoji<'_, '_> = Emoji("🗳️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ___  ___ _ __   __ _| |_ __ ___  __
    / __|/ _ \ '_ \ / _` | __/ _` \ \/ /
    \__ \  __/ | | | (_| | || (_| |>  <
    |___/\___|_| |_|\__,_|\__\__,_/_/\_\
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Senate election margins against IRS income brackets").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Settings shown in the configuration card
pub struct ConfigCard<'a> {
    pub elections: &'a Path,
    pub income: &'a Path,
    pub field_map: &'a Path,
    pub output: &'a Path,
    pub vif_threshold: f64,
    pub correlation_threshold: f64,
    pub seed: u64,
    pub trials: usize,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 60;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Elections: {:<40}│",
        BALLOT,
        truncate_path(card.elections, 40)
    );
    println!(
        "    │  {} Income:    {:<40}│",
        FOLDER,
        truncate_path(card.income, 40)
    );
    println!(
        "    │  {} Fields:    {:<40}│",
        FOLDER,
        truncate_path(card.field_map, 40)
    );
    println!(
        "    │  {} Output:    {:<40}│",
        SAVE,
        truncate_path(card.output, 40)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} VIF threshold:         {:<28}│",
        CHART,
        style(format!("{:.1}", card.vif_threshold)).yellow()
    );
    println!(
        "    │  {} Correlation threshold: {:<28}│",
        LINK,
        style(format!("{:.2}", card.correlation_threshold)).yellow()
    );
    println!(
        "    │  {} Seed / trials:         {:<28}│",
        DICE,
        style(format!("{} / {}", card.seed, card.trials)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Senatax analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, threshold_info: Option<&str>) {
    if let Some(info) = threshold_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("data/income/2018.csv", 10), "...018.csv");
    }
}
