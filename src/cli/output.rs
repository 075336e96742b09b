//! Output formatting helpers for CLI

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a rate in [0, 1] as a percentage
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, &str)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print win/loss counts of a run
pub fn print_result(result: &TrainingResult) {
    let episodes = format_number(result.total_episodes);
    let wins = format!("{} ({})", result.wins, format_percent(result.win_rate));
    let losses = format!("{} ({})", result.losses, format_percent(result.loss_rate));
    let truncated = result.truncated.to_string();
    let mean_turns = format!("{:.2}", result.mean_turns);
    let turns_to_win = result
        .mean_turns_to_win
        .map_or_else(|| "n/a".to_string(), |turns| format!("{turns:.2}"));

    print_stats_table(&[
        ("Episodes", &episodes),
        ("Victories", &wins),
        ("Defeats", &losses),
        ("Turn cap reached", &truncated),
        ("Mean turns", &mean_turns),
        ("Mean turns to win", &turns_to_win),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50.0%");
        assert_eq!(format_percent(0.1234), "12.3%");
    }
}
