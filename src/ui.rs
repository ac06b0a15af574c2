use crate::types::{DiagnosisResult, ScoreLevel};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const CORAL: (u8, u8, u8) = (255, 106, 193);
    pub const ELECTRIC_YELLOW: (u8, u8, u8) = (241, 250, 140);
    pub const SUCCESS_GREEN: (u8, u8, u8) = (80, 250, 123);
    pub const ERROR_RED: (u8, u8, u8) = (255, 99, 99);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
    pub const DIM_SEPARATOR: (u8, u8, u8) = (60, 60, 70);
}

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("✦✧✶✷✸✹✺✻✼✽")
        .template("{spinner} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            "◐ Design Lens".magenta().bold(),
            "version".cyan(),
            version.green()
        );
    }
}

/// Color for a score band
pub const fn level_color(level: ScoreLevel) -> (u8, u8, u8) {
    match level {
        ScoreLevel::Excellent => rgb::SUCCESS_GREEN,
        ScoreLevel::Good => rgb::NEON_CYAN,
        ScoreLevel::Fair => rgb::ELECTRIC_YELLOW,
        ScoreLevel::NeedsWork => rgb::CORAL,
        ScoreLevel::Rebuild => rgb::ERROR_RED,
    }
}

fn styled_score(score: u8) -> String {
    let level = ScoreLevel::from_score(score);
    let (r, g, b) = level_color(level);
    format!("{score:>3}").truecolor(r, g, b).bold().to_string()
}

/// Render a diagnosis as a terminal report
pub fn format_report(result: &DiagnosisResult) -> String {
    let mut output = String::new();
    let overall = result.overall_score();
    let level = ScoreLevel::from_score(overall);
    let (r, g, b) = level_color(level);

    let _ = writeln!(
        output,
        "{}  {}  {}",
        "━━━".truecolor(
            rgb::ELECTRIC_PURPLE.0,
            rgb::ELECTRIC_PURPLE.1,
            rgb::ELECTRIC_PURPLE.2
        ),
        result.file_name().bold(),
        "━━━".truecolor(
            rgb::ELECTRIC_PURPLE.0,
            rgb::ELECTRIC_PURPLE.1,
            rgb::ELECTRIC_PURPLE.2
        ),
    );
    let _ = writeln!(
        output,
        "Overall {} / 100  {}",
        styled_score(overall),
        level.label().truecolor(r, g, b)
    );

    for (dimension, entry) in result.dimensions().iter() {
        let _ = writeln!(
            output,
            "\n{} {} {}",
            "─".truecolor(rgb::NEON_CYAN.0, rgb::NEON_CYAN.1, rgb::NEON_CYAN.2),
            dimension.title().to_uppercase().bold(),
            styled_score(entry.score)
        );
        for issue in &entry.issues {
            let _ = writeln!(
                output,
                "  {} {}",
                "!".truecolor(rgb::CORAL.0, rgb::CORAL.1, rgb::CORAL.2),
                issue
            );
        }
        for suggestion in &entry.suggestions {
            let _ = writeln!(
                output,
                "  {} {}",
                "•".truecolor(rgb::SUCCESS_GREEN.0, rgb::SUCCESS_GREEN.1, rgb::SUCCESS_GREEN.2),
                suggestion.truecolor(rgb::DIM_WHITE.0, rgb::DIM_WHITE.1, rgb::DIM_WHITE.2)
            );
        }
    }

    let _ = writeln!(
        output,
        "\n{}",
        format!("id {}  ·  {}", result.id(), result.timestamp().to_rfc3339()).truecolor(
            rgb::DIM_SEPARATOR.0,
            rgb::DIM_SEPARATOR.1,
            rgb::DIM_SEPARATOR.2
        )
    );
    output
}
