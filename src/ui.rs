use acctkit::Ensure;
use colored::{ColoredString, Colorize};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Marker for a requested ensure state
pub fn ensure_icon(ensure: Option<Ensure>) -> ColoredString {
    match ensure {
        Some(Ensure::Present) => "+".green(),
        Some(Ensure::Absent) => "-".red(),
        None => "·".dimmed(),
    }
}

/// Label for a requested ensure state
pub fn ensure_label(ensure: Option<Ensure>) -> ColoredString {
    match ensure {
        Some(Ensure::Present) => "present".green(),
        Some(Ensure::Absent) => "absent".red(),
        None => "unset".dimmed(),
    }
}

/// Pluralize a count, e.g. `1 key`, `3 keys`
pub fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{n} {}", if n == 1 { singular } else { plural })
}

// ============================================================================
// Tests
// ============================================================================
