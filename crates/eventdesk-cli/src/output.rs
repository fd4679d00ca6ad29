//! What commands print. Results go to stdout; failures go to stderr so
//! piping `--json` output stays clean.

use std::fmt::Display;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

pub fn success(msg: &str) {
    println!("{} {msg}", "✓".green().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {msg}", "✗".red().bold());
}

/// One `label: value` line of a detail view.
pub fn field(label: &str, value: impl Display) {
    println!("{}", field_line(label, value));
}

fn field_line(label: &str, value: impl Display) -> String {
    format!("{:>8}: {value}", label.dimmed())
}

pub fn json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_labels_are_right_aligned() {
        colored::control::set_override(false);
        assert_eq!(field_line("User", "Ada"), "    User: Ada");
        assert_eq!(field_line("Backend", 2), " Backend: 2");
    }
}
