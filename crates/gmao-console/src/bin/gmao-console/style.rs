//! Shared styling helpers for CLI output.

use std::io::IsTerminal;

use owo_colors::OwoColorize;

fn should_color() -> bool {
    std::io::stdout().is_terminal()
}

fn paint(text: &str, colored: impl Fn(&str) -> String) -> String {
    if should_color() {
        colored(text)
    } else {
        text.to_string()
    }
}

pub fn success(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), |text| format!("{}", text.green()))
}

pub fn warning(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), |text| format!("{}", text.yellow()))
}

pub fn error(text: impl AsRef<str>) -> String {
    paint(text.as_ref(), |text| format!("{}", text.red()))
}
