//! Console colors. Plain text when the target stream is not a terminal or `NO_COLOR` is set.

use crossterm::style::{Color, Stylize};
use std::ffi::OsStr;
use std::io::IsTerminal;
use std::sync::OnceLock;

/// Output stream a piece of text is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn colors_enabled(self) -> bool {
        static STDOUT: OnceLock<bool> = OnceLock::new();
        static STDERR: OnceLock<bool> = OnceLock::new();

        let (cell, is_terminal) = match self {
            Self::Stdout => (&STDOUT, std::io::stdout().is_terminal()),
            Self::Stderr => (&STDERR, std::io::stderr().is_terminal()),
        };
        *cell.get_or_init(|| should_color(std::env::var_os("NO_COLOR").as_deref(), is_terminal))
    }
}

fn should_color(no_color: Option<&OsStr>, is_terminal: bool) -> bool {
    let no_color = no_color.is_some_and(|v| !v.is_empty());
    !no_color && is_terminal
}

pub fn paint_on(stream: Stream, text: &str, color: Color) -> String {
    if stream.colors_enabled() {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

fn paint(text: &str, color: Color) -> String {
    paint_on(Stream::Stdout, text, color)
}

pub fn red(text: &str) -> String {
    paint(text, Color::Red)
}

pub fn green(text: &str) -> String {
    paint(text, Color::Green)
}

pub fn yellow(text: &str) -> String {
    paint(text, Color::Yellow)
}

pub fn cyan(text: &str) -> String {
    paint(text, Color::Cyan)
}

pub fn gray(text: &str) -> String {
    paint(text, Color::DarkGrey)
}

pub fn purple(text: &str) -> String {
    paint(text, Color::Magenta)
}
