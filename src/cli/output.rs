//! CLI output.
//!
//! People get colored, indented lines. `--json` turns every line into one
//! `{"type", "payload"}` object on stdout. `--quiet` keeps only warnings and
//! errors.

use std::fmt::Display;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::{json, Value};

/// Global output flags, set once from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

static CONFIG: RwLock<OutputConfig> = parking_lot::const_rwlock(OutputConfig {
    json: false,
    quiet: false,
});

pub fn configure(config: OutputConfig) {
    *CONFIG.write() = config;
}

fn current() -> OutputConfig {
    *CONFIG.read()
}

fn json_line(kind: &str, payload: Value) -> Value {
    json!({ "type": kind, "payload": payload })
}

/// Data line: `payload` in JSON mode, `human` otherwise unless quiet.
fn emit(kind: &str, payload: Value, human: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json_line(kind, payload));
    } else if !config.quiet {
        human();
    }
}

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    const fn kind(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    fn symbol(self) -> String {
        match self {
            Self::Success => "✓".green().to_string(),
            Self::Warning => "⚠".yellow().to_string(),
            Self::Error => "×".red().to_string(),
        }
    }
}

fn status(status: Status, message: &str) {
    let config = current();
    let to_stderr = matches!(status, Status::Error);
    let line = if config.json {
        json_line(status.kind(), json!({ "message": message })).to_string()
    } else if config.quiet && matches!(status, Status::Success) {
        return;
    } else {
        format!("  {} {message}", status.symbol())
    };
    if to_stderr {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn header(version: &str) {
    emit(
        "header",
        json!({ "app": env!("CARGO_PKG_NAME"), "version": version }),
        || {
            println!("{} {}", env!("CARGO_PKG_NAME").bold(), version.dimmed());
            println!();
        },
    );
}

pub fn section(title: &str) {
    emit("section", json!({ "title": title }), || {
        println!();
        println!("{}", title.bold());
    });
}

/// `label  value`, aligned.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        json!({ "label": label, "value": value }),
        || println!("  {:<14} {value}", label.dimmed()),
    );
}

pub fn success(message: &str) {
    status(Status::Success, message);
}

pub fn warning(message: &str) {
    status(Status::Warning, message);
}

pub fn error(message: &str) {
    status(Status::Error, message);
}

/// Pre-rendered text such as a table. Skipped in JSON mode, where the same
/// data goes out through [`record`].
pub fn lines(block: &str) {
    let config = current();
    if config.json || config.quiet {
        return;
    }
    for line in block.lines() {
        println!("  {line}");
    }
}

/// Structured row for scripts; nothing in human mode.
pub fn record(kind: &str, payload: Value) {
    if current().json {
        println!("{}", json_line(kind, payload));
    }
}

fn paint(value: impl Display, style: fn(&str) -> String) -> String {
    let value = value.to_string();
    if current().json {
        value
    } else {
        style(&value)
    }
}

pub fn highlight(value: impl Display) -> String {
    paint(value, |v| v.cyan().to_string())
}

pub fn muted(value: impl Display) -> String {
    paint(value, |v| v.dimmed().to_string())
}
