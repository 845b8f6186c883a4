// src/console.rs
// =============================================================================
// Where human-readable output goes.
//
// Normally progress lines and summaries are printed to stdout. With --json,
// stdout is reserved for the JSON document, so the same lines go to stderr
// instead (eprintln! won't mess up JSON output on stdout).
//
// Tests use a capturing console to assert on what a run printed.
// =============================================================================

use std::fmt::Display;
#[cfg(test)]
use std::sync::Mutex;

#[derive(Debug)]
enum Target {
    Stdout,
    Stderr,
    #[cfg(test)]
    Buffer(Mutex<Vec<String>>),
}

#[derive(Debug)]
pub struct Console {
    target: Target,
}

impl Console {
    /// Human output on stdout, or on stderr when stdout carries JSON
    pub fn new(json_only: bool) -> Self {
        let target = if json_only { Target::Stderr } else { Target::Stdout };
        Self { target }
    }

    /// Keeps lines in memory instead of printing them
    #[cfg(test)]
    pub fn capture() -> Self {
        Self {
            target: Target::Buffer(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        match &self.target {
            Target::Buffer(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn line(&self, text: impl Display) {
        match &self.target {
            Target::Stdout => println!("{}", text),
            Target::Stderr => eprintln!("{}", text),
            #[cfg(test)]
            Target::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(text.to_string());
                }
            }
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    /// A horizontal rule framing summary blocks
    pub fn rule(&self) {
        self.line("=".repeat(50));
    }
}
