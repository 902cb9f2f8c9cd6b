// file: src/console/mod.rs
// version: 1.1.0
// guid: 6249fbc7-9d89-4aa9-9b2b-8a6e13076020

//! Operator-facing output
//!
//! Every step receives a [`Console`] instead of printing directly, so color
//! support is a property of the instance and tests can capture the text.

use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};

const RULE_WIDTH: usize = 70;

/// Marked, optionally colored, line output
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    styled: bool,
}

impl Console {
    /// Console on stdout, colored when stdout is a terminal and `NO_COLOR` is unset
    pub fn stdout() -> Self {
        let styled = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::with_writer(Box::new(std::io::stdout()), styled)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, styled: bool) -> Self {
        Self {
            out: Mutex::new(out),
            styled,
        }
    }

    /// Uncolored console writing into a buffer the caller can inspect
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::with_writer(Box::new(buffer.clone()), false), buffer)
    }

    fn emit(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", text);
            let _ = out.flush();
        }
    }

    /// Write text without a trailing newline (prompts)
    pub fn inline(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = write!(out, "{}", text);
            let _ = out.flush();
        }
    }

    pub fn header(&self, text: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        let block = format!("\n{}\n{}\n{}\n", rule, text, rule);
        if self.styled {
            self.emit(&block.magenta().bold().to_string());
        } else {
            self.emit(&block);
        }
    }

    pub fn success(&self, text: &str) {
        self.marked("✓", text, |s| s.green().to_string());
    }

    pub fn error(&self, text: &str) {
        self.marked("✗", text, |s| s.red().to_string());
    }

    pub fn warning(&self, text: &str) {
        self.marked("⚠", text, |s| s.yellow().to_string());
    }

    pub fn info(&self, text: &str) {
        self.marked("ℹ", text, |s| s.blue().to_string());
    }

    /// Unmarked line
    pub fn line(&self, text: &str) {
        self.emit(text);
    }

    /// Emphasize a command the operator should copy
    pub fn highlight(&self, text: &str) -> String {
        if self.styled {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Render a question the way warnings are rendered
    pub fn question(&self, text: &str) -> String {
        if self.styled {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn marked(&self, marker: &str, text: &str, paint: impl Fn(&str) -> String) {
        let line = format!("{} {}", marker, text);
        if self.styled {
            self.emit(&paint(&line));
        } else {
            self.emit(&line);
        }
    }
}

/// Clonable in-memory sink used by [`Console::buffered`]
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_distinct() {
        let (console, buffer) = Console::buffered();
        console.success("done");
        console.error("broken");
        console.warning("careful");
        console.info("note");

        let text = buffer.contents();
        assert!(text.contains("✓ done"));
        assert!(text.contains("✗ broken"));
        assert!(text.contains("⚠ careful"));
        assert!(text.contains("ℹ note"));
    }

    #[test]
    fn test_unstyled_console_has_no_escape_codes() {
        let (console, buffer) = Console::buffered();
        console.header("Installing Required Packages");
        assert!(!buffer.contents().contains('\u{1b}'));
        assert_eq!(console.highlight("sudo reboot"), "sudo reboot");
    }

    #[test]
    fn test_inline_leaves_cursor_on_the_line() {
        let (console, buffer) = Console::buffered();
        console.inline("Bridge name [br0]: ");
        assert_eq!(buffer.contents(), "Bridge name [br0]: ");
    }
}
