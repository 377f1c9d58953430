//! Console output for command progress and notices.
//!
//! Everything goes to stderr so stdout stays clean for JSON and listings.

use binq_core::Reporter;
use crossterm::style::Stylize;

/// Prints reporter events to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    /// With `quiet`, only warnings and errors are shown.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        if !self.quiet {
            eprintln!("{} {}", "==>".blue().bold(), title.bold());
        }
    }

    fn downloading(&self, file: &str, current: u64, total: Option<u64>) {
        if self.quiet {
            return;
        }
        match total {
            Some(total) if current == total => eprintln!("    {file}: {} done", format_size(total)),
            _ if current == 0 => eprintln!("    {file}: started"),
            _ => {}
        }
    }

    fn notice(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{} {msg}", "Notice:".cyan());
        }
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{msg}");
        }
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.green());
        }
    }

    fn warning(&self, msg: &str) {
        eprintln!("{}", warning_line(msg));
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", error_line(msg));
    }
}

fn warning_line(msg: &str) -> String {
    format!("{} {}", "Warning!".yellow().bold(), msg.yellow())
}

fn error_line(msg: &str) -> String {
    format!("{} {}", "Error!".red().bold(), msg.red())
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024 * 10 && unit < UNITS.len() - 1 {
        size /= 1024;
        unit += 1;
    }
    format!("{size} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(20 * 1024), "20 KB");
        assert_eq!(format_size(30 * 1024 * 1024), "30 MB");
    }

    #[test]
    fn test_styled_lines_keep_text() {
        let line = warning_line("checksum mismatch");
        assert!(line.contains("Warning!"));
        assert!(line.contains("checksum mismatch"));
        assert!(line.find("Warning!") < line.find("checksum mismatch"));

        let line = error_line("boom");
        assert!(line.contains("Error!"));
        assert!(line.contains("boom"));
    }
}
