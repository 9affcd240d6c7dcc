//! Terminal output for operator-facing notices.

use bpctl_core::notify::Notifier;
use std::io::Write;

/// Writes notices to stdout and warnings to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
    }

    fn warn(&self, line: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", line);
    }
}

/// Report a failed command the way every command does.
pub fn display_failure(error: &anyhow::Error) {
    let mut err = std::io::stderr().lock();
    let _ = writeln!(err, "FAILED");
    let _ = writeln!(err, "{:#}", error);
}
