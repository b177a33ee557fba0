//! User-visible status reporting.
//!
//! Status lines are the operator-facing output of the loop, one per
//! operation. They are kept apart from tracing so they can be captured.

use std::fmt;

use crate::health::monitor::LoopReport;
use crate::health::record::HealthCheckRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
    Info,
}

/// One human-readable outcome line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failure,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.kind {
            StatusKind::Success => "✓",
            StatusKind::Failure => "✗",
            StatusKind::Info => "•",
        };
        write!(f, "{} {}", mark, self.text)
    }
}

/// Receives the loop's user-visible output.
pub trait StatusSink: Send {
    /// One line per tick.
    fn status(&mut self, line: &StatusLine);

    /// Recent records read back after a successful write.
    fn recent(&mut self, records: &[HealthCheckRecord]);

    /// Called once after the loop has stopped and the connection is closed.
    fn shutdown(&mut self, report: &LoopReport);
}

/// Prints to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl StatusSink for ConsoleReporter {
    fn status(&mut self, line: &StatusLine) {
        println!("{}", line);
    }

    fn recent(&mut self, records: &[HealthCheckRecord]) {
        println!("\nRecent health checks:");
        for record in records {
            println!("  {}", record);
        }
    }

    fn shutdown(&mut self, report: &LoopReport) {
        println!(
            "\nShutting down gracefully after {} tick(s) ({} healthy, {} unhealthy, {} standby)",
            report.ticks, report.healthy, report.unhealthy, report.standby
        );
        println!("✓ Disconnected from database");
    }
}
