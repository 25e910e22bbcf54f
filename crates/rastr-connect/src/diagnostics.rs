//! Line-oriented progress output.
//!
//! The resolver writes a line before and after each attempt and a summary per
//! outcome. Sinks only observe; nothing they do feeds back into resolution.

use std::io::Write;

/// A consumer of human-readable progress lines.
pub trait DiagnosticSink {
    fn line(&mut self, text: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn line(&mut self, text: &str) {
        (**self).line(text)
    }
}

/// Collects lines in memory.
impl DiagnosticSink for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn line(&mut self, _text: &str) {}
}

/// Forwards each line to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn line(&mut self, text: &str) {
        tracing::info!(target: "rastr_connect::diagnostics", "{text}");
    }
}

/// Writes lines to any [`Write`]r (stdout, stderr, a file).
///
/// Write errors are dropped: losing a progress line must not abort a
/// connection attempt.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}
