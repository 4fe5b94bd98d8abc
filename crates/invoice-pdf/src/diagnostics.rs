//! Recoverable render problems
//!
//! An image that cannot be decoded or embedded does not fail the render.
//! The renderer skips it and reports a [`Diagnostic`] to a sink instead.

use serde::Serialize;
use std::fmt;

/// Visual element a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSource {
    Logo,
    Signature,
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSource::Logo => f.write_str("logo"),
            DiagnosticSource::Signature => f.write_str("signature"),
        }
    }
}

/// One skipped element and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.source, self.message)
    }
}

/// Receives diagnostics as they happen during a render
pub trait DiagnosticsSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            source = %diagnostic.source,
            message = %diagnostic.message,
            "render element skipped"
        );
    }
}

impl DiagnosticsSink for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.record(Diagnostic {
            source: DiagnosticSource::Signature,
            message: "bad data".to_string(),
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].to_string(), "signature skipped: bad data");
    }
}
