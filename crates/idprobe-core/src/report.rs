//! Per-identity outcome reporting.
//!
//! Probes report what they observed through [`record`], which turns each
//! outcome into a structured `tracing` event on the [`OUTCOME_TARGET`] target.
//! These events are for observability only: the values returned by the
//! probes are the authoritative result.

use std::fmt;

/// Tracing target used for outcome events.
pub const OUTCOME_TARGET: &str = "idprobe::outcome";

/// Severity of a reported probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Diagnostic detail
    Debug,
    /// Noteworthy but not a hit
    Info,
    /// Positive result (identity exists, password matched)
    Success,
    /// Negative result
    Fail,
    /// The probe could not produce a meaningful result
    Error,
}

impl Severity {
    /// Lowercase name, as written into the `outcome` field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record one outcome line for `identity`.
pub fn record(severity: Severity, identity: &str, detail: &str) {
    let outcome = severity.as_str();
    match severity {
        Severity::Debug => {
            tracing::debug!(target: OUTCOME_TARGET, identity, outcome, "{detail}");
        }
        Severity::Info | Severity::Success | Severity::Fail => {
            tracing::info!(target: OUTCOME_TARGET, identity, outcome, "{detail}");
        }
        Severity::Error => {
            tracing::error!(target: OUTCOME_TARGET, identity, outcome, "{detail}");
        }
    }
}

/// Record a provider response the engine does not recognize.
pub fn unrecognized(identity: &str, detail: &str) {
    tracing::warn!(target: OUTCOME_TARGET, identity, outcome = "unknown", "{detail}");
}
