use idprobe_core::Verdict;
use serde::Serialize;
use std::fmt;

/// Result of one probe call for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// Probed identity
    pub identity: String,
    /// Semantic verdict
    pub verdict: Verdict,
    /// Whether the caller should count this identity as a hit
    pub valid: bool,
}

impl ProbeOutcome {
    /// Create an outcome.
    #[must_use]
    pub fn new(identity: impl Into<String>, verdict: Verdict, valid: bool) -> Self {
        Self {
            identity: identity.into(),
            verdict,
            valid,
        }
    }

    /// Outcome for a probe that could not reach a verdict.
    #[must_use]
    pub fn unknown(identity: impl Into<String>) -> Self {
        Self::new(identity, Verdict::Unknown, false)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.valid { "+" } else { "-" };
        write!(f, "[{marker}] {} {}", self.identity, self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let hit = ProbeOutcome::new("alice@contoso.com", Verdict::ExistsMfaRequired, true);
        assert_eq!(hit.to_string(), "[+] alice@contoso.com exists, MFA required");

        let miss = ProbeOutcome::unknown("bob@contoso.com");
        assert_eq!(miss.to_string(), "[-] bob@contoso.com unknown");
    }
}
