//! Shared types used across the probe engine.
//!
//! A probe call takes a [`ProbeRequest`] and produces exactly one [`Verdict`].
//! Verdicts are derived per call and never stored.

use crate::error::IdprobeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic outcome of a single probe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Identity exists
    Exists,
    /// Identity exists but authenticates against a different identity provider
    ExistsDifferentProvider,
    /// Identity exists and is locked out
    ExistsLocked,
    /// Identity exists and is disabled
    ExistsDisabled,
    /// Identity exists and requires multi-factor authentication
    ExistsMfaRequired,
    /// Identity exists and its password has expired
    ExistsPasswordExpired,
    /// Identity exists and has no password set
    ExistsNoPassword,
    /// Identity does not exist
    DoesNotExist,
    /// The tenant behind the identity's domain does not exist
    TenantNotFound,
    /// The probing application is not registered in the tenant
    AppNotFound,
    /// The provider throttled the request instead of evaluating it
    Throttled,
    /// The outcome could not be determined
    Unknown,
}

impl Verdict {
    /// Whether this verdict proves the identity exists.
    #[must_use]
    pub fn is_existence(&self) -> bool {
        matches!(
            self,
            Self::Exists
                | Self::ExistsDifferentProvider
                | Self::ExistsLocked
                | Self::ExistsDisabled
                | Self::ExistsMfaRequired
                | Self::ExistsPasswordExpired
                | Self::ExistsNoPassword
        )
    }

    /// Short human-readable description used in outcome lines.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::ExistsDifferentProvider => "exists under a different identity provider",
            Self::ExistsLocked => "exists but is locked",
            Self::ExistsDisabled => "exists but is disabled",
            Self::ExistsMfaRequired => "exists, MFA required",
            Self::ExistsPasswordExpired => "exists but the password is expired",
            Self::ExistsNoPassword => "exists but has no password",
            Self::DoesNotExist => "does not exist",
            Self::TenantNotFound => "tenant not found",
            Self::AppNotFound => "application not found in tenant",
            Self::Throttled => "throttled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Which probe a caller wants to run for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Scrape-and-classify against the Office credential-type endpoint
    #[default]
    Office,
    /// Passive OAuth2 enumeration with a throwaway password
    OAuth2,
    /// Active OAuth2 probe with a caller-supplied password
    #[serde(rename = "brute")]
    OAuth2Brute,
}

impl ProbeMode {
    /// Whether the mode needs a secret in the request.
    #[must_use]
    pub fn requires_secret(&self) -> bool {
        matches!(self, Self::OAuth2Brute)
    }

    /// Get the configuration/command-line name of the mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::OAuth2 => "oauth2",
            Self::OAuth2Brute => "brute",
        }
    }
}

impl FromStr for ProbeMode {
    type Err = IdprobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "office" => Ok(Self::Office),
            "oauth2" => Ok(Self::OAuth2),
            "brute" => Ok(Self::OAuth2Brute),
            other => Err(IdprobeError::Validation(format!(
                "unknown probe mode '{other}', expected office, oauth2 or brute"
            ))),
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to a single probe call. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    identity: String,
    secret: Option<String>,
}

impl ProbeRequest {
    /// Create a new request.
    ///
    /// # Errors
    /// Returns error if the identity is empty or only whitespace.
    pub fn new(identity: impl Into<String>, secret: Option<String>) -> Result<Self, IdprobeError> {
        let identity = identity.into().trim().to_string();
        if identity.is_empty() {
            return Err(IdprobeError::Validation(
                "identity must not be empty".to_string(),
            ));
        }
        Ok(Self { identity, secret })
    }

    /// The identity (usually an email address) to probe.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The secret for active probes, if any.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Domain part of the identity: text after the last `@`, or the whole
    /// identity when it has none.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.identity
            .rsplit_once('@')
            .map_or(self.identity.as_str(), |(_, domain)| domain)
    }
}

impl fmt::Debug for ProbeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeRequest")
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
