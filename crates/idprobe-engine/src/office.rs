//! Office credential-type probe.
//!
//! Three stages:
//! 1. Scrape the application id from the Office landing page.
//! 2. Scrape the per-load session tokens from the login redirect page,
//!    retrying a bounded number of times because the page does not always
//!    render every token.
//! 3. POST the credential-type request and classify the JSON answer.

use crate::endpoints::{
    CREDENTIAL_TYPE_ORIGIN, CREDENTIAL_TYPE_URL, OFFICE_LOGIN_URL, OFFICE_URL,
};
use crate::extractor::{ExtractionResult, TokenExtractor};
use crate::outcome::ProbeOutcome;
use crate::transport::{HttpTransport, PostRequest};
use idprobe_core::random::{random_string, CANARY_LEN};
use idprobe_core::report::{self, Severity};
use idprobe_core::Verdict;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

static APP_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r", appId: '(.*?)' ").expect("valid appId regex"));

static PAGE_GROUP_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"hpgid":([0-9]+),"#).expect("valid hpgid regex"));

static PAGE_ACTION_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"hpgact":([0-9]+),"#).expect("valid hpgact regex"));

static CONTEXT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""sCtx":"(.*?)""#).expect("valid sCtx regex"));

/// Response header carrying the request-correlation id of the login page.
const REQUEST_ID_HEADER: &str = "x-ms-request-id";

/// Session tokens scraped from the login page: three body tokens plus one header.
pub const SESSION_FIELD_COUNT: usize = 4;

/// Default cap on login-page loads.
pub const DEFAULT_SESSION_ATTEMPTS: u32 = 4;

/// Bounded retry policy for session-token acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRetry {
    /// Total page loads allowed, first attempt included
    pub max_attempts: u32,
    /// Number of fields a load must yield to be usable
    pub required_fields: usize,
}

impl Default for SessionRetry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SESSION_ATTEMPTS,
            required_fields: SESSION_FIELD_COUNT,
        }
    }
}

/// Why session-token acquisition gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFailure {
    /// A page load got no response at all
    #[error("no response on attempt {attempt}")]
    NoResponse {
        /// Attempt that failed, starting at 1
        attempt: u32,
    },

    /// Every allowed load came back without the full token set
    #[error("unable to retrieve all the fields to authenticate after {attempts} attempts")]
    Incomplete {
        /// Attempts made
        attempts: u32,
    },
}

impl SessionRetry {
    /// Create a policy with an explicit attempt cap.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Whether an extraction carries every required field.
    #[must_use]
    pub fn is_complete(&self, extraction: &ExtractionResult) -> bool {
        extraction.len() >= self.required_fields
    }

    /// Call `fetch` until it yields a complete extraction, at most
    /// `max_attempts` times (never fewer than once). `fetch` receives the
    /// attempt number, starting at 1.
    pub async fn run<F, Fut>(&self, mut fetch: F) -> Result<ExtractionResult, SessionFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Option<ExtractionResult>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let Some(extraction) = fetch(attempt).await else {
                return Err(SessionFailure::NoResponse { attempt });
            };

            if self.is_complete(&extraction) {
                return Ok(extraction);
            }

            if attempt >= max_attempts {
                return Err(SessionFailure::Incomplete { attempts: attempt });
            }

            tracing::debug!(
                attempt,
                fields = extraction.len(),
                "Incomplete session tokens, retrying"
            );
        }
    }
}

/// Body of the credential-type request.
///
/// Every flag is a fixed constant; only `username` and `original_request`
/// vary per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct CredentialTypeRequest {
    /// Identity being probed
    pub username: String,
    /// Allow other identity providers in the answer
    pub is_other_idp_supported: bool,
    /// Ask for phone-based credentials
    pub check_phones: bool,
    /// Remote NGC support flag
    #[serde(rename = "isRemoteNGCSupported")]
    pub is_remote_ngc_supported: bool,
    /// Whether the cookie banner was shown
    pub is_cookie_banner_shown: bool,
    /// FIDO support flag
    pub is_fido_supported: bool,
    /// Serialized login context scraped from the login page
    pub original_request: String,
    /// Force one-time-code login
    pub forceotclogin: bool,
    /// Disallow external federation
    pub is_external_federation_disallowed: bool,
    /// Remote connect support flag
    pub is_remote_connect_supported: bool,
    /// Federation flags bitfield
    pub federation_flags: i32,
    /// Whether this is a sign-up flow
    pub is_signup: bool,
    /// Temporary access pass support flag
    pub is_access_pass_supported: bool,
}

impl CredentialTypeRequest {
    /// Build the request for `identity` within the session `context`.
    #[must_use]
    pub fn new(identity: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            username: identity.into(),
            is_other_idp_supported: true,
            check_phones: false,
            is_remote_ngc_supported: true,
            is_cookie_banner_shown: false,
            is_fido_supported: false,
            original_request: context.into(),
            forceotclogin: false,
            is_external_federation_disallowed: false,
            is_remote_connect_supported: false,
            federation_flags: 0,
            is_signup: false,
            is_access_pass_supported: true,
        }
    }
}

/// The parts of the credential-type response the probe reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CredentialTypeResponse {
    /// Provider existence code
    pub if_exists_result: Option<i32>,
    /// 1 when the request was throttled
    pub throttle_status: i32,
    /// Tenant properties
    pub ests_properties: Option<EstsProperties>,
}

/// Tenant properties nested in the credential-type response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EstsProperties {
    /// Seamless desktop SSO flag, when the tenant reports one
    pub desktop_sso_enabled: Option<bool>,
}

/// Throttle status value meaning the request was not evaluated.
const THROTTLED: i32 = 1;

/// Map a provider existence code to a verdict.
#[must_use]
pub fn classify_exists_result(code: i32) -> Verdict {
    match code {
        0 | 6 => Verdict::Exists,
        5 => Verdict::ExistsDifferentProvider,
        _ => Verdict::DoesNotExist,
    }
}

/// Classify a credential-type response, returning the verdict and a
/// diagnostic detail.
///
/// Checks in order: desktop SSO reported off, throttling, existence code.
#[must_use]
pub fn classify_credential_type(response: &CredentialTypeResponse) -> (Verdict, &'static str) {
    let sso_enabled = response
        .ests_properties
        .as_ref()
        .and_then(|props| props.desktop_sso_enabled);
    if sso_enabled == Some(false) {
        return (Verdict::DoesNotExist, "desktop SSO disabled");
    }

    if response.throttle_status == THROTTLED {
        return (Verdict::Throttled, "requests are being throttled");
    }

    match response.if_exists_result {
        Some(code) => {
            let verdict = classify_exists_result(code);
            let detail = match verdict {
                Verdict::ExistsDifferentProvider => {
                    "exists but is from a different identity provider (maybe a personal account)"
                }
                v if v.is_existence() => "exists",
                _ => "does not exist",
            };
            (verdict, detail)
        }
        None => (Verdict::Unknown, "response carried no existence result"),
    }
}

/// Tokens binding the classification request to one login page load.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionTokens {
    page_group_id: String,
    page_action_id: String,
    context: String,
    request_id: String,
    referer: String,
}

impl SessionTokens {
    fn from_extraction(extraction: &ExtractionResult) -> Option<Self> {
        Some(Self {
            page_group_id: extraction.get(0)?.to_string(),
            page_action_id: extraction.get(1)?.to_string(),
            context: extraction.get(2)?.to_string(),
            request_id: extraction.get(3)?.to_string(),
            referer: extraction.final_url().to_string(),
        })
    }
}

/// Probe built on the Office login flow and credential-type endpoint.
#[derive(Clone)]
pub struct OfficeProbe {
    transport: Arc<dyn HttpTransport>,
    extractor: TokenExtractor,
    retry: SessionRetry,
}

impl OfficeProbe {
    /// Create a probe with the default retry policy.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            extractor: TokenExtractor::new(transport.clone()),
            transport,
            retry: SessionRetry::default(),
        }
    }

    /// Replace the session-token retry policy.
    #[must_use]
    pub fn with_session_retry(mut self, retry: SessionRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Run the probe for one identity.
    pub async fn enumerate(&self, identity: &str) -> ProbeOutcome {
        let Some(client_id) = self.bootstrap(identity).await else {
            return ProbeOutcome::unknown(identity);
        };

        let session = match self.acquire_session().await {
            Ok(extraction) => SessionTokens::from_extraction(&extraction),
            Err(failure) => {
                report::record(Severity::Error, identity, &failure.to_string());
                return ProbeOutcome::unknown(identity);
            }
        };
        let Some(session) = session else {
            report::record(Severity::Error, identity, "session tokens out of order");
            return ProbeOutcome::unknown(identity);
        };

        self.classify(identity, &client_id, &session).await
    }

    /// Stage 1: application id from the landing page.
    async fn bootstrap(&self, identity: &str) -> Option<String> {
        let extraction = self
            .extractor
            .extract(OFFICE_URL, None, &[&*APP_ID_REGEX])
            .await?;

        match extraction.get(0) {
            Some(app_id) => Some(app_id.to_string()),
            None => {
                report::record(Severity::Error, identity, "unable to find the application id");
                None
            }
        }
    }

    /// Stage 2: session tokens from the login page, bounded retry.
    async fn acquire_session(&self) -> Result<ExtractionResult, SessionFailure> {
        let patterns: [&Regex; 3] = [&*PAGE_GROUP_ID_REGEX, &*PAGE_ACTION_ID_REGEX, &*CONTEXT_REGEX];
        self.retry
            .run(|_| {
                self.extractor
                    .extract(OFFICE_LOGIN_URL, Some(REQUEST_ID_HEADER), &patterns)
            })
            .await
    }

    /// Stage 3: classification request.
    async fn classify(
        &self,
        identity: &str,
        client_id: &str,
        session: &SessionTokens,
    ) -> ProbeOutcome {
        let payload = CredentialTypeRequest::new(identity, session.context.as_str());
        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(e) => {
                report::record(Severity::Error, identity, &format!("serialization error: {e}"));
                return ProbeOutcome::unknown(identity);
            }
        };

        let request = PostRequest::json(CREDENTIAL_TYPE_URL, body)
            .with_header("Origin", CREDENTIAL_TYPE_ORIGIN)
            .with_header("Accept", "application/json")
            .with_header("hpgact", session.page_action_id.as_str())
            .with_header("hpgid", session.page_group_id.as_str())
            .with_header("client-request-id", client_id)
            .with_header("hpgrequestid", session.request_id.as_str())
            .with_header("Referer", session.referer.as_str())
            .with_header("Canary", random_string(CANARY_LEN));

        let response = match self.transport.post(request).await {
            Ok(response) => response,
            Err(e) => {
                report::record(Severity::Error, identity, &format!("Error on response: {e}"));
                return ProbeOutcome::unknown(identity);
            }
        };

        // TODO: surface 429/5xx as Unknown once callers can retry indeterminate outcomes
        if response.status != 200 {
            report::record(
                Severity::Fail,
                identity,
                &format!("does not exist (HTTP {})", response.status),
            );
            return ProbeOutcome::new(identity, Verdict::DoesNotExist, false);
        }

        let parsed: CredentialTypeResponse = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                report::unrecognized(
                    identity,
                    &format!("unparseable credential-type response: {e}"),
                );
                return ProbeOutcome::unknown(identity);
            }
        };

        let (verdict, detail) = classify_credential_type(&parsed);
        let severity = match verdict {
            Verdict::Exists => Severity::Success,
            Verdict::ExistsDifferentProvider => Severity::Info,
            Verdict::Unknown => {
                report::unrecognized(identity, detail);
                return ProbeOutcome::unknown(identity);
            }
            _ => Severity::Fail,
        };
        report::record(severity, identity, detail);

        ProbeOutcome::new(identity, verdict, verdict.is_existence())
    }
}
