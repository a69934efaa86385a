//! Probe engine facade.
//!
//! `ProbeEngine` owns one instance of every probe on top of a shared
//! transport and dispatches a single probe per identity. It holds no mutable
//! state, so one engine can serve many concurrent callers.

use crate::error::{ProbeError, Result};
use crate::oauth2::OAuth2Probe;
use crate::office::{OfficeProbe, SessionRetry};
use crate::outcome::ProbeOutcome;
use crate::tenant::TenantValidator;
use crate::transport::{HttpTransport, ReqwestTransport};
use idprobe_core::report::{self, Severity};
use idprobe_core::{AppConfig, ProbeMode, ProbeRequest, Verdict};
use std::sync::Arc;

/// Dispatches probes for single identities.
#[derive(Clone)]
pub struct ProbeEngine {
    office: OfficeProbe,
    oauth2: OAuth2Probe,
    tenant: TenantValidator,
    mode: ProbeMode,
    validate_tenant: bool,
}

impl ProbeEngine {
    /// Create an engine with default settings on top of a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            office: OfficeProbe::new(transport.clone()),
            oauth2: OAuth2Probe::new(transport.clone()),
            tenant: TenantValidator::new(transport),
            mode: ProbeMode::default(),
            validate_tenant: true,
        }
    }

    /// Create an engine using the network and probe settings from `config`.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config.network)?);
        Ok(Self::new(transport)
            .with_mode(config.probe.mode)
            .with_session_retry(SessionRetry::with_max_attempts(
                config.probe.session_attempts,
            ))
            .with_tenant_validation(config.probe.validate_tenant))
    }

    /// Set the probe used by [`enumerate`](Self::enumerate).
    #[must_use]
    pub fn with_mode(mut self, mode: ProbeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the Office session-token retry policy.
    #[must_use]
    pub fn with_session_retry(mut self, retry: SessionRetry) -> Self {
        self.office = self.office.with_session_retry(retry);
        self
    }

    /// Enable or disable the tenant check in [`enumerate`](Self::enumerate).
    #[must_use]
    pub fn with_tenant_validation(mut self, enabled: bool) -> Self {
        self.validate_tenant = enabled;
        self
    }

    /// Configured probe mode.
    #[must_use]
    pub fn mode(&self) -> ProbeMode {
        self.mode
    }

    /// Run exactly one probe for the request.
    ///
    /// # Errors
    /// Returns [`ProbeError::InvalidRequest`] when `OAuth2Brute` is asked for
    /// without a secret, and [`ProbeError::AccountLocked`] when the active
    /// probe hits a locked account.
    pub async fn probe(&self, mode: ProbeMode, request: &ProbeRequest) -> Result<ProbeOutcome> {
        let identity = request.identity();
        match mode {
            ProbeMode::Office => Ok(self.office.enumerate(identity).await),
            ProbeMode::OAuth2 => Ok(self.oauth2.enumerate(identity).await),
            ProbeMode::OAuth2Brute => {
                let secret = request.secret().ok_or_else(|| {
                    ProbeError::InvalidRequest(format!("mode '{mode}' requires a password"))
                })?;
                self.oauth2.brute(identity, secret).await
            }
        }
    }

    /// Probe with the configured mode, checking the identity's tenant first
    /// when tenant validation is enabled.
    ///
    /// An identity whose domain is not a tenant yields `TenantNotFound`
    /// without contacting the enumeration endpoint.
    pub async fn enumerate(&self, request: &ProbeRequest) -> Result<ProbeOutcome> {
        if self.validate_tenant && !self.tenant.validate(request.domain()).await {
            report::record(
                Severity::Fail,
                request.identity(),
                &format!("tenant '{}' does not exist", request.domain()),
            );
            return Ok(ProbeOutcome::new(
                request.identity(),
                Verdict::TenantNotFound,
                false,
            ));
        }

        self.probe(self.mode, request).await
    }

    /// Check whether `domain` is a tenant of the provider.
    pub async fn validate_tenant(&self, domain: &str) -> bool {
        self.tenant.validate(domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_default_config() {
        let engine = ProbeEngine::from_config(&AppConfig::default()).expect("build engine");
        assert_eq!(engine.mode(), ProbeMode::Office);
    }

    #[test]
    fn test_engine_from_config_rejects_bad_proxy() {
        let mut config = AppConfig::default();
        config.network.proxy = Some("not a url".to_string());
        let err = ProbeEngine::from_config(&config).err().expect("bad proxy");
        assert!(matches!(err, ProbeError::Client(_)));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProbeEngine>();
    }
}
