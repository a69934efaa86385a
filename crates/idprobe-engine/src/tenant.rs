//! Tenant validation through the realm-info endpoint.

use crate::endpoints::user_realm_url;
use crate::transport::HttpTransport;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static NAMESPACE_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<NameSpaceType>([^<]*)</NameSpaceType>").expect("valid namespace regex")
});

/// Namespace types that identify a provider-backed tenant.
const TENANT_NAMESPACE_TYPES: &[&str] = &["Federated", "Managed"];

/// Checks whether a domain is a tenant of the identity provider.
#[derive(Clone)]
pub struct TenantValidator {
    transport: Arc<dyn HttpTransport>,
}

impl TenantValidator {
    /// Create a validator on top of a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Returns `true` only when the realm info reports a federated or managed
    /// namespace. Network failures and any other namespace type yield `false`.
    pub async fn validate(&self, domain: &str) -> bool {
        let url = user_realm_url(domain);
        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error on response: {}", e);
                return false;
            }
        };

        let namespace = namespace_type(&response.body);
        tracing::debug!(domain, namespace = ?namespace, "Realm info received");
        namespace.is_some_and(is_tenant_namespace)
    }
}

/// Extract the `NameSpaceType` value from a realm-info XML document.
#[must_use]
pub fn namespace_type(xml: &str) -> Option<&str> {
    NAMESPACE_TYPE_REGEX
        .captures(xml)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Whether a namespace type identifies a provider-backed tenant.
#[must_use]
pub fn is_tenant_namespace(namespace: &str) -> bool {
    TENANT_NAMESPACE_TYPES.contains(&namespace)
}
