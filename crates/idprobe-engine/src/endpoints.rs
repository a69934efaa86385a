//! Fixed provider endpoints and protocol constants.

/// Marketing page carrying the Office application identifier.
pub const OFFICE_URL: &str = "https://www.office.com";

/// Login redirect page carrying the per-load session tokens.
pub const OFFICE_LOGIN_URL: &str = "https://www.office.com/login?es=Click&ru=/&msafed=0";

/// Credential-type classification endpoint.
pub const CREDENTIAL_TYPE_URL: &str =
    "https://login.microsoftonline.com/common/GetCredentialType?mkt=en-US";

/// Origin header sent with the classification request.
pub const CREDENTIAL_TYPE_ORIGIN: &str = "https://login.microsoftonline.com";

/// OAuth2 token endpoint.
pub const OAUTH2_TOKEN_URL: &str = "https://login.microsoft.com/common/oauth2/token";

/// Realm-info endpoint; `{domain}` is replaced by the candidate domain.
pub const USER_REALM_URL: &str =
    "https://login.microsoftonline.com/getuserrealm.srf?login=user@{domain}&xml=1";

/// Public client identifier used for the password grant.
pub const OAUTH2_CLIENT_ID: &str = "1b730954-1685-4b74-9bfd-dac224a7b894";

/// Grant type for the token request.
pub const OAUTH2_GRANT_TYPE: &str = "password";

/// Resource requested in the token request.
pub const OAUTH2_RESOURCE: &str = "https://graph.windows.net";

/// Scope requested in the token request.
pub const OAUTH2_SCOPE: &str = "openid";

/// Build the realm-info URL for a domain.
#[must_use]
pub fn user_realm_url(domain: &str) -> String {
    USER_REALM_URL.replace("{domain}", domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_realm_url() {
        assert_eq!(
            user_realm_url("contoso.com"),
            "https://login.microsoftonline.com/getuserrealm.srf?login=user@contoso.com&xml=1"
        );
    }
}
