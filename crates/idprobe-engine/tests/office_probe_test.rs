//! Integration tests for the Office credential-type probe.
//!
//! Drives the full three-stage flow against a scripted transport.

mod common;

use common::{
    complete_login_page, credential_type, incomplete_login_page, landing_page, ScriptedTransport,
};
use idprobe_core::Verdict;
use idprobe_engine::endpoints::{CREDENTIAL_TYPE_URL, OFFICE_LOGIN_URL, OFFICE_URL};
use idprobe_engine::{OfficeProbe, PostBody, SessionRetry};

const IDENTITY: &str = "alice@contoso.com";

#[tokio::test]
async fn test_existing_identity() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(
        200,
        r#"{"Username":"alice@contoso.com","IfExistsResult":0,"ThrottleStatus":0}"#,
    ));

    let probe = OfficeProbe::new(transport.clone());
    let outcome = probe.enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Exists);
    assert!(outcome.valid);
    assert_eq!(transport.get_urls(), vec![OFFICE_URL, OFFICE_LOGIN_URL]);
}

#[tokio::test]
async fn test_classification_request_shape() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(200, r#"{"IfExistsResult":1,"ThrottleStatus":0}"#));

    OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    let request = &posts[0];
    assert_eq!(request.url, CREDENTIAL_TYPE_URL);
    assert_eq!(request.header("hpgid"), Some("1104"));
    assert_eq!(request.header("hpgact"), Some("1800"));
    assert_eq!(
        request.header("client-request-id"),
        Some("4765445b-32c6-49b0-83e6-1d93765276ca")
    );
    assert_eq!(
        request.header("hpgrequestid"),
        Some("c0ffee00-0000-4000-8000-000000000001")
    );
    assert_eq!(
        request.header("Referer"),
        Some("https://login.microsoftonline.com/common/oauth2/authorize?client_id=4765445b")
    );
    assert_eq!(request.header("Canary").map(str::len), Some(248));
    assert_eq!(request.header("Accept"), Some("application/json"));

    let PostBody::Json(body) = &request.body else {
        panic!("expected a JSON body");
    };
    assert_eq!(body["username"], IDENTITY);
    assert_eq!(body["originalRequest"], "rQQIARAAhZK9");
}

#[tokio::test]
async fn test_session_completes_on_third_attempt() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(incomplete_login_page());
    transport.push_get(incomplete_login_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(200, r#"{"IfExistsResult":6,"ThrottleStatus":0}"#));

    let outcome = OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Exists);
    assert!(outcome.valid);
    assert_eq!(transport.get_urls().len(), 4);
    assert_eq!(transport.posts().len(), 1);
}

#[tokio::test]
async fn test_session_gives_up_after_four_attempts() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    for _ in 0..6 {
        transport.push_get(incomplete_login_page());
    }

    let outcome = OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert!(!outcome.valid);
    // Landing page plus exactly four login-page loads
    assert_eq!(transport.get_urls().len(), 5);
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_custom_attempt_cap() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    for _ in 0..3 {
        transport.push_get(incomplete_login_page());
    }

    let probe =
        OfficeProbe::new(transport.clone()).with_session_retry(SessionRetry::with_max_attempts(2));
    let outcome = probe.enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(transport.get_urls().len(), 3);
}

#[tokio::test]
async fn test_landing_page_network_failure() {
    let transport = ScriptedTransport::new();
    transport.push_get_failure();

    let outcome = OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert!(!outcome.valid);
    assert_eq!(transport.get_urls().len(), 1);
}

#[tokio::test]
async fn test_login_page_network_failure_aborts_retry() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(incomplete_login_page());
    transport.push_get_failure();
    transport.push_get(complete_login_page());

    let outcome = OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(transport.get_urls().len(), 3);
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_missing_app_id() {
    let transport = ScriptedTransport::new();
    transport.push_get(common::credential_type(200, "<html>maintenance</html>"));

    let outcome = OfficeProbe::new(transport.clone()).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert_eq!(transport.get_urls().len(), 1);
}

#[tokio::test]
async fn test_throttled_overrides_existence() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(200, r#"{"IfExistsResult":0,"ThrottleStatus":1}"#));

    let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Throttled);
    assert!(!outcome.valid);
}

#[tokio::test]
async fn test_different_identity_provider() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(200, r#"{"IfExistsResult":5,"ThrottleStatus":0}"#));

    let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::ExistsDifferentProvider);
    assert!(outcome.valid);
}

#[tokio::test]
async fn test_desktop_sso_disabled() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(
        200,
        r#"{"IfExistsResult":0,"ThrottleStatus":0,"EstsProperties":{"DesktopSsoEnabled":false}}"#,
    ));

    let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::DoesNotExist);
    assert!(!outcome.valid);
}

#[tokio::test]
async fn test_non_200_is_does_not_exist() {
    for status in [400, 429, 500] {
        let transport = ScriptedTransport::new();
        transport.push_get(landing_page());
        transport.push_get(complete_login_page());
        transport.push_post(credential_type(status, r#"{"IfExistsResult":0}"#));

        let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

        assert_eq!(outcome.verdict, Verdict::DoesNotExist, "HTTP {status}");
        assert!(!outcome.valid);
    }
}

#[tokio::test]
async fn test_malformed_json_is_unknown() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post(credential_type(200, "<html>not json</html>"));

    let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert!(!outcome.valid);
}

#[tokio::test]
async fn test_classification_network_failure_is_never_exists() {
    let transport = ScriptedTransport::new();
    transport.push_get(landing_page());
    transport.push_get(complete_login_page());
    transport.push_post_failure();

    let outcome = OfficeProbe::new(transport).enumerate(IDENTITY).await;

    assert_eq!(outcome.verdict, Verdict::Unknown);
    assert!(!outcome.valid);
}
