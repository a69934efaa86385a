//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use idprobe_engine::{HttpResponse, HttpTransport, PostRequest, ProbeError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses and records every request it receives.
///
/// An empty queue behaves like an unreachable host.
#[derive(Default)]
pub struct ScriptedTransport {
    gets: Mutex<VecDeque<Option<HttpResponse>>>,
    posts: Mutex<VecDeque<Option<HttpResponse>>>,
    get_log: Mutex<Vec<String>>,
    post_log: Mutex<Vec<PostRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a GET response.
    pub fn push_get(&self, response: HttpResponse) {
        self.gets.lock().unwrap().push_back(Some(response));
    }

    /// Queue a GET that fails without a response.
    pub fn push_get_failure(&self) {
        self.gets.lock().unwrap().push_back(None);
    }

    /// Queue a POST response.
    pub fn push_post(&self, response: HttpResponse) {
        self.posts.lock().unwrap().push_back(Some(response));
    }

    /// Queue a POST that fails without a response.
    pub fn push_post_failure(&self) {
        self.posts.lock().unwrap().push_back(None);
    }

    pub fn get_urls(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<PostRequest> {
        self.post_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.get_log.lock().unwrap().push(url.to_string());
        self.gets
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| ProbeError::network(url, "connection refused"))
    }

    async fn post(&self, request: PostRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.post_log.lock().unwrap().push(request);
        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| ProbeError::network(url, "connection refused"))
    }
}

/// Office landing page carrying an application id.
pub fn landing_page() -> HttpResponse {
    HttpResponse::new(
        200,
        "https://www.office.com/",
        "<script>var cfg = { env: 'prod', appId: '4765445b-32c6-49b0-83e6-1d93765276ca' };</script>",
    )
}

/// Login page with every session token present.
pub fn complete_login_page() -> HttpResponse {
    HttpResponse::new(
        200,
        "https://login.microsoftonline.com/common/oauth2/authorize?client_id=4765445b",
        r#"$Config={"hpgid":1104,"hpgact":1800,"sCtx":"rQQIARAAhZK9"};"#,
    )
    .with_header("x-ms-request-id", "c0ffee00-0000-4000-8000-000000000001")
}

/// Login page that rendered without the page-action id and context.
pub fn incomplete_login_page() -> HttpResponse {
    HttpResponse::new(
        200,
        "https://login.microsoftonline.com/common/oauth2/authorize?client_id=4765445b",
        r#"$Config={"hpgid":1104,"pending":true};"#,
    )
    .with_header("x-ms-request-id", "c0ffee00-0000-4000-8000-000000000002")
}

/// Credential-type answer.
pub fn credential_type(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        "https://login.microsoftonline.com/common/GetCredentialType?mkt=en-US",
        body,
    )
}

/// Token endpoint answer.
pub fn token_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        "https://login.microsoft.com/common/oauth2/token",
        body,
    )
}

/// Realm-info answer with the given namespace type.
pub fn realm_info(namespace: &str) -> HttpResponse {
    HttpResponse::new(
        200,
        "https://login.microsoftonline.com/getuserrealm.srf",
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><RealmInfo Success=\"true\">\
             <State>4</State><NameSpaceType>{namespace}</NameSpaceType>\
             <DomainName>contoso.com</DomainName></RealmInfo>"
        ),
    )
}
