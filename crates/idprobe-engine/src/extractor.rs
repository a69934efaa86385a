//! GET-and-extract primitive used to scrape session tokens from pages.

use crate::transport::HttpTransport;
use regex::Regex;
use std::sync::Arc;

/// Fields scraped from one page load.
///
/// Holds the first capture group of every pattern that matched, in pattern
/// order, followed by the requested header value (empty when absent). A
/// pattern that does not match is simply missing, so callers must check
/// [`len`](Self::len) before indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    fields: Vec<String>,
    final_url: String,
    status: u16,
}

impl ExtractionResult {
    /// Build a result from already-extracted fields.
    #[must_use]
    pub fn new(fields: Vec<String>, final_url: impl Into<String>, status: u16) -> Self {
        Self {
            fields,
            final_url: final_url.into(),
            status,
        }
    }

    /// Extracted fields in request order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of extracted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// URL of the page after redirects.
    #[must_use]
    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    /// HTTP status of the page.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }
}

/// Fetches a page and pulls named fields out of it.
#[derive(Clone)]
pub struct TokenExtractor {
    transport: Arc<dyn HttpTransport>,
}

impl TokenExtractor {
    /// Create an extractor on top of a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// GET `url` and extract the first submatch of each pattern from the body,
    /// plus the value of `header` when one is requested.
    ///
    /// Returns `None` when no response was received. A response in which no
    /// pattern matched is `Some` with no fields.
    pub async fn extract(
        &self,
        url: &str,
        header: Option<&str>,
        patterns: &[&Regex],
    ) -> Option<ExtractionResult> {
        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error on response: {}", e);
                return None;
            }
        };

        let mut fields = extract_fields(&response.body, patterns);
        if let Some(name) = header {
            fields.push(response.header(name).unwrap_or_default().to_string());
        }

        Some(ExtractionResult::new(fields, response.url, response.status))
    }
}

/// First capture group of each matching pattern, in pattern order.
#[must_use]
pub fn extract_fields(body: &str, patterns: &[&Regex]) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|pattern| pattern.captures(body))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
