//! Idprobe Engine - protocol-level identity existence probes.
//!
//! This crate answers, for one email address at a time, whether the identity
//! exists at the cloud identity provider and in what state (locked, MFA
//! required, disabled, ...), without valid credentials.
//!
//! # Probes
//!
//! - [`office::OfficeProbe`] scrapes session tokens from the Office login
//!   flow and asks the credential-type endpoint about the identity
//! - [`oauth2::OAuth2Probe`] sends a password-grant token request and reads
//!   the provider's error code, either with a throwaway password (passive)
//!   or a supplied one (active)
//! - [`tenant::TenantValidator`] checks whether a domain is a provider tenant
//!
//! Each call is self-contained: no state is shared between calls, and
//! network failures are logged and folded into the returned verdict.
//! Pacing and concurrency across identities are up to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use idprobe_core::{AppConfig, ProbeMode, ProbeRequest};
//! use idprobe_engine::ProbeEngine;
//!
//! let engine = ProbeEngine::from_config(&AppConfig::load_with_env()?)?;
//! let request = ProbeRequest::new("alice@contoso.com", None)?;
//! let outcome = engine.probe(ProbeMode::OAuth2, &request).await?;
//! println!("{outcome}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod endpoints;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod oauth2;
pub mod office;
#[allow(missing_docs)]
pub mod outcome;
pub mod tenant;
pub mod transport;

// Re-export commonly used types
pub use engine::ProbeEngine;
pub use error::{ProbeError, Result};
pub use extractor::{ExtractionResult, TokenExtractor};
pub use oauth2::{OAuth2Probe, TokenClassification, TokenResponse};
pub use office::{OfficeProbe, SessionFailure, SessionRetry};
pub use outcome::ProbeOutcome;
pub use tenant::TenantValidator;
pub use transport::{HttpResponse, HttpTransport, PostBody, PostRequest, ReqwestTransport};
