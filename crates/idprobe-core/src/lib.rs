//! Idprobe Core - Foundation crate for the identity probe engine.
//!
//! This crate provides the shared verdict model, error handling, configuration
//! management and the small collaborators (outcome reporting, random strings,
//! user agents) that the engine and the shell binary depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - `Verdict`, `ProbeRequest` and `ProbeMode`
//! - [`report`] - Outcome sink with probe severities, backed by `tracing`
//! - [`random`] - Throwaway secrets and canary values
//! - [`user_agent`] - Desktop browser user-agent supplier
//!
//! # Example
//!
//! ```rust
//! use idprobe_core::{AppConfig, ProbeRequest, Verdict};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.probe.session_attempts, 4);
//!
//! let request = ProbeRequest::new("alice@contoso.com", None)?;
//! assert_eq!(request.domain(), "contoso.com");
//! assert!(Verdict::ExistsMfaRequired.is_existence());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod random;
pub mod report;
pub mod types;
#[allow(missing_docs)]
pub mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, NetworkConfig, ProbeConfig};
pub use error::{ConfigError, ConfigResult, IdprobeError};
pub use report::Severity;
pub use types::{ProbeMode, ProbeRequest, Verdict};
