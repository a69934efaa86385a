//! Idprobe command-line shell.
//!
//! Parses arguments, loads configuration and drives the probe engine over a
//! list of identities, one at a time. All probing logic lives in the
//! `crates/` directory.

use anyhow::{bail, Context};
use clap::Parser;
use idprobe_core::{AppConfig, ProbeMode, ProbeRequest};
use idprobe_engine::{ProbeEngine, ProbeError};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Command-line arguments.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(
    name = "idprobe",
    version,
    about = "Checks whether identities exist at the cloud identity provider."
)]
pub struct CliArgs {
    /// Probe mode: office, oauth2 or brute (default from config)
    #[arg(short, long, value_parser = ProbeMode::from_str)]
    pub mode: Option<ProbeMode>,

    /// Password tried by the brute mode
    #[arg(short, long, env = "IDPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Configuration file to load instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip the tenant check before each probe
    #[arg(long)]
    pub no_tenant_check: bool,

    /// Print outcomes as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Identities (email addresses) to probe
    pub identities: Vec<String>,
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,idprobe=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(args: &CliArgs) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };

    if let Some(mode) = args.mode {
        config.probe.mode = mode;
    }
    if args.no_tenant_check {
        config.probe.validate_tenant = false;
    }
    config.validate()?;
    Ok(config)
}

/// Run the probes described by `args`.
///
/// Identities are probed sequentially. A locked account or an invalid
/// identity is reported and skipped; the run continues with the next one.
///
/// # Errors
/// Returns error if configuration cannot be loaded, no identity is given or
/// the brute mode is requested without a password.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let mode = config.probe.mode;
    if mode.requires_secret() && args.password.is_none() {
        bail!("mode '{mode}' requires --password");
    }

    let identities = &args.identities;
    if identities.is_empty() {
        bail!("no identities given (see --help)");
    }

    let engine = ProbeEngine::from_config(&config)?;
    info!(
        "Probing {} identities with mode '{}'",
        identities.len(),
        engine.mode()
    );

    let mut hits = 0usize;
    for identity in identities {
        let request = match ProbeRequest::new(identity.as_str(), args.password.clone()) {
            Ok(request) => request,
            Err(e) => {
                warn!("Skipping '{}': {}", identity, e);
                continue;
            }
        };

        match engine.enumerate(&request).await {
            Ok(outcome) => {
                if outcome.valid {
                    hits += 1;
                }
                if args.json {
                    println!("{}", serde_json::to_string(&outcome)?);
                } else {
                    println!("{outcome}");
                }
            }
            Err(ProbeError::AccountLocked { identity }) => {
                println!("[-] {identity} is locked, skipping");
            }
            Err(e) => warn!("Probe for '{}' failed: {}", identity, e),
        }
    }

    info!("Done: {} of {} identities matched", hits, identities.len());
    Ok(())
}
