//! CLI error types with miette diagnostics.
//!
//! Folds config, provider and socket errors into user-facing errors with
//! help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use respondd_config::ConfigError;
use respondd_core::{CodecError, ProviderError, ResponderError};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NETWORK: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(respondd::no_config),
        help(
            "Pass --config <PATH> or set UNIFI_RESPONDD_CONFIG_FILE.\n\
             Without either, ./unifi_respondd.yaml is read."
        )
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(respondd::validation))]
    Validation { field: String, reason: String },

    #[error("Cannot read configuration")]
    #[diagnostic(
        code(respondd::config),
        help("Check the YAML syntax and the UNIFI_RESPONDD_* environment variables.")
    )]
    Config(#[source] Box<figment::Error>),

    // ── Network ──────────────────────────────────────────────────────

    #[error("Socket setup failed")]
    #[diagnostic(
        code(respondd::socket),
        help(
            "Joining a multicast group on a mesh interface usually needs\n\
             CAP_NET_RAW/CAP_NET_ADMIN and an existing interface (see `interface`)."
        )
    )]
    Socket(#[source] ResponderError),

    #[error("Polling the controller failed")]
    #[diagnostic(
        code(respondd::poll),
        help("Check controller_url and the credentials.")
    )]
    Poll(#[source] ProviderError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::Socket(_) | Self::Poll(_) => exit_code::NETWORK,
            Self::Io(_) | Self::Codec(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(e) => Self::Config(e),
        }
    }
}

impl From<ResponderError> for CliError {
    fn from(err: ResponderError) -> Self {
        Self::Socket(err)
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        Self::Poll(err)
    }
}
