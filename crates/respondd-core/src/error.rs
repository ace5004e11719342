// ── Core error types ──
//
// `ProviderError` is what a poll can fail with; the responder treats any of
// them as "skip this cycle". `ResponderError` covers socket setup, which is
// fatal at startup. HTTP details from respondd-api are folded into
// provider-level variants by the `From` impl below.

use std::net::Ipv6Addr;

use thiserror::Error;

use crate::codec::CodecError;

/// Failure of one provider poll.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Poll timed out after {timeout_secs}s")]
    PollTimeout { timeout_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<respondd_api::Error> for ProviderError {
    fn from(err: respondd_api::Error) -> Self {
        match err {
            respondd_api::Error::Authentication { message } => {
                Self::AuthenticationFailed { message }
            }
            respondd_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                    }
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            respondd_api::Error::Status { status, url } => Self::Api {
                message: format!("HTTP {status} from {url}"),
                status: Some(status),
            },
            respondd_api::Error::InvalidUrl(e) => Self::Internal(format!("invalid URL: {e}")),
            respondd_api::Error::Tls(message) => Self::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS: {message}"),
            },
            respondd_api::Error::LegacyApi { message } => Self::Api {
                message,
                status: None,
            },
            respondd_api::Error::Deserialization { message, .. } => Self::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
            respondd_api::Error::NoGeocodeResult { query } => Self::Api {
                message: format!("no geocoding result for '{query}'"),
                status: None,
            },
        }
    }
}

/// Socket setup and send failures.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("Cannot bind UDP socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot join multicast group {group} on interface index {ifindex}: {source}")]
    JoinMulticast {
        group: Ipv6Addr,
        ifindex: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Network interface '{name}' not found")]
    InterfaceNotFound { name: String },

    #[error("Cannot bind socket to device '{name}': {source}")]
    BindDevice {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve push destination {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("Send to {dest} failed: {source}")]
    Send {
        dest: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
