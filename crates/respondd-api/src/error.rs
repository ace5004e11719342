use thiserror::Error;

/// Top-level error type for the `respondd-api` crate.
///
/// Covers every failure mode of the HTTP collaborators: controller
/// authentication, transport, the legacy envelope, node list and geocoder.
/// `respondd-core` maps these into provider failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status from an endpoint without an envelope.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    // ── Legacy API ──────────────────────────────────────────────────
    /// Error from the legacy API (parsed from the `{meta: {rc, msg}}` envelope).
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The geocoder had no result for the query.
    #[error("No geocoding result for '{query}'")]
    NoGeocodeResult { query: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_transient() {
        let limited = Error::Status {
            status: 429,
            url: "http://geo".into(),
        };
        let unavailable = Error::Status {
            status: 503,
            url: "http://geo".into(),
        };
        let missing = Error::Status {
            status: 404,
            url: "http://geo".into(),
        };
        assert!(limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!missing.is_transient());
    }

    #[test]
    fn authentication_is_not_transient() {
        let err = Error::Authentication {
            message: "nope".into(),
        };
        assert!(!err.is_transient());
    }
}
