// reqwest client construction shared by the controller session, the node
// list and the geocoder.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

const USER_AGENT: &str = concat!("unifi-respondd/", env!("CARGO_PKG_VERSION"));

/// Certificate checking for HTTPS endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// System trust store.
    System,
    /// Accept any certificate. Controllers commonly ship self-signed ones.
    DangerAcceptInvalid,
}

impl TlsMode {
    /// `ssl_verify: false` means [`TlsMode::DangerAcceptInvalid`].
    pub fn from_verify(verify: bool) -> Self {
        if verify {
            Self::System
        } else {
            Self::DangerAcceptInvalid
        }
    }
}

/// Settings a `reqwest::Client` is built from.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self {
            tls,
            timeout,
            cookie_jar: None,
        }
    }

    /// Attach an empty cookie jar, i.e. start a new session.
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(self.tls == TlsMode::DangerAcceptInvalid);

        if let Some(jar) = &self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}
