// Controller session client
//
// One `LegacyClient` is one cookie session against a controller, scoped to a
// site. `for_site` re-scopes without logging in again. Every read goes
// through `fetch`, which builds the platform-specific URL and strips the
// `{ meta, data }` envelope.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Where an endpoint lives below the platform prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// `{prefix}/api/{path}`
    Controller,
    /// `{prefix}/api/s/{site}/{path}`
    Site,
}

/// Read-only client for a UniFi controller's legacy API.
#[derive(Clone)]
pub struct LegacyClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    site: String,
    pub(crate) platform: ControllerPlatform,
}

impl LegacyClient {
    /// Build a client from `transport`, adding a cookie jar when it has none
    /// (login only works with one).
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = match transport.cookie_jar {
            Some(_) => transport.clone(),
            None => transport.clone().with_cookie_jar(),
        };
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            site,
            platform,
        ))
    }

    /// Wrap an existing `reqwest::Client`; session cookies are whatever its
    /// jar holds.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            base_url,
            site,
            platform,
        }
    }

    /// Same session, other site.
    pub fn for_site(&self, site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..self.clone()
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub(crate) fn url(&self, scope: Scope, path: &str) -> Result<Url, Error> {
        let prefix = self.platform.legacy_prefix();
        let full = match scope {
            Scope::Controller => format!("{prefix}/api/{path}"),
            Scope::Site => format!("{prefix}/api/s/{}/{path}", self.site),
        };
        Ok(self.base_url.join(&full)?)
    }

    /// GET an enveloped list.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        scope: Scope,
        path: &str,
    ) -> Result<Vec<T>, Error> {
        let url = self.url(scope, path)?;
        debug!(%url, "GET");

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }
        let body = resp.text().await?;
        unwrap_envelope(status, &url, body)
    }
}

/// The controller reports API errors both as non-2xx responses and as
/// `rc: "error"` with a 200, so the envelope is read before the status.
fn unwrap_envelope<T: DeserializeOwned>(
    status: StatusCode,
    url: &Url,
    body: String,
) -> Result<Vec<T>, Error> {
    let envelope: LegacyResponse<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Err(e) => {
            return Err(Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }
    };

    if envelope.meta.rc == "ok" {
        Ok(envelope.data)
    } else {
        Err(Error::LegacyApi {
            message: envelope
                .meta
                .msg
                .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        })
    }
}
