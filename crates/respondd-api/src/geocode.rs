// Nominatim geocoding client
//
// Resolves a free-text postal address to coordinates via the
// `/search?format=json` endpoint. Nominatim returns coordinates as strings.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Minimal Nominatim search client.
#[derive(Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NominatimClient {
    /// `base_url` is the service root, e.g. `https://nominatim.openstreetmap.org`.
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Look up the best match for `query`, returning `(latitude, longitude)`.
    pub async fn search(&self, query: &str) -> Result<(f64, f64), Error> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let hit = hits.into_iter().next().ok_or_else(|| Error::NoGeocodeResult {
            query: query.to_owned(),
        })?;

        match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok((lat, lon)),
            _ => Err(Error::Deserialization {
                message: format!("non-numeric coordinates: {}, {}", hit.lat, hit.lon),
                body,
            }),
        }
    }
}
