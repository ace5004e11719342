// Meshviewer node list client
//
// The community map publishes its current node list as a single JSON
// document (`meshviewer.json`). The responder reads it to find the
// offloader node of each site and inherit its gateway and domain.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Node list document as served by meshviewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nodelist {
    #[serde(default)]
    pub nodes: Vec<NodelistNode>,
}

/// The subset of a meshviewer node the responder reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodelistNode {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub gateway6: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Nodelist {
    /// Find a node by MAC address (case-insensitive).
    pub fn find_by_mac(&self, mac: &str) -> Option<&NodelistNode> {
        self.nodes
            .iter()
            .find(|n| n.mac.as_deref().is_some_and(|m| m.eq_ignore_ascii_case(mac)))
    }
}

/// Fetches the node list from a fixed URL.
#[derive(Clone)]
pub struct NodelistClient {
    http: reqwest::Client,
    url: Url,
}

impl NodelistClient {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download and parse the node list.
    pub async fn fetch(&self) -> Result<Nodelist, Error> {
        debug!("GET {}", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let nodelist: Nodelist =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        debug!(nodes = nodelist.nodes.len(), "node list loaded");
        Ok(nodelist)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn find_by_mac_ignores_case() {
        let list: Nodelist = serde_json::from_value(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "nodes": [
                { "mac": "aa:bb:cc:00:11:22", "gateway": "10.0.0.1", "domain": "ffmuc_muc_cty" },
                { "hostname": "no-mac" }
            ]
        }))
        .unwrap();

        let node = list.find_by_mac("AA:BB:CC:00:11:22").unwrap();
        assert_eq!(node.gateway.as_deref(), Some("10.0.0.1"));
        assert!(list.find_by_mac("de:ad:be:ef:00:00").is_none());
    }
}
