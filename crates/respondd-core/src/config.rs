// ── Runtime configuration ──
//
// These types describe how the responder binds and how the UniFi provider
// reaches its controller. They never touch disk: respondd-config loads
// and validates the file, then hands these in.

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::time::Duration;

use regex::Regex;
use respondd_api::{ControllerPlatform, TlsMode};
use secrecy::SecretString;
use url::Url;

use crate::model::MacAddress;

/// How the responder obtains requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Join `group` and answer each request to its sender.
    Listen { group: Ipv6Addr, port: u16 },
    /// Send a full reply to a fixed destination every `interval`.
    Push {
        host: String,
        port: u16,
        interval: Duration,
    },
}

/// Configuration of the transport loop.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub mode: Mode,
    /// Device to bind the socket to (and to join the group on).
    pub interface: Option<String>,
    /// Upper bound for one provider poll.
    pub poll_timeout: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Listen {
                group: Ipv6Addr::new(0xff05, 0, 0, 0, 0, 0, 2, 0x1001),
                port: 1001,
            },
            interface: Some("bat0".into()),
            poll_timeout: Duration::from_secs(120),
        }
    }
}

/// Configuration of the UniFi provider adapter.
#[derive(Debug, Clone)]
pub struct UnifiProviderConfig {
    /// Controller base URL including port (e.g., `https://unifi.example.org:8443`).
    pub controller_url: Url,
    pub username: String,
    pub password: SecretString,
    pub platform: ControllerPlatform,
    pub tls: TlsMode,
    /// Timeout for each HTTP request.
    pub request_timeout: Duration,
    /// Wireless networks that belong to the mesh. Matched case-insensitively.
    pub ssid_regex: Regex,
    /// Site description -> offloader MAC.
    pub offloader_macs: HashMap<String, MacAddress>,
    /// meshviewer `nodes.json`; `None` disables gateway lookup.
    pub nodelist_url: Option<Url>,
    /// Domain code for devices whose site has no node-list entry.
    pub fallback_domain: String,
    /// Nominatim root; `None` disables geocoding.
    pub geocoder_url: Option<Url>,
    /// Max sites polled at once.
    pub site_concurrency: usize,
}
