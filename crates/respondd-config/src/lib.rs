//! Configuration for unifi-respondd.
//!
//! A flat YAML file (the format existing deployments use), overridden by
//! `UNIFI_RESPONDD_*` environment variables, validated and translated into
//! the runtime types of `respondd_core`.

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use regex::RegexBuilder;
use respondd_api::{ControllerPlatform, TlsMode};
use respondd_core::{MacAddress, Mode, ResponderConfig, UnifiProviderConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Prefix of environment overrides (`UNIFI_RESPONDD_USERNAME`, ...).
pub const ENV_PREFIX: &str = "UNIFI_RESPONDD_";

/// Environment variable naming the config file.
pub const CONFIG_FILE_ENV: &str = "UNIFI_RESPONDD_CONFIG_FILE";

/// Used when neither the flag nor the environment names a file.
pub const DEFAULT_CONFIG_FILE: &str = "unifi_respondd.yaml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config file ─────────────────────────────────────────────────────

/// The configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // ── Controller ──
    /// Controller host or URL (`unifi.example.org` or `https://...`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_url: Option<String>,
    /// Used when `controller_url` carries no port.
    pub controller_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Controller generation; `UDMP-unifiOS` selects UniFi OS paths.
    pub version: String,
    pub ssl_verify: bool,

    // ── Data sources ──
    /// Matches the mesh SSIDs (case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid_regex: Option<String>,
    /// Site description -> offloader MAC.
    pub offloader_mac: HashMap<String, String>,
    /// meshviewer node list URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodelist: Option<String>,
    pub fallback_domain: String,
    /// Nominatim root. Empty disables geocoding.
    pub geocoder_url: String,

    // ── Socket ──
    pub multicast_address: String,
    pub multicast_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicast_address: Option<String>,
    pub unicast_port: u16,
    /// Interface to bind to. Empty binds to none.
    pub interface: String,
    pub multicast_enabled: bool,
    pub verbose: bool,

    // ── Tuning ──
    pub request_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub push_interval_secs: u64,
    pub site_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller_url: None,
            controller_port: 8443,
            username: None,
            password: None,
            version: "v5".into(),
            ssl_verify: true,
            ssid_regex: None,
            offloader_mac: HashMap::new(),
            nodelist: None,
            fallback_domain: "unifi_respondd_fallback".into(),
            geocoder_url: "https://nominatim.openstreetmap.org".into(),
            multicast_address: "ff05::2:1001".into(),
            multicast_port: 1001,
            unicast_address: None,
            unicast_port: 45123,
            interface: "bat0".into(),
            multicast_enabled: true,
            verbose: false,
            request_timeout_secs: 30,
            poll_timeout_secs: 120,
            push_interval_secs: 60,
            site_concurrency: 5,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// `explicit`, else `$UNIFI_RESPONDD_CONFIG_FILE`, else `./unifi_respondd.yaml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            std::env::var_os(CONFIG_FILE_ENV)
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` and the environment. The file must exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Translation to runtime config ───────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| invalid(field, format!("'{raw}': {e}")))
}

fn non_zero_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

impl Config {
    /// Controller base URL. A bare host gets `https://` and
    /// `controller_port`; an explicit port in the URL wins.
    pub fn controller_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .controller_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("controller_url", "required"))?;

        let mut url = if raw.contains("://") {
            parse_url("controller_url", raw)?
        } else {
            parse_url("controller_url", &format!("https://{raw}"))?
        };
        if url.port().is_none() {
            url.set_port(Some(self.controller_port))
                .map_err(|()| invalid("controller_url", format!("'{raw}' cannot carry a port")))?;
        }
        Ok(url)
    }

    pub fn platform(&self) -> ControllerPlatform {
        ControllerPlatform::from_version(&self.version)
    }

    /// Build the UniFi provider configuration.
    pub fn to_provider_config(&self) -> Result<UnifiProviderConfig, ConfigError> {
        let controller_url = self.controller_url()?;

        let username = self
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| invalid("username", "required"))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| invalid("password", "required"))?;

        let pattern = self
            .ssid_regex
            .as_deref()
            .ok_or_else(|| invalid("ssid_regex", "required"))?;
        let ssid_regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| invalid("ssid_regex", e.to_string()))?;

        let offloader_macs = self
            .offloader_mac
            .iter()
            .map(|(site, mac)| (site.clone(), MacAddress::new(mac)))
            .collect();

        let nodelist_url = self
            .nodelist
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|raw| parse_url("nodelist", raw))
            .transpose()?;

        let geocoder_url = match self.geocoder_url.trim() {
            "" => None,
            raw => Some(parse_url("geocoder_url", raw)?),
        };

        if self.site_concurrency == 0 {
            return Err(invalid("site_concurrency", "must be greater than zero"));
        }

        Ok(UnifiProviderConfig {
            controller_url,
            username,
            password: SecretString::from(password),
            platform: self.platform(),
            tls: TlsMode::from_verify(self.ssl_verify),
            request_timeout: non_zero_secs("request_timeout_secs", self.request_timeout_secs)?,
            ssid_regex,
            offloader_macs,
            nodelist_url,
            fallback_domain: self.fallback_domain.clone(),
            geocoder_url,
            site_concurrency: self.site_concurrency,
        })
    }

    /// Build the transport loop configuration.
    pub fn to_responder_config(&self) -> Result<ResponderConfig, ConfigError> {
        let mode = if self.multicast_enabled {
            let group: Ipv6Addr = self.multicast_address.parse().map_err(|_| {
                invalid(
                    "multicast_address",
                    format!("'{}' is not an IPv6 address", self.multicast_address),
                )
            })?;
            if !group.is_multicast() {
                return Err(invalid(
                    "multicast_address",
                    format!("'{group}' is not a multicast address"),
                ));
            }
            Mode::Listen {
                group,
                port: self.multicast_port,
            }
        } else {
            let host = self
                .unicast_address
                .clone()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| {
                    invalid("unicast_address", "required when multicast_enabled is false")
                })?;
            Mode::Push {
                host,
                port: self.unicast_port,
                interval: non_zero_secs("push_interval_secs", self.push_interval_secs)?,
            }
        };

        let interface = Some(self.interface.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_owned);

        Ok(ResponderConfig {
            mode,
            interface,
            poll_timeout: non_zero_secs("poll_timeout_secs", self.poll_timeout_secs)?,
        })
    }

    /// Run every translation and discard the results.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_provider_config()?;
        self.to_responder_config()?;
        Ok(())
    }
}
