// Controller JSON as the responder reads it. Firmware versions disagree on
// which fields exist, so nearly everything is optional and unknown fields are
// kept in `extra`.

use serde::{Deserialize, Deserializer, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// `{ "meta": { "rc": "ok", "msg": ... }, "data": [...] }`
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    // A plain `default` would require `T: Default`.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `rc` is `"ok"` on success; `msg` carries the error key otherwise.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Full device object from `stat/device`.
///
/// Only the fields feeding a `DeviceSnapshot` are typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub mac: String,
    /// `uap`, `usw`, `ugw`, ...; empty while some devices are being adopted.
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub sys_stats: Option<SysStats>,
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub snmp_location: Option<String>,
    #[serde(default)]
    pub snmp_contact: Option<String>,
    /// Virtual access points (one per broadcast SSID and radio).
    #[serde(default)]
    pub vap_table: Option<Vec<VapEntry>>,
    #[serde(default)]
    pub uplink: Option<Uplink>,
    #[serde(default)]
    pub lldp_table: Option<Vec<LldpEntry>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacyDevice {
    /// `true` for adopted, connected access points with a known MAC.
    pub fn is_online_access_point(&self) -> bool {
        self.device_type == "uap" && self.state != 0 && !self.mac.is_empty()
    }
}

/// System statistics nested inside `LegacyDevice`.
///
/// Load averages arrive as strings on most firmware (`"0.12"`) and as numbers
/// on some; both are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SysStats {
    #[serde(default, rename = "loadavg_1", deserialize_with = "lenient_f64")]
    pub load_1: Option<f64>,
    #[serde(default)]
    pub mem_total: Option<u64>,
    #[serde(default)]
    pub mem_used: Option<u64>,
    #[serde(default)]
    pub mem_buffer: Option<u64>,
}

/// One entry of a device's `vap_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapEntry {
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub channel: Option<u32>,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub tx_bytes: Option<u64>,
    #[serde(default)]
    pub rx_bytes: Option<u64>,
}

/// Uplink description of a device. Wireless mesh uplinks carry `ap_mac`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uplink {
    #[serde(default, rename = "type")]
    pub uplink_type: Option<String>,
    #[serde(default)]
    pub ap_mac: Option<String>,
}

/// One LLDP neighbour as seen by the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LldpEntry {
    #[serde(default)]
    pub chassis_id: Option<String>,
    #[serde(default)]
    pub is_wired: Option<bool>,
}

// ── Client (Station) ─────────────────────────────────────────────────

/// Connected client from `stat/sta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyClientEntry {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub channel: Option<u32>,
    #[serde(default)]
    pub ap_mac: Option<String>,
    #[serde(default)]
    pub is_wired: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site object from `/api/self/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySite {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacySite {
    /// Human-readable description, falling back to the internal name.
    pub fn description(&self) -> &str {
        self.desc.as_deref().unwrap_or(&self.name)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
