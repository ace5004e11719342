// ── Device snapshot ──
//
// What a provider knows about one access point at poll time. A poll
// always yields a complete new collection; snapshots are never patched.

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

/// Resolved geographic position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One access point as seen during a single poll cycle.
///
/// Memory figures are in bytes as reported by the device; the statistics
/// builder converts them. `neighbour_macs` may hold `None` entries when a
/// provider could not resolve an expected neighbour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    // ── Identity ─────────────────────────────────────────────────────
    pub name: String,
    pub mac: MacAddress,
    pub model: String,
    /// Vendor label reported as `software.firmware.base`.
    pub firmware_base: String,
    pub firmware: String,
    /// Free-text location as configured on the device.
    pub location: Option<String>,
    /// Position resolved from `location`, if any.
    pub coordinates: Option<Coordinates>,
    pub contact: String,

    // ── Network role ─────────────────────────────────────────────────
    pub gateway: Option<String>,
    pub gateway6: Option<String>,
    pub gateway_nexthop: Option<String>,
    pub neighbour_macs: Vec<Option<MacAddress>>,
    pub domain_code: String,

    // ── Live metrics ─────────────────────────────────────────────────
    pub client_count: u32,
    pub client_count24: u32,
    pub client_count5: u32,
    pub uptime: u64,
    pub load_avg: f64,
    pub mem_total: u64,
    pub mem_used: u64,
    pub mem_buffer: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

impl DeviceSnapshot {
    /// Merge key shared by every record rendered from this snapshot.
    pub fn node_id(&self) -> String {
        self.mac.node_id()
    }

    /// Neighbour addresses with unresolved (`None`) entries dropped.
    pub fn known_neighbours(&self) -> impl Iterator<Item = &MacAddress> {
        self.neighbour_macs.iter().flatten()
    }
}
