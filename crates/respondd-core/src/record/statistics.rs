// ── statistics record ──

use serde::{Deserialize, Serialize};

use crate::model::DeviceSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub clients: Clients,
    pub uptime: u64,
    pub node_id: String,
    pub loadavg: f64,
    pub memory: Memory,
    pub traffic: Traffic,
    pub gateway: Option<String>,
    pub gateway6: Option<String>,
    pub gateway_nexthop: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clients {
    pub total: u32,
    pub wifi: u32,
    pub wifi24: u32,
    pub wifi5: u32,
}

/// Memory in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traffic {
    pub tx: ByteCounter,
    pub rx: ByteCounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteCounter {
    pub bytes: u64,
}

const fn kib(bytes: u64) -> u64 {
    bytes / 1024
}

impl Memory {
    /// Convert byte figures; `free` is `total - used`, floored to KiB.
    pub const fn from_bytes(total: u64, used: u64, buffers: u64) -> Self {
        Self {
            total: kib(total),
            free: kib(total.saturating_sub(used)),
            buffers: kib(buffers),
        }
    }
}

impl Statistics {
    pub fn from_snapshot(ap: &DeviceSnapshot) -> Self {
        Self {
            // Every client of an access point is a wifi client.
            clients: Clients {
                total: ap.client_count,
                wifi: ap.client_count,
                wifi24: ap.client_count24,
                wifi5: ap.client_count5,
            },
            uptime: ap.uptime,
            node_id: ap.node_id(),
            loadavg: ap.load_avg,
            memory: Memory::from_bytes(ap.mem_total, ap.mem_used, ap.mem_buffer),
            traffic: Traffic {
                tx: ByteCounter { bytes: ap.tx_bytes },
                rx: ByteCounter { bytes: ap.rx_bytes },
            },
            gateway: ap.gateway.clone(),
            gateway6: ap.gateway6.clone(),
            gateway_nexthop: ap.gateway_nexthop.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MacAddress;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn reference_ap() -> DeviceSnapshot {
        DeviceSnapshot {
            mac: MacAddress::new("AA:BB:CC:DD:EE:FF"),
            client_count: 5,
            client_count24: 2,
            client_count5: 3,
            uptime: 3600,
            load_avg: 0.2,
            mem_total: 204_800,
            mem_used: 102_400,
            mem_buffer: 10_240,
            tx_bytes: 1000,
            rx_bytes: 2000,
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn renders_reference_device() {
        let value = serde_json::to_value(Statistics::from_snapshot(&reference_ap())).unwrap();

        assert_eq!(
            value,
            json!({
                "clients": { "total": 5, "wifi": 5, "wifi24": 2, "wifi5": 3 },
                "uptime": 3600,
                "node_id": "AABBCCDDEEFF",
                "loadavg": 0.2,
                "memory": { "total": 200, "free": 100, "buffers": 10 },
                "traffic": { "tx": { "bytes": 1000 }, "rx": { "bytes": 2000 } },
                "gateway": null,
                "gateway6": null,
                "gateway_nexthop": null
            })
        );
    }

    #[test]
    fn free_memory_is_total_minus_used_in_kib() {
        for (total, used) in [
            (0, 0),
            (1023, 0),
            (1_048_576, 524_287),
            (131_072_000, 98_765_432),
            (u64::MAX, 1),
        ] {
            let mem = Memory::from_bytes(total, used, 0);
            let diff = total - used;
            assert_eq!(mem.total, total / 1024);
            assert!(mem.free * 1024 <= diff);
            assert!(diff - mem.free * 1024 < 1024);
        }
    }

    #[test]
    fn used_above_total_saturates_to_zero_free() {
        assert_eq!(Memory::from_bytes(1024, 4096, 0).free, 0);
    }

    #[test]
    fn gateway_fields_carry_through() {
        let ap = DeviceSnapshot {
            gateway: Some("10.80.0.1".into()),
            gateway6: Some("2001:db8::1".into()),
            gateway_nexthop: Some("deadbeef0001".into()),
            ..reference_ap()
        };
        let stats = Statistics::from_snapshot(&ap);
        assert_eq!(stats.gateway.as_deref(), Some("10.80.0.1"));
        assert_eq!(stats.gateway_nexthop.as_deref(), Some("deadbeef0001"));
    }
}
