// ── nodeinfo record ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::DeviceSnapshot;

/// Name of the mesh interface every access point is reported on.
pub const MESH_INTERFACE: &str = "bat0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub software: Software,
    pub hostname: String,
    pub node_id: String,
    pub location: Location,
    pub hardware: Hardware,
    pub owner: Owner,
    pub network: Network,
    pub system: System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Software {
    pub firmware: Firmware,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firmware {
    pub base: String,
    pub release: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    pub model: String,
    pub nproc: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub mac: String,
    pub mesh: IndexMap<String, MeshInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInterface {
    pub interfaces: Interfaces,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interfaces {
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub domain_code: String,
}

impl NodeInfo {
    pub fn from_snapshot(ap: &DeviceSnapshot) -> Self {
        let coordinates = ap.coordinates.unwrap_or_default();
        let mac = ap.mac.as_str().to_owned();

        let mut mesh = IndexMap::new();
        mesh.insert(
            MESH_INTERFACE.to_owned(),
            MeshInterface {
                interfaces: Interfaces {
                    other: vec![mac.clone()],
                },
            },
        );

        Self {
            software: Software {
                firmware: Firmware {
                    base: ap.firmware_base.clone(),
                    release: ap.firmware.clone(),
                },
            },
            hostname: ap.name.clone(),
            node_id: ap.node_id(),
            location: Location {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            },
            hardware: Hardware {
                model: ap.model.clone(),
                nproc: 1,
            },
            owner: Owner {
                contact: ap.contact.clone(),
            },
            network: Network { mac, mesh },
            system: System {
                domain_code: ap.domain_code.clone(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Coordinates, MacAddress};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn renders_full_schema() {
        let ap = DeviceSnapshot {
            name: "AP-Lobby".into(),
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            model: "U7PG2".into(),
            firmware_base: "UniFi".into(),
            firmware: "6.5.28".into(),
            coordinates: Some(Coordinates::new(48.1351, 11.582)),
            contact: "noc@example.org".into(),
            domain_code: "ffmuc_muc_cty".into(),
            ..DeviceSnapshot::default()
        };

        let value = serde_json::to_value(NodeInfo::from_snapshot(&ap)).unwrap();

        assert_eq!(
            value,
            json!({
                "software": { "firmware": { "base": "UniFi", "release": "6.5.28" } },
                "hostname": "AP-Lobby",
                "node_id": "aabbccddeeff",
                "location": { "latitude": 48.1351, "longitude": 11.582 },
                "hardware": { "model": "U7PG2", "nproc": 1 },
                "owner": { "contact": "noc@example.org" },
                "network": {
                    "mac": "aa:bb:cc:dd:ee:ff",
                    "mesh": { "bat0": { "interfaces": { "other": ["aa:bb:cc:dd:ee:ff"] } } }
                },
                "system": { "domain_code": "ffmuc_muc_cty" }
            })
        );
    }

    #[test]
    fn unresolved_location_defaults_to_origin() {
        let ap = DeviceSnapshot {
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            location: Some("somewhere unknown".into()),
            ..DeviceSnapshot::default()
        };
        let info = NodeInfo::from_snapshot(&ap);
        assert_eq!(info.location, Location { latitude: 0.0, longitude: 0.0 });
    }
}
