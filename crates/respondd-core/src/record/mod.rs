// ── Record builders ──
//
// Pure mappings from a `DeviceSnapshot` into the three respondd record
// schemas. No I/O and no failure paths: missing optional data renders as
// zero, an empty string, or `null`, as each schema documents.

pub mod neighbours;
pub mod nodeinfo;
pub mod statistics;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::model::DeviceSnapshot;

pub use neighbours::Neighbours;
pub use nodeinfo::NodeInfo;
pub use statistics::Statistics;

/// Information category a requester can ask for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// Identity, hardware and location.
    NodeInfo,
    /// Live metrics.
    Statistics,
    /// Mesh topology.
    Neighbours,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::NodeInfo, Self::Statistics, Self::Neighbours];

    /// Render one snapshot. `None` means the device does not take part in
    /// this category (a device without neighbours has no neighbour record).
    pub fn build(self, snapshot: &DeviceSnapshot) -> Option<Record> {
        match self {
            Self::NodeInfo => Some(Record::NodeInfo(NodeInfo::from_snapshot(snapshot))),
            Self::Statistics => Some(Record::Statistics(Statistics::from_snapshot(snapshot))),
            Self::Neighbours => Neighbours::from_snapshot(snapshot).map(Record::Neighbours),
        }
    }

    /// Render every snapshot of a poll cycle.
    pub fn build_all(self, snapshots: &[DeviceSnapshot]) -> Vec<Record> {
        snapshots.iter().filter_map(|s| self.build(s)).collect()
    }
}

/// A rendered record of any category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    NodeInfo(NodeInfo),
    Statistics(Statistics),
    Neighbours(Neighbours),
}

impl Record {
    /// The merge key (MAC address without separators).
    pub fn node_id(&self) -> &str {
        match self {
            Self::NodeInfo(r) => &r.node_id,
            Self::Statistics(r) => &r.node_id,
            Self::Neighbours(r) => &r.node_id,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::NodeInfo(_) => Category::NodeInfo,
            Self::Statistics(_) => Category::Statistics,
            Self::Neighbours(_) => Category::Neighbours,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MacAddress;

    fn snapshot(neighbours: Vec<Option<MacAddress>>) -> DeviceSnapshot {
        DeviceSnapshot {
            name: "ap".into(),
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            neighbour_macs: neighbours,
            ..DeviceSnapshot::default()
        }
    }

    #[test]
    fn category_names_round_trip_through_strum() {
        for category in Category::ALL {
            let parsed: Category = category.as_ref().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert_eq!(Category::NodeInfo.to_string(), "nodeinfo");
        assert!("firmware".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_lowercase_key() {
        assert_eq!(
            serde_json::to_string(&Category::Neighbours).unwrap(),
            "\"neighbours\""
        );
    }

    #[test]
    fn build_all_skips_devices_without_neighbours() {
        let snaps = vec![
            snapshot(vec![]),
            snapshot(vec![Some(MacAddress::new("11:22:33:44:55:66"))]),
        ];
        assert_eq!(Category::Neighbours.build_all(&snaps).len(), 1);
        assert_eq!(Category::Statistics.build_all(&snaps).len(), 2);
    }

    #[test]
    fn record_reports_its_category_and_key() {
        let record = Category::NodeInfo.build(&snapshot(vec![])).unwrap();
        assert_eq!(record.category(), Category::NodeInfo);
        assert_eq!(record.node_id(), "aabbccddeeff");
    }
}
