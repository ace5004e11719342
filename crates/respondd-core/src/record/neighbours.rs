// ── neighbours record ──
//
// Access points do not run batman-adv, so link quality is synthetic: every
// known neighbour is reported at full quality and freshly seen.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::DeviceSnapshot;

/// Maximum batman-adv transmit quality.
pub const MAX_TQ: u8 = 255;

/// Placeholder "last seen" age in seconds.
pub const LAST_SEEN_SECS: f64 = 0.45;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbours {
    pub node_id: String,
    /// Keyed by the device's own MAC address.
    pub batadv: IndexMap<String, BatadvInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatadvInterface {
    /// Keyed by neighbour MAC address.
    pub neighbours: IndexMap<String, Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub tq: u8,
    pub lastseen: f64,
}

impl Neighbours {
    /// `None` when the snapshot has no resolved neighbour.
    pub fn from_snapshot(ap: &DeviceSnapshot) -> Option<Self> {
        let links: IndexMap<String, Link> = ap
            .known_neighbours()
            .map(|mac| {
                (
                    mac.as_str().to_owned(),
                    Link {
                        tq: MAX_TQ,
                        lastseen: LAST_SEEN_SECS,
                    },
                )
            })
            .collect();

        if links.is_empty() {
            return None;
        }

        let mut batadv = IndexMap::new();
        batadv.insert(
            ap.mac.as_str().to_owned(),
            BatadvInterface { neighbours: links },
        );

        Some(Self {
            node_id: ap.node_id(),
            batadv,
        })
    }
}
