// ── Merge engine ──
//
// Folds per-category record lists into one object per device, keyed by
// device identifier. Devices may take part in any subset of categories.

use indexmap::IndexMap;
use serde::Serialize;

use crate::record::{Category, Record};

/// Records of one device, keyed by category.
pub type DeviceReply = IndexMap<Category, Record>;

/// `node_id -> category -> record` for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedReply {
    devices: IndexMap<String, DeviceReply>,
}

impl MergedReply {
    /// Merge record lists. Later records for the same device and category
    /// replace earlier ones.
    pub fn merge<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut devices: IndexMap<String, DeviceReply> = IndexMap::new();
        for record in records {
            devices
                .entry(record.node_id().to_owned())
                .or_default()
                .insert(record.category(), record);
        }
        Self { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, node_id: &str) -> Option<&DeviceReply> {
        self.devices.get(node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceReply)> {
        self.devices.iter().map(|(id, reply)| (id.as_str(), reply))
    }
}

impl IntoIterator for MergedReply {
    type Item = (String, DeviceReply);
    type IntoIter = indexmap::map::IntoIter<String, DeviceReply>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}
