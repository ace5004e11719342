// ── Reply rendering ──
//
// builders -> merge -> codec. Every requested category is rendered from the
// same snapshot slice, so one reply is a consistent view of one poll.

use crate::codec::{self, CodecError};
use crate::merge::MergedReply;
use crate::model::DeviceSnapshot;
use crate::request::Request;

/// Render one datagram payload per device.
pub fn render(request: &Request, snapshots: &[DeviceSnapshot]) -> Result<Vec<Vec<u8>>, CodecError> {
    match request {
        Request::Single(category) => category
            .build_all(snapshots)
            .iter()
            .map(|record| codec::encode(record, false))
            .collect(),
        Request::Multi(categories) => {
            let merged = MergedReply::merge(
                categories
                    .iter()
                    .flat_map(|category| category.build_all(snapshots)),
            );
            merged
                .iter()
                .map(|(_, device)| codec::encode(device, true))
                .collect()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MacAddress;
    use flate2::read::DeflateDecoder;
    use serde_json::Value;
    use std::io::Read;

    fn reference_ap() -> DeviceSnapshot {
        DeviceSnapshot {
            name: "AP-1".into(),
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

    fn inflate_json(bytes: &[u8]) -> Value {
        let mut out = Vec::new();
        DeflateDecoder::new(bytes).read_to_end(&mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn full_request_omits_neighbours_for_isolated_device() {
        let request = Request::parse(b"GET nodeinfo statistics neighbours").unwrap();
        let datagrams = render(&request, &[reference_ap()]).unwrap();
        assert_eq!(datagrams.len(), 1);

        let body = inflate_json(&datagrams[0]);
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["nodeinfo", "statistics"]);
        assert_eq!(body["statistics"]["node_id"], "AABBCCDDEEFF");
        assert_eq!(body["statistics"]["memory"]["free"], 100);
    }

    #[test]
    fn one_datagram_per_device() {
        let mut second = reference_ap();
        second.mac = MacAddress::new("11:22:33:44:55:66");
        let datagrams = render(&Request::full(), &[reference_ap(), second]).unwrap();

        assert_eq!(datagrams.len(), 2);
        let ids: Vec<_> = datagrams
            .iter()
            .map(|d| inflate_json(d)["nodeinfo"]["node_id"].clone())
            .collect();
        assert_eq!(ids, ["AABBCCDDEEFF", "112233445566"]);
    }

    #[test]
    fn single_request_is_bare_uncompressed_record() {
        let datagrams = render(&Request::parse(b"statistics").unwrap(), &[reference_ap()]).unwrap();
        let body: Value = serde_json::from_slice(&datagrams[0]).unwrap();
        assert_eq!(body["uptime"], 3600);
        assert!(body.get("statistics").is_none());
    }

    #[test]
    fn nothing_to_send_without_devices_or_categories() {
        assert!(render(&Request::full(), &[]).unwrap().is_empty());
        assert!(
            render(&Request::Multi(Vec::new()), &[reference_ap()])
                .unwrap()
                .is_empty()
        );
        assert!(
            render(&Request::parse(b"neighbours").unwrap(), &[reference_ap()])
                .unwrap()
                .is_empty()
        );
    }
}
