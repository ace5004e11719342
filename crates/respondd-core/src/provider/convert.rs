// ── UniFi device conversion ──
//
// Maps legacy API device and station records into `DeviceSnapshot`s.
// Everything here is synchronous; location resolution happens afterwards
// in the provider.

use regex::Regex;
use respondd_api::NodelistNode;
use respondd_api::legacy::models::{LegacyClientEntry, LegacyDevice, VapEntry};

use crate::model::{DeviceSnapshot, MacAddress};

/// Vendor label reported as firmware base.
pub const FIRMWARE_BASE: &str = "UniFi";

/// Highest channel number on the 2.4 GHz band.
const MAX_CHANNEL_24: u32 = 14;

/// Per-site reference data shared by every device of that site.
#[derive(Debug, Clone, Copy)]
pub struct SiteContext<'a> {
    pub ssid: &'a Regex,
    /// Configured offloader of this site.
    pub offloader: Option<&'a MacAddress>,
    /// Node-list entry of the offloader, when it was found.
    pub gateway: Option<&'a NodelistNode>,
    pub fallback_domain: &'a str,
}

/// Client counts as `(total, 2.4 GHz, 5 GHz)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientCounts {
    pub total: u32,
    pub wifi24: u32,
    pub wifi5: u32,
}

fn essid_matches(ssid: &Regex, essid: Option<&str>) -> bool {
    ssid.is_match(essid.unwrap_or_default())
}

/// Summed `(tx, rx)` over the mesh VAPs, or `None` when the device
/// broadcasts no mesh SSID at all.
pub fn matching_traffic(vaps: &[VapEntry], ssid: &Regex) -> Option<(u64, u64)> {
    vaps.iter()
        .filter(|vap| essid_matches(ssid, vap.essid.as_deref()))
        .fold(None, |acc, vap| {
            let (tx, rx) = acc.unwrap_or((0, 0));
            Some((
                tx.saturating_add(vap.tx_bytes.unwrap_or(0)),
                rx.saturating_add(vap.rx_bytes.unwrap_or(0)),
            ))
        })
}

/// Count stations on the mesh SSIDs associated with `ap_mac`.
pub fn count_clients(ap_mac: &MacAddress, clients: &[LegacyClientEntry], ssid: &Regex) -> ClientCounts {
    let mut counts = ClientCounts::default();
    for client in clients {
        let on_ap = client.ap_mac.as_deref().is_some_and(|mac| ap_mac.matches(mac));
        if !on_ap || !essid_matches(ssid, client.essid.as_deref()) {
            continue;
        }
        if client.channel.unwrap_or(0) > MAX_CHANNEL_24 {
            counts.wifi5 += 1;
        } else {
            counts.wifi24 += 1;
        }
    }
    counts.total = counts.wifi24 + counts.wifi5;
    counts
}

/// Neighbours in report order: offloader (`None` when the site has none),
/// wireless uplink, then wireless LLDP peers.
pub fn neighbour_macs(device: &LegacyDevice, offloader: Option<&MacAddress>) -> Vec<Option<MacAddress>> {
    let mut macs = vec![offloader.cloned()];

    if let Some(ap_mac) = device.uplink.as_ref().and_then(|u| u.ap_mac.as_deref()) {
        macs.push(Some(MacAddress::new(ap_mac)));
    }

    macs.extend(
        device
            .lldp_table
            .iter()
            .flatten()
            .filter(|entry| entry.is_wired == Some(false))
            .map(|entry| entry.chassis_id.as_deref().map(MacAddress::new)),
    );
    macs
}

/// Build a snapshot for a mesh access point. Returns `None` for devices
/// that are not online, unnamed, not access points, or carry no mesh SSID.
pub fn snapshot(
    device: &LegacyDevice,
    clients: &[LegacyClientEntry],
    site: &SiteContext<'_>,
) -> Option<DeviceSnapshot> {
    let name = device.name.as_deref()?;
    if !device.is_online_access_point() {
        return None;
    }
    let (tx_bytes, rx_bytes) = matching_traffic(device.vap_table.as_deref()?, site.ssid)?;

    let mac = MacAddress::new(&device.mac);
    let counts = count_clients(&mac, clients, site.ssid);
    let stats = device.sys_stats.clone().unwrap_or_default();

    let (gateway, gateway6, gateway_nexthop, domain_code) = match site.gateway {
        Some(node) => (
            node.gateway.clone(),
            node.gateway6.clone(),
            site.offloader.map(MacAddress::node_id),
            node.domain
                .clone()
                .unwrap_or_else(|| site.fallback_domain.to_owned()),
        ),
        None => (None, None, None, site.fallback_domain.to_owned()),
    };

    Some(DeviceSnapshot {
        name: name.to_owned(),
        neighbour_macs: neighbour_macs(device, site.offloader),
        mac,
        model: device.model.clone().unwrap_or_default(),
        firmware_base: FIRMWARE_BASE.to_owned(),
        firmware: device.version.clone().unwrap_or_default(),
        location: device
            .snmp_location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        coordinates: None,
        contact: device.snmp_contact.clone().unwrap_or_default(),
        gateway,
        gateway6,
        gateway_nexthop,
        domain_code,
        client_count: counts.total,
        client_count24: counts.wifi24,
        client_count5: counts.wifi5,
        uptime: device.uptime.unwrap_or(0),
        load_avg: stats.load_1.unwrap_or(0.0),
        mem_total: stats.mem_total.unwrap_or(0),
        mem_used: stats.mem_used.unwrap_or(0),
        mem_buffer: stats.mem_buffer.unwrap_or(0),
        tx_bytes,
        rx_bytes,
    })
}
