#![allow(clippy::unwrap_used)]
// Program-level tests for `Responder` over real loopback UDP sockets.

use std::collections::BTreeSet;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use flate2::read::DeflateDecoder;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use respondd_core::{
    CycleState, Destination, DeviceSnapshot, MacAddress, Provider, ProviderError, Responder,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Serves fixed snapshots; fails the first `fail_first` polls and hangs
/// for `stall` on the first `stall_first`.
struct StaticProvider {
    snapshots: Vec<DeviceSnapshot>,
    fail_first: usize,
    stall_first: usize,
    stall: Duration,
    polls: AtomicUsize,
}

impl StaticProvider {
    fn new(snapshots: Vec<DeviceSnapshot>) -> Self {
        Self {
            snapshots,
            fail_first: 0,
            stall_first: 0,
            stall: Duration::ZERO,
            polls: AtomicUsize::new(0),
        }
    }

    fn failing_first(mut self, polls: usize) -> Self {
        self.fail_first = polls;
        self
    }

    fn stalling_first(mut self, polls: usize, stall: Duration) -> Self {
        self.stall_first = polls;
        self.stall = stall;
        self
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn poll(&self) -> Result<Vec<DeviceSnapshot>, ProviderError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if n < self.stall_first {
            tokio::time::sleep(self.stall).await;
        }
        if n < self.fail_first {
            return Err(ProviderError::AuthenticationFailed {
                message: "controller rejected login".into(),
            });
        }
        Ok(self.snapshots.clone())
    }
}

fn reference_ap() -> DeviceSnapshot {
    DeviceSnapshot {
        name: "AP-Lobby".into(),
        mac: MacAddress::new("AA:BB:CC:DD:EE:FF"),
        model: "U7PG2".into(),
        firmware_base: "UniFi".into(),
        firmware: "6.5.28".into(),
        domain_code: "ffmuc_muc_cty".into(),
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

fn meshed_ap() -> DeviceSnapshot {
    DeviceSnapshot {
        name: "AP-Roof".into(),
        mac: MacAddress::new("11:22:33:44:55:66"),
        neighbour_macs: vec![None, Some(MacAddress::new("aa:bb:cc:dd:ee:ff"))],
        ..DeviceSnapshot::default()
    }
}

struct Harness {
    responder: Arc<Responder<StaticProvider>>,
    addr: SocketAddr,
    requester: UdpSocket,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Harness {
    async fn listen(provider: StaticProvider) -> Self {
        Self::listen_with_timeout(provider, Duration::from_secs(5)).await
    }

    async fn listen_with_timeout(provider: StaticProvider, poll_timeout: Duration) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let responder = Arc::new(Responder::from_socket(
            socket,
            provider,
            Destination::Requester,
            poll_timeout,
        ));
        let addr = responder.local_addr().unwrap();
        let requester = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let cancel = CancellationToken::new();

        let task = {
            let responder = Arc::clone(&responder);
            let cancel = cancel.clone();
            tokio::spawn(async move { responder.run(cancel).await })
        };

        Self {
            responder,
            addr,
            requester,
            cancel,
            task,
        }
    }

    async fn ask(&self, request: &str) {
        self.requester
            .send_to(request.as_bytes(), self.addr)
            .await
            .unwrap();
    }

    async fn shutdown(self) {
        self.cancel.cancel();
        self.task.await.unwrap();
    }
}

async fn recv(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = vec![0u8; 65_536];
    let (len, _) = tokio::time::timeout(Duration::from_secs(5), socket.recv_from(&mut buf))
        .await
        .expect("no datagram within 5s")
        .unwrap();
    buf.truncate(len);
    buf
}

async fn assert_silent(socket: &UdpSocket) {
    let mut buf = vec![0u8; 65_536];
    let waited =
        tokio::time::timeout(Duration::from_millis(300), socket.recv_from(&mut buf)).await;
    assert!(waited.is_err(), "unexpected datagram");
}

fn inflate(bytes: &[u8]) -> Value {
    let mut out = Vec::new();
    DeflateDecoder::new(bytes).read_to_end(&mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

// ── Listen mode ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_sends_one_compressed_datagram_per_device() {
    let h = Harness::listen(StaticProvider::new(vec![reference_ap(), meshed_ap()])).await;

    h.ask("GET nodeinfo statistics").await;
    let first = inflate(&recv(&h.requester).await);
    let second = inflate(&recv(&h.requester).await);

    // Each datagram is a single complete JSON object for one device.
    for body in [&first, &second] {
        assert_eq!(keys(body), ["nodeinfo", "statistics"]);
        assert_eq!(body["nodeinfo"]["node_id"], body["statistics"]["node_id"]);
    }
    let ids: BTreeSet<_> = [&first, &second]
        .iter()
        .map(|b| b["nodeinfo"]["node_id"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        ids,
        BTreeSet::from(["AABBCCDDEEFF".to_owned(), "112233445566".to_owned()])
    );

    assert_silent(&h.requester).await;
    h.shutdown().await;
}

#[tokio::test]
async fn test_reference_device_end_to_end() {
    let h = Harness::listen(StaticProvider::new(vec![reference_ap()])).await;

    h.ask("GET nodeinfo statistics neighbours").await;
    let body = inflate(&recv(&h.requester).await);

    assert_eq!(keys(&body), ["nodeinfo", "statistics"]);
    assert_eq!(
        body["statistics"],
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
    assert_eq!(body["nodeinfo"]["hostname"], "AP-Lobby");
    assert_eq!(body["nodeinfo"]["location"], json!({ "latitude": 0.0, "longitude": 0.0 }));

    h.shutdown().await;
}

#[tokio::test]
async fn test_single_category_is_uncompressed_bare_record() {
    let h = Harness::listen(StaticProvider::new(vec![meshed_ap()])).await;

    h.ask("neighbours").await;
    let body: Value = serde_json::from_slice(&recv(&h.requester).await).unwrap();

    assert_eq!(
        body,
        json!({
            "node_id": "112233445566",
            "batadv": {
                "11:22:33:44:55:66": {
                    "neighbours": { "aa:bb:cc:dd:ee:ff": { "tq": 255, "lastseen": 0.45 } }
                }
            }
        })
    );

    h.shutdown().await;
}

#[tokio::test]
async fn test_unknown_categories_are_skipped() {
    let h = Harness::listen(StaticProvider::new(vec![reference_ap()])).await;

    h.ask("GET firmware statistics").await;
    let body = inflate(&recv(&h.requester).await);
    assert_eq!(keys(&body), ["statistics"]);

    h.shutdown().await;
}

#[tokio::test]
async fn test_nothing_requested_sends_nothing_and_skips_poll() {
    let h = Harness::listen(StaticProvider::new(vec![reference_ap()])).await;

    h.ask("GET firmware").await;
    h.ask("bogus").await;
    assert_silent(&h.requester).await;
    assert_eq!(h.responder.provider().polls.load(Ordering::SeqCst), 0);

    h.shutdown().await;
}

#[tokio::test]
async fn test_provider_failure_sends_nothing_and_loop_survives() {
    let provider = StaticProvider::new(vec![reference_ap()]).failing_first(1);
    let h = Harness::listen(provider).await;

    h.ask("GET nodeinfo").await;
    assert_silent(&h.requester).await;

    h.ask("GET nodeinfo").await;
    let body = inflate(&recv(&h.requester).await);
    assert_eq!(keys(&body), ["nodeinfo"]);
    assert_eq!(h.responder.provider().polls.load(Ordering::SeqCst), 2);

    h.shutdown().await;
}

#[tokio::test]
async fn test_hanging_provider_is_skipped_and_loop_survives() {
    let provider =
        StaticProvider::new(vec![reference_ap()]).stalling_first(1, Duration::from_secs(30));
    let h = Harness::listen_with_timeout(provider, Duration::from_millis(200)).await;

    h.ask("GET statistics").await;
    assert_silent(&h.requester).await;

    h.ask("GET statistics").await;
    let body = inflate(&recv(&h.requester).await);
    assert_eq!(keys(&body), ["statistics"]);
    assert_eq!(h.responder.provider().polls.load(Ordering::SeqCst), 2);

    h.shutdown().await;
}

#[tokio::test]
async fn test_cancel_returns_to_idle() {
    let h = Harness::listen(StaticProvider::new(Vec::new())).await;
    let state = h.responder.subscribe();

    h.shutdown().await;
    assert_eq!(*state.borrow(), CycleState::Idle);
}

// ── Push mode ───────────────────────────────────────────────────────

struct Push {
    responder: Arc<Responder<StaticProvider>>,
    receiver: UdpSocket,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Push {
    async fn start(provider: StaticProvider, interval: Duration) -> Self {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let responder = Arc::new(Responder::from_socket(
            socket,
            provider,
            Destination::Fixed {
                addr: receiver.local_addr().unwrap(),
                interval,
            },
            Duration::from_secs(5),
        ));
        let cancel = CancellationToken::new();
        let task = {
            let responder = Arc::clone(&responder);
            let cancel = cancel.clone();
            tokio::spawn(async move { responder.run(cancel).await })
        };
        Self {
            responder,
            receiver,
            cancel,
            task,
        }
    }

    async fn next(&self) -> Value {
        let mut buf = vec![0u8; 65_536];
        let (len, _) = self.receiver.recv_from(&mut buf).await.unwrap();
        inflate(&buf[..len])
    }

    async fn stop(self) -> usize {
        self.cancel.cancel();
        self.task.await.unwrap();
        self.responder.provider().polls.load(Ordering::SeqCst)
    }
}

#[tokio::test(start_paused = true)]
async fn test_push_sends_full_reply_on_interval() {
    let interval = Duration::from_secs(60);
    let push = Push::start(StaticProvider::new(vec![meshed_ap()]), interval).await;
    let start = tokio::time::Instant::now();

    let body = push.next().await;
    let first_at = start.elapsed();
    assert_eq!(keys(&body), ["neighbours", "nodeinfo", "statistics"]);
    assert!(first_at >= interval && first_at < interval + Duration::from_secs(1));

    assert!(!push.next().await.is_null());
    let second_at = start.elapsed();
    assert!(second_at >= interval * 2 && second_at < interval * 2 + Duration::from_secs(1));

    assert_eq!(push.stop().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_push_keeps_schedule_after_failed_cycle() {
    let interval = Duration::from_secs(60);
    let provider = StaticProvider::new(vec![meshed_ap()]).failing_first(1);
    let push = Push::start(provider, interval).await;
    let start = tokio::time::Instant::now();

    // The cycle at one interval fails silently; the next one still runs.
    let body = push.next().await;
    let at = start.elapsed();
    assert_eq!(keys(&body), ["neighbours", "nodeinfo", "statistics"]);
    assert!(at >= interval * 2 && at < interval * 2 + Duration::from_secs(1));

    assert_eq!(push.stop().await, 2);
}
