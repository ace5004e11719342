// ── Transport loop ──
//
// Owns the UDP socket and runs the request/response cycle:
//
//   Idle -> AwaitRequest -> Polling -> Replying -> Idle
//
// In listen mode `AwaitRequest` is a receive on the multicast socket and
// replies go back to the requester. In push mode it is a sleep aligned to
// the push interval and replies go to a fixed destination. A failed poll
// skips the cycle; nothing here is fatal once the socket is set up.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Mode, ResponderConfig};
use crate::error::{ProviderError, ResponderError};
use crate::provider::Provider;
use crate::reply;
use crate::request::Request;

/// Largest request we accept; requests are a handful of words.
const RECV_BUFFER: usize = 2048;

/// Position in the request/response cycle, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    AwaitRequest,
    Polling,
    Replying,
}

/// Result of handling one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Datagrams actually handed to the socket.
    Sent { datagrams: usize },
    /// Nothing was sent (poll failed or nothing was asked for).
    Skipped,
}

/// Where replies go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Back to the sender of each request.
    Requester,
    /// A fixed address, every `interval`.
    Fixed { addr: SocketAddr, interval: Duration },
}

/// Delay before the next push so cycle starts stay `interval` apart,
/// however long the last cycle took. The first cycle waits a full interval.
pub fn push_delay(last_cycle: Option<Duration>, interval: Duration) -> Duration {
    let period = interval.as_millis().max(1);
    let elapsed = last_cycle.map_or(0, |d| d.as_millis() % period);
    Duration::from_millis(u64::try_from(period - elapsed).unwrap_or(u64::MAX))
}

/// The respondd responder.
pub struct Responder<P> {
    socket: UdpSocket,
    provider: P,
    destination: Destination,
    poll_timeout: Duration,
    state: watch::Sender<CycleState>,
}

impl<P: Provider> Responder<P> {
    /// Bind the socket described by `config`: join the multicast group in
    /// listen mode, resolve the destination in push mode.
    pub async fn bind(config: &ResponderConfig, provider: P) -> Result<Self, ResponderError> {
        let interface = config.interface.as_deref();

        let (socket, destination) = match &config.mode {
            Mode::Listen { group, port } => {
                let socket = bind_udp(SocketAddr::from((Ipv6Addr::UNSPECIFIED, *port))).await?;
                let ifindex = match interface {
                    Some(name) => {
                        bind_device(&socket, name)?;
                        interface_index(name)?
                    }
                    None => 0,
                };
                socket
                    .join_multicast_v6(group, ifindex)
                    .map_err(|source| ResponderError::JoinMulticast {
                        group: *group,
                        ifindex,
                        source,
                    })?;
                info!(%group, port, ?interface, "listening for respondd requests");
                (socket, Destination::Requester)
            }
            Mode::Push {
                host,
                port,
                interval,
            } => {
                let addr = resolve(host, *port).await?;
                let local = if addr.is_ipv4() {
                    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
                } else {
                    SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
                };
                let socket = bind_udp(local).await?;
                if let Some(name) = interface {
                    bind_device(&socket, name)?;
                }
                info!(%addr, interval_secs = interval.as_secs(), "pushing respondd data");
                (
                    socket,
                    Destination::Fixed {
                        addr,
                        interval: *interval,
                    },
                )
            }
        };

        Ok(Self::from_socket(
            socket,
            provider,
            destination,
            config.poll_timeout,
        ))
    }

    /// Wrap an already bound socket.
    pub fn from_socket(
        socket: UdpSocket,
        provider: P,
        destination: Destination,
        poll_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(CycleState::Idle);
        Self {
            socket,
            provider,
            destination,
            poll_timeout,
            state,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Watch cycle state transitions.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn set_state(&self, state: CycleState) {
        self.state.send_replace(state);
    }

    /// Run until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        match self.destination {
            Destination::Requester => self.listen(&cancel).await,
            Destination::Fixed { addr, interval } => self.push(addr, interval, &cancel).await,
        }
        self.set_state(CycleState::Idle);
        debug!("responder stopped");
    }

    async fn listen(&self, cancel: &CancellationToken) {
        let mut buf = vec![0u8; RECV_BUFFER];
        loop {
            self.set_state(CycleState::AwaitRequest);
            let (len, src) = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "receive failed");
                        continue;
                    }
                },
            };

            let request = match Request::parse(&buf[..len]) {
                Ok(request) => request,
                Err(e) => {
                    warn!(%src, error = %e, "ignoring request");
                    continue;
                }
            };
            debug!(%src, ?request, "request received");

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.handle(&request, src) => {}
            }
        }
    }

    async fn push(&self, addr: SocketAddr, interval: Duration, cancel: &CancellationToken) {
        let request = Request::full();
        let mut last_cycle = None;
        loop {
            self.set_state(CycleState::AwaitRequest);
            let delay = push_delay(last_cycle, interval);
            debug!(delay_ms = delay.as_millis(), "waiting for next push");
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }

            let started = Instant::now();
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.handle(&request, addr) => {}
            }
            last_cycle = Some(started.elapsed());
        }
    }

    /// Poll once and reply to `dest`, one datagram per device. Every
    /// category of the reply is built from the same poll.
    pub async fn handle(&self, request: &Request, dest: SocketAddr) -> CycleOutcome {
        if request.categories().is_empty() {
            warn!(%dest, "request names no known category");
            self.set_state(CycleState::Idle);
            return CycleOutcome::Skipped;
        }

        self.set_state(CycleState::Polling);
        let polled = match tokio::time::timeout(self.poll_timeout, self.provider.poll()).await {
            Ok(polled) => polled,
            Err(_) => Err(ProviderError::PollTimeout {
                timeout_secs: self.poll_timeout.as_secs(),
            }),
        };
        let snapshots = match polled {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "poll failed, skipping cycle");
                self.set_state(CycleState::Idle);
                return CycleOutcome::Skipped;
            }
        };

        self.set_state(CycleState::Replying);
        let datagrams = match reply::render(request, &snapshots) {
            Ok(datagrams) => datagrams,
            Err(e) => {
                error!(error = %ResponderError::from(e), "cannot encode reply");
                self.set_state(CycleState::Idle);
                return CycleOutcome::Skipped;
            }
        };

        let mut sent = 0;
        for datagram in &datagrams {
            match self.socket.send_to(datagram, dest).await {
                Ok(_) => sent += 1,
                Err(source) => {
                    error!(error = %ResponderError::Send { dest, source }, len = datagram.len(), "send failed");
                }
            }
        }

        info!(%dest, devices = snapshots.len(), datagrams = sent, "reply sent");
        self.set_state(CycleState::Idle);
        CycleOutcome::Sent { datagrams: sent }
    }
}

async fn bind_udp(addr: SocketAddr) -> Result<UdpSocket, ResponderError> {
    UdpSocket::bind(addr)
        .await
        .map_err(|source| ResponderError::Bind {
            port: addr.port(),
            source,
        })
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ResponderError> {
    let unresolved = || ResponderError::Resolve {
        host: host.to_owned(),
        port,
    };
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| unresolved())?
        .next()
        .ok_or_else(unresolved)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn bind_device(socket: &UdpSocket, name: &str) -> Result<(), ResponderError> {
    socket
        .bind_device(Some(name.as_bytes()))
        .map_err(|source| ResponderError::BindDevice {
            name: name.to_owned(),
            source,
        })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn bind_device(_socket: &UdpSocket, name: &str) -> Result<(), ResponderError> {
    warn!(interface = name, "binding to a device is not supported on this platform");
    Ok(())
}

#[cfg(unix)]
fn interface_index(name: &str) -> Result<u32, ResponderError> {
    nix::net::if_::if_nametoindex(name).map_err(|_| ResponderError::InterfaceNotFound {
        name: name.to_owned(),
    })
}

#[cfg(not(unix))]
fn interface_index(_name: &str) -> Result<u32, ResponderError> {
    Ok(0)
}
