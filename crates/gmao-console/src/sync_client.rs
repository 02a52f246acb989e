//! WebSocket client for the snapshot/command protocol.
//!
//! The server pushes a full snapshot right after the handshake and again
//! after every accepted command. The client never patches local state from a
//! command it sent; it waits for the next push.

use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::RngCore;
use smol_str::SmolStr;
use tracing::{debug, error, info, warn};
use tungstenite::{Message, WebSocket};

use gmao_sync::{decode_snapshot, Command, StateStore, SyncError};

use crate::config::{ConsoleConfig, ReconnectPolicy};
use crate::error::ConsoleError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const JITTER_RANGE_MS: u32 = 250;

/// Parsed `ws://` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    /// Full URL handed to the WebSocket handshake.
    pub url: SmolStr,
    /// `host:port` authority used for the TCP connection.
    pub authority: SmolStr,
}

impl ServerEndpoint {
    pub fn parse(text: &str) -> Result<Self, ConsoleError> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix("ws://") else {
            return Err(ConsoleError::InvalidEndpoint(
                format!("unsupported endpoint '{text}' (expected ws://host:port)").into(),
            ));
        };
        let authority = rest.split('/').next().unwrap_or_default();
        let Some((host, port)) = authority.rsplit_once(':') else {
            return Err(ConsoleError::InvalidEndpoint(
                format!("missing port in endpoint '{text}'").into(),
            ));
        };
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConsoleError::InvalidEndpoint(
                format!("invalid host or port in endpoint '{text}'").into(),
            ));
        }
        Ok(Self {
            url: SmolStr::new(text),
            authority: SmolStr::new(authority),
        })
    }
}

/// Link lifecycle events surfaced to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Handshake completed; a snapshot push is expected next.
    Connected,
    /// Link lost; automatic retries are scheduled.
    Disconnected {
        /// Human-readable cause.
        reason: SmolStr,
    },
    /// Automatic retries gave up; only a manual reconnect resumes.
    RetriesExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// An inbound message was rejected; the previous state is kept.
    SnapshotDiscarded {
        /// Rejection cause.
        reason: SmolStr,
    },
}

/// Blocking WebSocket client driven from the UI poll loop.
///
/// Reads use a short timeout so [`SyncClient::pump`] never stalls the loop.
/// There is exactly one writer to the [`StateStore`]: the pump.
pub struct SyncClient {
    endpoint: ServerEndpoint,
    policy: ReconnectPolicy,
    read_timeout: Duration,
    link: Option<WebSocket<TcpStream>>,
    last_seq: Option<u64>,
    attempts: u32,
    next_retry: Option<Instant>,
    gave_up: bool,
    pending: Vec<LinkEvent>,
}

impl SyncClient {
    #[must_use]
    pub fn new(endpoint: ServerEndpoint, policy: ReconnectPolicy, read_timeout: Duration) -> Self {
        Self {
            endpoint,
            policy,
            read_timeout,
            link: None,
            last_seq: None,
            attempts: 0,
            next_retry: None,
            gave_up: false,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let endpoint = ServerEndpoint::parse(&config.server_url)?;
        Ok(Self::new(endpoint, config.reconnect, config.poll_interval))
    }

    #[must_use]
    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Opens the link. Ignored with a warning when already connected.
    pub fn connect(&mut self) {
        if self.link.is_some() {
            warn!("websocket already connected; connect ignored");
            return;
        }
        self.gave_up = false;
        self.attempts = 0;
        if let Err(err) = self.open_link() {
            warn!(%err, "connect failed");
            self.pending.push(LinkEvent::Disconnected {
                reason: SmolStr::new(err.to_string()),
            });
            self.schedule_retry();
        }
    }

    /// Restarts the retry schedule after [`LinkEvent::RetriesExhausted`].
    pub fn request_reconnect(&mut self) {
        if self.link.is_some() {
            debug!("reconnect requested while connected; ignored");
            return;
        }
        info!("manual reconnect requested");
        self.gave_up = false;
        self.attempts = 0;
        self.next_retry = Some(Instant::now());
    }

    /// Sends one command. Returns `false` when the command was dropped
    /// because the link is down or the payload failed to encode.
    pub fn send(&mut self, command: &Command) -> bool {
        let line = match command.encode() {
            Ok(line) => line,
            Err(err) => {
                error!(%err, "command dropped");
                return false;
            }
        };
        let Some(socket) = self.link.as_mut() else {
            warn!(action = command.action(), "websocket not ready; command dropped");
            return false;
        };
        match socket.send(line.into()) {
            Ok(()) => {
                debug!(action = command.action(), "command sent");
                true
            }
            Err(err) => {
                self.drop_link(format!("send: {err}"));
                false
            }
        }
    }

    /// Drains inbound messages into the store and returns link events.
    ///
    /// Also drives the reconnect schedule while the link is down.
    pub fn pump(&mut self, store: &mut StateStore) -> Vec<LinkEvent> {
        if self.link.is_none() {
            self.poll_retry();
        }
        while let Some(socket) = self.link.as_mut() {
            let message = match socket.read() {
                Ok(message) => message,
                Err(tungstenite::Error::Io(err))
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    break;
                }
                Err(err) => {
                    self.drop_link(format!("read: {err}"));
                    break;
                }
            };
            match message {
                Message::Text(text) => self.handle_text(text.as_str(), store),
                Message::Close(_) => self.drop_link("closed by server".to_string()),
                _ => {}
            }
        }
        std::mem::take(&mut self.pending)
    }

    fn handle_text(&mut self, text: &str, store: &mut StateStore) {
        match decode_snapshot(text) {
            Ok(snapshot) => {
                if let (Some(last), Some(got)) = (self.last_seq, snapshot.seq) {
                    if got <= last {
                        let reason = SyncError::StaleSnapshot { last, got };
                        warn!(%reason, "snapshot discarded");
                        self.pending.push(LinkEvent::SnapshotDiscarded {
                            reason: SmolStr::new(reason.to_string()),
                        });
                        return;
                    }
                }
                if snapshot.seq.is_some() {
                    self.last_seq = snapshot.seq;
                }
                store.replace(snapshot);
            }
            Err(reason) => {
                error!(%reason, "snapshot discarded");
                self.pending.push(LinkEvent::SnapshotDiscarded {
                    reason: SmolStr::new(reason.to_string()),
                });
            }
        }
    }

    fn open_link(&mut self) -> Result<(), ConsoleError> {
        let authority = self.endpoint.authority.as_str();
        let mut addrs = authority.to_socket_addrs().map_err(|err| {
            ConsoleError::Connect(format!("resolve {authority}: {err}").into())
        })?;
        let addr = addrs
            .next()
            .ok_or_else(|| ConsoleError::Connect(format!("no address for {authority}").into()))?;
        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|err| ConsoleError::Connect(format!("{authority}: {err}").into()))?;
        stream
            .set_read_timeout(Some(CONNECT_TIMEOUT))
            .map_err(|err| ConsoleError::Connect(format!("read timeout: {err}").into()))?;
        let (socket, _response) = tungstenite::client(self.endpoint.url.as_str(), stream)
            .map_err(|err| ConsoleError::Connect(format!("handshake: {err}").into()))?;
        socket
            .get_ref()
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|err| ConsoleError::Connect(format!("read timeout: {err}").into()))?;
        self.link = Some(socket);
        self.last_seq = None;
        info!(url = %self.endpoint.url, "websocket connected");
        self.pending.push(LinkEvent::Connected);
        Ok(())
    }

    fn drop_link(&mut self, reason: String) {
        if let Some(mut socket) = self.link.take() {
            let _ = socket.close(None);
        }
        warn!(%reason, "websocket disconnected");
        self.pending.push(LinkEvent::Disconnected {
            reason: SmolStr::new(reason),
        });
        self.attempts = 0;
        self.gave_up = false;
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        let delay = self.policy.delay_for(self.attempts) + jitter();
        debug!(
            attempt = self.attempts,
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );
        self.next_retry = Some(Instant::now() + delay);
    }

    fn poll_retry(&mut self) {
        if self.gave_up {
            return;
        }
        let Some(at) = self.next_retry else { return };
        if Instant::now() < at {
            return;
        }
        self.attempts += 1;
        match self.open_link() {
            Ok(()) => {
                self.next_retry = None;
                self.attempts = 0;
            }
            Err(err) => {
                debug!(attempt = self.attempts, %err, "reconnect attempt failed");
                if self.attempts >= self.policy.max_attempts {
                    self.gave_up = true;
                    self.next_retry = None;
                    warn!(attempts = self.attempts, "reconnect attempts exhausted");
                    self.pending.push(LinkEvent::RetriesExhausted {
                        attempts: self.attempts,
                    });
                } else {
                    self.schedule_retry();
                }
            }
        }
    }
}

fn jitter() -> Duration {
    let mut buf = [0u8; 4];
    OsRng.fill_bytes(&mut buf);
    Duration::from_millis(u64::from(u32::from_le_bytes(buf) % JITTER_RANGE_MS))
}
