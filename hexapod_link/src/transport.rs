//! Text channels to the robot.
//!
//! The console talks to the robot over two WebSocket connections: one
//! carrying control packets out, one carrying telemetry in.  Both sit behind
//! the [`Transport`] trait so the encoder and the event loop can be driven
//! by an in-memory double in tests.
//!
//! A [`WsChannel`] owns a dedicated I/O thread running a current-thread
//! tokio runtime.  The event loop never blocks on it: outbound text goes
//! through an unbounded channel, inbound text is drained with
//! [`Transport::drain_inbound`] once per frame, and the connection state is
//! an atomic.  There is no reconnect; once closed, a channel stays closed.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};

// ════════════════════════════════════════════════════════════════════════════
// ChannelState
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle of a channel.  Only `Open` accepts traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    Connecting = 0,
    Open       = 1,
    Closing    = 2,
    Closed     = 3,
}

impl ChannelState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ChannelState::Connecting,
            1 => ChannelState::Open,
            2 => ChannelState::Closing,
            _ => ChannelState::Closed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open       => "open",
            ChannelState::Closing    => "closing",
            ChannelState::Closed     => "closed",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transport
// ════════════════════════════════════════════════════════════════════════════

pub trait Transport {
    fn state(&self) -> ChannelState;

    /// Queue one text message.  Callers check [`is_open`](Self::is_open)
    /// first; sending on a channel that is not open is an error.
    fn send_text(&mut self, text: String) -> Result<()>;

    /// Everything received since the last call, oldest first.
    fn drain_inbound(&mut self) -> Vec<String> { Vec::new() }

    fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }
}

// ── null backend (console without a robot, and tests) ─────────────────────

/// Never open; swallows anything sent to it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn state(&self) -> ChannelState { ChannelState::Closed }
    fn send_text(&mut self, _text: String) -> Result<()> { Ok(()) }
}

// ════════════════════════════════════════════════════════════════════════════
// WsChannel — WebSocket on its own I/O thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to one WebSocket connection.
pub struct WsChannel {
    url:      String,
    state:    Arc<AtomicU8>,
    outbound: Option<UnboundedSender<String>>,
    inbound:  Receiver<String>,
}

impl WsChannel {
    /// Start connecting to `url` in the background.
    ///
    /// Returns immediately in `Connecting`; the state moves to `Open` once
    /// the handshake completes, or to `Closed` if it fails.  An error here
    /// means the I/O thread itself could not be started.
    pub fn open(url: &str) -> Result<Self> {
        let state = Arc::new(AtomicU8::new(ChannelState::Connecting as u8));
        let (out_tx, out_rx) = unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::channel::<String>();

        let thread_state = Arc::clone(&state);
        let thread_url = url.to_string();
        thread::Builder::new()
            .name(format!("ws {}", url))
            .spawn(move || channel_thread(thread_url, thread_state, out_rx, in_tx))?;

        Ok(WsChannel {
            url: url.to_string(),
            state,
            outbound: Some(out_tx),
            inbound: in_rx,
        })
    }

    pub fn url(&self) -> &str { &self.url }

    /// Ask the I/O thread to send a close frame and stop.
    pub fn close(&mut self) {
        if self.outbound.take().is_none() { return; }
        let live = self.state.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| {
            match ChannelState::from_u8(s) {
                ChannelState::Connecting | ChannelState::Open => Some(ChannelState::Closing as u8),
                _ => None,
            }
        });
        if live.is_ok() {
            info!(url = %self.url, "closing channel");
        }
    }
}

impl Transport for WsChannel {
    fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn send_text(&mut self, text: String) -> Result<()> {
        let closed = || LinkError::ChannelClosed { url: self.url.clone() };
        if !self.is_open() {
            return Err(closed());
        }
        match &self.outbound {
            Some(tx) => tx.send(text).map_err(|_| closed()),
            None     => Err(closed()),
        }
    }

    fn drain_inbound(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.inbound.try_recv() { out.push(text); }
        out
    }
}

impl std::fmt::Debug for WsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsChannel")
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// channel_thread — the I/O loop
// ════════════════════════════════════════════════════════════════════════════

fn channel_thread(
    url:      String,
    state:    Arc<AtomicU8>,
    outbound: UnboundedReceiver<String>,
    inbound:  Sender<String>,
) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();
    match runtime {
        Ok(rt) => rt.block_on(pump(&url, &state, outbound, inbound)),
        Err(e) => warn!(%url, error = %e, "could not start channel runtime"),
    }
    state.store(ChannelState::Closed as u8, Ordering::SeqCst);
    info!(%url, "channel closed");
}

async fn pump(
    url:          &str,
    state:        &AtomicU8,
    mut outbound: UnboundedReceiver<String>,
    inbound:      Sender<String>,
) {
    let ws = match connect_async(url).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            warn!(%url, error = %e, "connect failed");
            return;
        }
    };
    // A close requested during the handshake wins.
    if state
        .compare_exchange(
            ChannelState::Connecting as u8,
            ChannelState::Open as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_ok()
    {
        info!(%url, "channel open");
    }

    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(text) => {
                    debug!(%url, bytes = text.len(), "send");
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        warn!(%url, error = %e, "send failed");
                        break;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(text.to_string()).is_err() { break; }
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => {
                        if inbound.send(text).is_err() { break; }
                    }
                    Err(_) => debug!(%url, len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(_))) => {
                    info!(%url, "closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%url, error = %e, "receive failed");
                    break;
                }
                None => break,
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
