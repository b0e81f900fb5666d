use anyhow::Result;
use canopy_core::Engine;
use canopy_proto as proto;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use strum::Display;
use thiserror::Error;
use tokio::{
    select,
    sync::{mpsc, oneshot, watch, Notify},
    task::JoinHandle,
    time::sleep,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::transport::WebsocketTransport;

/// Connection state for the websocket client
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConnectionState {
    Disconnected,
    #[strum(serialize = "Connecting")]
    Connecting {
        url: String,
    },
    #[strum(serialize = "Connected")]
    Connected {
        url: String,
    },
    #[strum(serialize = "Error")]
    Error(ConnectionError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    #[error("General connection error: {0}")]
    General(String),
}

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

pub(crate) struct Inner {
    engine: Arc<Engine>,
    server_url: String,
    state: watch::Sender<ConnectionState>,
    connected: AtomicBool,
    shutdown: Notify,
    shutdown_requested: AtomicBool,
    /// In-flight requests awaiting their correlated response.
    pub(crate) pending: DashMap<proto::RequestId, oneshot::Sender<proto::WireResponse>>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<proto::ClientMessage>>>,
}

impl Inner {
    pub(crate) fn outgoing_sender(&self) -> Option<mpsc::UnboundedSender<proto::ClientMessage>> {
        self.outgoing.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_outgoing(&self, sender: Option<mpsc::UnboundedSender<proto::ClientMessage>>) {
        *self.outgoing.lock().unwrap_or_else(|e| e.into_inner()) = sender;
    }
}

enum FrameResult {
    Continue,
    Break,
}

/// A WebSocket client connecting a Canopy engine to a remote authority
pub struct WebsocketClient {
    inner: Arc<Inner>,
    state_rx: watch::Receiver<ConnectionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WebsocketClient {
    /// Create a new WebSocket client and start connecting to the server. The
    /// engine's transport is attached immediately; requests made before the
    /// connection is up fail as closed.
    pub fn new(engine: Arc<Engine>, server_url: &str) -> Result<Self> {
        let ws_url = Self::normalize_url(server_url);
        info!("Creating WebSocket client for {}", ws_url);

        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let inner = Arc::new(Inner {
            engine: engine.clone(),
            server_url: ws_url,
            state: state_tx,
            connected: AtomicBool::new(false),
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
            pending: DashMap::new(),
            outgoing: Mutex::new(None),
        });
        engine.attach_transport(Arc::new(WebsocketTransport { inner: inner.clone() }));

        let task = tokio::spawn(Self::run_connection_loop(inner.clone()));
        Ok(Self { inner, state_rx, task: Mutex::new(Some(task)) })
    }

    fn normalize_url(url: &str) -> String {
        match url {
            u if u.starts_with("ws://") || u.starts_with("wss://") => u.to_string(),
            u if u.starts_with("http://") => format!("ws://{}", &u[7..]),
            u if u.starts_with("https://") => format!("wss://{}", &u[8..]),
            u => format!("wss://{}", u),
        }
    }

    /// The current connection state
    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Check if currently connected to the server
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Wait for the client to establish a connection to the server
    pub async fn wait_connected(&self) -> Result<(), ConnectionError> {
        let mut rx = self.state_rx.clone();
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    ConnectionState::Connected { .. } => return Ok(()),
                    ConnectionState::Error(e) => return Err(e.clone()),
                    _ => {}
                }
            }
            if rx.changed().await.is_err() {
                return Err(ConnectionError::General("client stopped".to_string()));
            }
        }
    }

    /// Gracefully shutdown the WebSocket connection
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down WebSocket client");

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            self.inner.shutdown_requested.store(true, Ordering::Release);
            self.inner.shutdown.notify_waiters();

            match task.await {
                Ok(()) => info!("WebSocket client shutdown completed"),
                Err(e) => warn!("Connection task join error during shutdown: {}", e),
            }
        } else {
            info!("WebSocket client already shut down");
        }
        Ok(())
    }

    /// Main connection loop with automatic reconnection
    async fn run_connection_loop(inner: Arc<Inner>) {
        let mut backoff = INITIAL_BACKOFF;
        info!("Starting websocket connection loop to {}", inner.server_url);

        loop {
            select! {
                _ = inner.shutdown.notified() => {
                    info!("Websocket connection shutting down");
                    break;
                }
                result = Self::connect_once(&inner) => {
                    match result {
                        Ok(()) => {
                            info!("Connection to {} completed normally", inner.server_url);
                            backoff = INITIAL_BACKOFF;
                            if inner.shutdown_requested.load(Ordering::Acquire) {
                                info!("Shutdown requested, stopping reconnection attempts");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Connection to {} failed: {}", inner.server_url, e);
                            let _ = inner.state.send(ConnectionState::Error(ConnectionError::General(e.to_string())));
                            inner.connected.store(false, Ordering::Release);

                            info!("Retrying connection in {:?}", backoff);
                            select! {
                                _ = inner.shutdown.notified() => break,
                                _ = sleep(backoff) => {}
                            }
                            backoff = (backoff * 2).min(MAX_BACKOFF);
                        }
                    }
                }
            }
        }

        let _ = inner.state.send(ConnectionState::Disconnected);
        inner.connected.store(false, Ordering::Release);
    }

    /// Attempt a single connection and pump it until it drops
    async fn connect_once(inner: &Arc<Inner>) -> Result<()> {
        info!("Attempting to connect to {}", inner.server_url);
        let _ = inner.state.send(ConnectionState::Connecting { url: inner.server_url.clone() });

        let (ws_stream, _) = connect_async(inner.server_url.as_str()).await?;
        info!("WebSocket handshake completed with {}", inner.server_url);

        let (mut sink, mut stream) = ws_stream.split();

        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
        inner.set_outgoing(Some(outgoing_tx));
        let _ = inner.state.send(ConnectionState::Connected { url: inner.server_url.clone() });
        inner.connected.store(true, Ordering::Release);

        let result = loop {
            select! {
                _ = inner.shutdown.notified() => {
                    debug!("Connection received shutdown signal");
                    break Ok(());
                }
                msg = outgoing_rx.recv() => {
                    match msg {
                        Some(message) => {
                            if let Err(e) = Self::handle_outgoing_message(&mut sink, message).await {
                                break Err(e);
                            }
                        }
                        None => break Ok(()),
                    }
                }
                msg = stream.next() => {
                    match Self::handle_incoming_message(inner, msg, &mut sink).await {
                        Ok(FrameResult::Continue) => continue,
                        Ok(FrameResult::Break) => break Ok(()),
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        // Abandon anything still in flight: the response, if it ever comes,
        // belongs to a dead connection.
        inner.connected.store(false, Ordering::Release);
        inner.set_outgoing(None);
        inner.pending.clear();
        result
    }

    async fn handle_outgoing_message(
        sink: &mut futures_util::stream::SplitSink<
            tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
            Message,
        >,
        message: proto::ClientMessage,
    ) -> Result<()> {
        match bincode::serialize(&message) {
            Ok(data) => {
                sink.send(Message::Binary(data.into())).await?;
            }
            Err(e) => error!("Failed to serialize outgoing message: {}", e),
        }
        Ok(())
    }

    /// Incoming events are applied inline rather than spawned, so pushed
    /// batches reach the engine in wire order.
    async fn handle_incoming_message(
        inner: &Arc<Inner>,
        msg: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
        sink: &mut futures_util::stream::SplitSink<
            tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
            Message,
        >,
    ) -> Result<FrameResult> {
        match msg {
            Some(Ok(Message::Binary(data))) => match bincode::deserialize(&data) {
                Ok(proto::ServerMessage::Event(event)) => {
                    debug!("Received {}", event);
                    inner.engine.handle_event(event).await;
                    Ok(FrameResult::Continue)
                }
                Ok(proto::ServerMessage::Response(response)) => {
                    match inner.pending.remove(&response.request_id) {
                        Some((_, tx)) => {
                            let _ = tx.send(response);
                        }
                        None => warn!("Dropping unmatched {}", response),
                    }
                    Ok(FrameResult::Continue)
                }
                Err(e) => {
                    warn!("Failed to deserialize message: {}", e);
                    Ok(FrameResult::Continue)
                }
            },
            Some(Ok(Message::Close(_))) => {
                info!("WebSocket connection closed by server");
                Ok(FrameResult::Break)
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Err(e) = sink.send(Message::Pong(data)).await {
                    warn!("Failed to send pong: {}", e);
                    return Err(e.into());
                }
                Ok(FrameResult::Continue)
            }
            Some(Ok(Message::Pong(_))) => Ok(FrameResult::Continue),
            Some(Ok(Message::Text(text))) => {
                debug!("Received unexpected text message: {}", text);
                Ok(FrameResult::Continue)
            }
            Some(Ok(_)) => Ok(FrameResult::Continue),
            Some(Err(e)) => {
                error!("WebSocket error: {}", e);
                Err(e.into())
            }
            None => {
                info!("WebSocket stream closed");
                Ok(FrameResult::Break)
            }
        }
    }
}
