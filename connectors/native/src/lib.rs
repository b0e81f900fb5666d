//! In-process connector: commands go straight to an embedded authority, and
//! the authority pushes encoded event frames back over a channel.

use std::sync::Arc;

use async_trait::async_trait;
use canopy_core::{Engine, Transport, TransportError};
use canopy_proto as proto;
use tokio::sync::mpsc;
use tracing::error;

/// The embedded authority's command surface.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, request: proto::WireRequest) -> Result<proto::WireResponse, TransportError>;

    /// Whether this authority exposes an operation for the kind.
    fn supports(&self, _kind: proto::CommandKind) -> bool {
        true
    }
}

struct NativeTransport {
    handler: Arc<dyn CommandHandler>,
}

#[async_trait]
impl Transport for NativeTransport {
    fn supports(&self, kind: proto::CommandKind) -> bool {
        self.handler.supports(kind)
    }

    async fn call(&self, request: proto::WireRequest) -> Result<proto::WireResponse, TransportError> {
        self.handler.handle(request).await
    }
}

/// Push side handed to the authority: encoded [`proto::Event`] frames fed
/// here flow through the engine's pipeline in order.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl EventSender {
    pub fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.tx.send(frame).map_err(|_| TransportError::ConnectionClosed)
    }
}

/// Binds an engine to an in-process authority. Dropping the connection stops
/// event delivery.
pub struct NativeConnection {
    receiver_task: tokio::task::JoinHandle<()>,
}

impl NativeConnection {
    pub fn new(engine: Arc<Engine>, handler: Arc<dyn CommandHandler>) -> (Self, EventSender) {
        engine.attach_transport(Arc::new(NativeTransport { handler }));

        let (tx, rx) = mpsc::unbounded_channel();
        let receiver_task = Self::setup_receiver(engine, rx);
        (Self { receiver_task }, EventSender { tx })
    }

    fn setup_receiver(engine: Arc<Engine>, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                match bincode::deserialize::<proto::Event>(&frame) {
                    Ok(event) => engine.handle_event(event).await,
                    Err(err) => error!(%err, "dropping undecodable event frame"),
                }
            }
        })
    }
}

impl Drop for NativeConnection {
    fn drop(&mut self) {
        self.receiver_task.abort();
    }
}
