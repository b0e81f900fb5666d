use async_trait::async_trait;
use canopy_core::{Transport, TransportError};
use canopy_proto as proto;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

use crate::client::Inner;

/// Transport over the websocket connection loop. Each call registers a
/// pending slot keyed by request id and waits for the reader task to route
/// the matching response back.
pub struct WebsocketTransport {
    pub(crate) inner: Arc<Inner>,
}

#[async_trait]
impl Transport for WebsocketTransport {
    async fn call(&self, request: proto::WireRequest) -> Result<proto::WireResponse, TransportError> {
        let id = request.id.clone();
        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(id.clone(), tx);
        debug!("Queuing {}", request);

        let sender = self.inner.outgoing_sender();
        let Some(sender) = sender else {
            self.inner.pending.remove(&id);
            return Err(TransportError::ConnectionClosed);
        };
        if sender.send(proto::ClientMessage::Request(request)).is_err() {
            self.inner.pending.remove(&id);
            return Err(TransportError::ConnectionClosed);
        }

        // The pending slot is dropped when the connection dies; the closed
        // oneshot surfaces as an abandoned request.
        rx.await.map_err(|_| TransportError::NoResponse)
    }
}
