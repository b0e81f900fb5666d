use async_trait::async_trait;
use canopy_proto::{CommandKind, WireRequest, WireResponse};

/// The active channel to the authority process. Implementations must behave
/// identically to callers whether they bridge in-process or over the network.
///
/// Pushed events do not flow through this trait; connectors feed them to
/// [`crate::Engine::handle_event`] directly.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the channel exposes an operation for this command kind.
    fn supports(&self, _kind: CommandKind) -> bool { true }

    async fn call(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("no response")]
    NoResponse,
    #[error("send failed: {0}")]
    Send(String),
}
