//! # Canopy
//!
//! A client-side state synchronization engine: authority-pushed event batches
//! are classified, structurally linked, ordered and applied to a pluggable
//! store, while typed commands travel the other way over an in-process or
//! websocket transport.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use canopy::{Client, Engine, MemoryStore, TransportSelection};
//! use canopy::proto::{CommandPayload, ObjectOpenRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let engine = Arc::new(Engine::new(store));
//!     let client = Client::connect(engine.clone(), TransportSelection::Websocket("ws://localhost:8080".into()))?;
//!
//!     let opened = engine
//!         .request(CommandPayload::ObjectOpen(ObjectOpenRequest { object_id: "obj".into() }))
//!         .await?;
//!     println!("opened: {:?}", opened.payload);
//!
//!     client.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub use canopy_core::{
    collab::{ErrorReporter, Noop, ProgressSink, Telemetry},
    CommandMessage, Engine, MemoryStore, RequestError, Store, Transport, TransportError,
};
pub use canopy_proto as proto;

pub use canopy_connector_native::{CommandHandler, EventSender, NativeConnection};
pub use canopy_websocket_client::{ConnectionError, ConnectionState, WebsocketClient};

/// Which channel carries commands and events for this session.
pub enum TransportSelection {
    /// An authority embedded in this process.
    Native(Arc<dyn CommandHandler>),
    /// A remote authority behind a websocket server at the given url.
    Websocket(String),
}

enum Connection {
    Native { _connection: NativeConnection, events: EventSender },
    Websocket(WebsocketClient),
}

/// A connected session: the engine plus whichever connector the selection
/// produced.
pub struct Client {
    connection: Connection,
}

impl Client {
    pub fn connect(engine: Arc<Engine>, selection: TransportSelection) -> anyhow::Result<Self> {
        let connection = match selection {
            TransportSelection::Native(handler) => {
                tracing::info!("Connecting to in-process authority");
                let (connection, events) = NativeConnection::new(engine, handler);
                Connection::Native { _connection: connection, events }
            }
            TransportSelection::Websocket(url) => Connection::Websocket(WebsocketClient::new(engine, &url)?),
        };
        Ok(Self { connection })
    }

    /// The push side of a native connection, for the embedded authority to
    /// feed encoded event frames into.
    pub fn event_sender(&self) -> Option<EventSender> {
        match &self.connection {
            Connection::Native { events, .. } => Some(events.clone()),
            Connection::Websocket(_) => None,
        }
    }

    /// Wait until a websocket selection has an open connection. Native
    /// connections are usable immediately.
    pub async fn wait_connected(&self) -> Result<(), ConnectionError> {
        match &self.connection {
            Connection::Native { .. } => Ok(()),
            Connection::Websocket(client) => client.wait_connected().await,
        }
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        match self.connection {
            Connection::Native { .. } => Ok(()),
            Connection::Websocket(client) => client.shutdown().await,
        }
    }
}
