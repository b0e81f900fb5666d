//! # Canopy WebSocket Client
//!
//! A native (non-browser) WebSocket client for connecting a Canopy engine to
//! a remote authority that hosts a WebSocket server.
//!
//! ## Automatic reconnection
//!
//! Reconnects to the server if the connection is lost using exponential
//! backoff. Requests in flight when the connection drops are abandoned; their
//! callers get a transport error and the next attempt starts from a clean
//! slate.
//!
//! ## Graceful shutdown
//!
//! To shutdown the client, call the `shutdown` method. This will wait for the
//! connection to be closed and then return.

pub mod client;
pub mod transport;

pub use client::{ConnectionError, ConnectionState, WebsocketClient};

// Re-export common types for convenience
pub use tokio_tungstenite::tungstenite::Error as TungsteniteError;
