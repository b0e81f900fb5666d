pub mod apply;
pub mod codec;
pub mod collab;
pub mod engine;
pub mod error;
pub mod order;
pub mod store;
pub mod structure;
pub mod transport;

pub use engine::{CommandMessage, Engine};
pub use error::RequestError;
pub use store::{MemoryStore, Store};
pub use transport::{Transport, TransportError};

pub use canopy_proto as proto;
