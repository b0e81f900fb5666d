use canopy_proto::CommandKind;
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum RequestError {
    /// No transport attached yet; a programmer error, not a runtime condition.
    #[error("no transport attached")]
    NoTransport,
    /// The active transport exposes no operation for this kind; also a
    /// programmer error.
    #[error("transport does not support {0}")]
    Unsupported(CommandKind),
    /// The call produced no response at all. The request is abandoned; this
    /// is not reported to the error/telemetry collaborators.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    /// The authority answered with a non-zero structured error code.
    #[error("{kind} failed, code {code}: {description}")]
    Command { kind: CommandKind, code: i32, description: String },
    #[error("failed to encode {kind} request: {source}")]
    Encode { kind: CommandKind, source: bincode::Error },
    #[error("failed to decode {kind} response: {source}")]
    Decode { kind: CommandKind, source: bincode::Error },
}
