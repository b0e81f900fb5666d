use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{
    block::{Block, Mark},
    dataview::Record,
    event::Event,
};

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize, Hash, Default)]
pub struct RequestId(Ulid);

impl RequestId {
    pub fn new() -> Self { Self(Ulid::new()) }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id_str = self.0.to_string();
        write!(f, "R{}", &id_str[20..])
    }
}

/// The closed set of outbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    ObjectOpen,
    ObjectClose,
    ObjectSearch,
    BlockCreate,
    BlockSetText,
    BlockListDelete,
    ProcessCancel,
}

impl CommandKind {
    /// Wire/telemetry name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ObjectOpen => "objectOpen",
            Self::ObjectClose => "objectClose",
            Self::ObjectSearch => "objectSearch",
            Self::BlockCreate => "blockCreate",
            Self::BlockSetText => "blockSetText",
            Self::BlockListDelete => "blockListDelete",
            Self::ProcessCancel => "processCancel",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreatePosition {
    #[default]
    Bottom,
    Top,
    Inner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectOpenRequest {
    pub object_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCloseRequest {
    pub object_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSearchRequest {
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCreateRequest {
    pub context_id: String,
    pub target_id: String,
    pub position: CreatePosition,
    pub block: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetTextRequest {
    pub context_id: String,
    pub block_id: String,
    pub text: String,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockListDeleteRequest {
    pub context_id: String,
    pub block_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCancelRequest {
    pub process_id: String,
}

/// A typed outbound command; the kind is derived, never passed separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandPayload {
    ObjectOpen(ObjectOpenRequest),
    ObjectClose(ObjectCloseRequest),
    ObjectSearch(ObjectSearchRequest),
    BlockCreate(BlockCreateRequest),
    BlockSetText(BlockSetTextRequest),
    BlockListDelete(BlockListDeleteRequest),
    ProcessCancel(ProcessCancelRequest),
}

impl CommandPayload {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::ObjectOpen(_) => CommandKind::ObjectOpen,
            Self::ObjectClose(_) => CommandKind::ObjectClose,
            Self::ObjectSearch(_) => CommandKind::ObjectSearch,
            Self::BlockCreate(_) => CommandKind::BlockCreate,
            Self::BlockSetText(_) => CommandKind::BlockSetText,
            Self::BlockListDelete(_) => CommandKind::BlockListDelete,
            Self::ProcessCancel(_) => CommandKind::ProcessCancel,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectOpenResponse {
    pub root_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSearchResponse {
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCreateResponse {
    pub block_id: String,
}

/// Decoded kind-specific response payload. Kinds whose responses carry no
/// payload have no variant here; their responses decode to nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponsePayload {
    ObjectOpen(ObjectOpenResponse),
    ObjectSearch(ObjectSearchResponse),
    BlockCreate(BlockCreateResponse),
}

/// The structured error every response carries; code 0 means success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandError {
    pub code: i32,
    pub description: String,
}

impl CommandError {
    pub fn ok() -> Self { Self::default() }

    pub fn is_ok(&self) -> bool { self.code == 0 }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            write!(f, "ok")
        } else {
            write!(f, "code {}: {}", self.code, self.description)
        }
    }
}

/// One outbound command on the wire. The payload bytes are the encoded
/// kind-specific request struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub id: RequestId,
    pub kind: CommandKind,
    pub payload: Vec<u8>,
}

/// The authority's reply: a structured error, optional kind-specific payload
/// bytes, and an optional embedded event to run through the pipeline before
/// the caller sees the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub request_id: RequestId,
    pub error: CommandError,
    pub payload: Option<Vec<u8>>,
    pub event: Option<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    Request(WireRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    Event(Event),
    Response(WireResponse),
}

impl std::fmt::Display for WireRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Request {} {} {}b", self.id, self.kind, self.payload.len())
    }
}

impl std::fmt::Display for WireResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Response({}) {}{}",
            self.request_id,
            self.error,
            if self.event.is_some() { " +event" } else { "" }
        )
    }
}
