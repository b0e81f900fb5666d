mod common;

use std::sync::Arc;

use async_trait::async_trait;
use canopy::proto::*;
use canopy::{Client, CommandHandler, Engine, MemoryStore, RequestError, Store, TransportSelection, TransportError};
use canopy_core::codec;
use common::*;

/// Authority stub that answers every request the same way.
struct FixedHandler {
    error: CommandError,
    payload: Option<Vec<u8>>,
    event: Option<Event>,
    exposed: bool,
}

impl FixedHandler {
    fn ok(payload: Option<Vec<u8>>, event: Option<Event>) -> Arc<Self> {
        Arc::new(Self { error: CommandError::ok(), payload, event, exposed: true })
    }

    fn failing(code: i32, description: &str) -> Arc<Self> {
        Arc::new(Self {
            error: CommandError { code, description: description.to_string() },
            payload: None,
            event: None,
            exposed: true,
        })
    }
}

#[async_trait]
impl CommandHandler for FixedHandler {
    async fn handle(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        Ok(WireResponse {
            request_id: request.id,
            error: self.error.clone(),
            payload: self.payload.clone(),
            event: self.event.clone(),
        })
    }

    fn supports(&self, _kind: CommandKind) -> bool {
        self.exposed
    }
}

fn open(object_id: &str) -> CommandPayload {
    CommandPayload::ObjectOpen(ObjectOpenRequest { object_id: object_id.to_string() })
}

#[tokio::test]
async fn successful_command_decodes_typed_payload() -> anyhow::Result<()> {
    let engine = Arc::new(Engine::new(Arc::new(MemoryStore::new())));
    let payload = codec::encode_response(&ResponsePayload::ObjectOpen(ObjectOpenResponse { root_id: "root".into() }))?;
    let _client = Client::connect(engine.clone(), TransportSelection::Native(FixedHandler::ok(Some(payload), None)))?;

    let message = engine.request(open("obj")).await?;
    assert!(message.error.is_ok());
    let Some(ResponsePayload::ObjectOpen(res)) = message.payload else { panic!("expected objectOpen payload") };
    assert_eq!(res.root_id, "root");
    Ok(())
}

#[tokio::test]
async fn command_error_is_reported_exactly_once() -> anyhow::Result<()> {
    let recording = Recording::new();
    let engine = Arc::new(
        Engine::new(Arc::new(MemoryStore::new()))
            .with_error_reporter(recording.clone())
            .with_telemetry(recording.clone()),
    );
    let _client = Client::connect(engine.clone(), TransportSelection::Native(FixedHandler::failing(101, "object not found")))?;

    let err = engine.request(open("missing")).await.unwrap_err();
    let RequestError::Command { code, description, .. } = err else { panic!("expected command error") };
    assert_eq!(code, 101);
    assert_eq!(description, "object not found");

    assert_eq!(recording.error_count(), 1);
    assert_eq!(recording.event_names(), ["Error"]);
    Ok(())
}

#[tokio::test]
async fn unexposed_operation_fails_without_sending() -> anyhow::Result<()> {
    let engine = Arc::new(Engine::new(Arc::new(MemoryStore::new())));
    let handler = Arc::new(FixedHandler {
        error: CommandError::ok(),
        payload: None,
        event: None,
        exposed: false,
    });
    let _client = Client::connect(engine.clone(), TransportSelection::Native(handler))?;

    let err = engine.request(open("obj")).await.unwrap_err();
    assert!(matches!(err, RequestError::Unsupported(CommandKind::ObjectOpen)));
    Ok(())
}

#[tokio::test]
async fn embedded_event_lands_before_the_reply() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let event = add_event("ctx", text_block("created", "hello"));
    let _client = Client::connect(engine.clone(), TransportSelection::Native(FixedHandler::ok(None, Some(event))))?;

    let message = engine
        .request(CommandPayload::BlockCreate(BlockCreateRequest {
            context_id: "ctx".into(),
            target_id: "ctx".into(),
            position: CreatePosition::Bottom,
            block: text_block("created", "hello"),
        }))
        .await?;

    // The store mutation is visible the instant the caller gets the reply.
    assert!(store.get_leaf("ctx", "created").is_some());
    assert!(message.event.is_some());
    Ok(())
}

#[tokio::test]
async fn command_telemetry_carries_both_latency_phases() -> anyhow::Result<()> {
    let recording = Recording::new();
    let engine = Arc::new(Engine::new(Arc::new(MemoryStore::new())).with_telemetry(recording.clone()));
    let _client = Client::connect(engine.clone(), TransportSelection::Native(FixedHandler::ok(None, None)))?;

    engine.request(CommandPayload::ObjectClose(ObjectCloseRequest { object_id: "obj".into() })).await?;

    let events = recording.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let (name, attributes) = &events[0];
    assert_eq!(name, "objectClose");
    let keys: Vec<&str> = attributes.iter().map(|(k, _)| k.as_str()).collect();
    assert!(keys.contains(&"middleTime") && keys.contains(&"renderTime"));
    Ok(())
}
