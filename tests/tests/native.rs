mod common;

use std::sync::Arc;

use async_trait::async_trait;
use canopy::proto::*;
use canopy::{Client, CommandHandler, Engine, MemoryStore, Store, TransportSelection, TransportError};
use common::*;

/// Authority stub that only acknowledges.
struct AckHandler;

#[async_trait]
impl CommandHandler for AckHandler {
    async fn handle(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        Ok(WireResponse { request_id: request.id, error: CommandError::ok(), payload: None, event: None })
    }
}

#[tokio::test]
async fn pushed_frame_flows_through_the_pipeline() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let client = Client::connect(engine, TransportSelection::Native(Arc::new(AckHandler)))?;
    let events = client.event_sender().expect("native connections expose a push side");

    // A batch whose structural declaration arrives after the add still links.
    let event = Event::new(
        "ctx",
        vec![
            Message::BlockAdd(BlockAdd { blocks: vec![text_block("child", "hi")] }),
            Message::BlockSetChildrenIds(BlockSetChildrenIds { id: "ctx".into(), children_ids: vec!["child".into()] }),
        ],
    );
    events.send(bincode::serialize(&event)?)?;

    assert!(wait_for(|| store.get_leaf("ctx", "child").is_some()).await);
    assert_eq!(store.get_leaf("ctx", "child").map(|b| b.parent_id), Some("ctx".into()));
    Ok(())
}

#[tokio::test]
async fn corrupt_frame_is_dropped_without_poisoning_the_stream() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let client = Client::connect(engine, TransportSelection::Native(Arc::new(AckHandler)))?;
    let events = client.event_sender().unwrap();

    events.send(vec![0xde, 0xad, 0xbe, 0xef])?;
    events.send(bincode::serialize(&add_event("ctx", text_block("a", "still works")))?)?;

    assert!(wait_for(|| store.get_leaf("ctx", "a").is_some()).await);
    assert_eq!(store.block_count("ctx"), 1);
    Ok(())
}

#[tokio::test]
async fn dropping_the_connection_stops_delivery() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let client = Client::connect(engine, TransportSelection::Native(Arc::new(AckHandler)))?;
    let events = client.event_sender().unwrap();
    drop(client);

    // The receiver task is gone; sends fail instead of queueing forever.
    assert!(wait_for(|| events.send(vec![1, 2, 3]).is_err()).await);
    assert_eq!(store.block_count("ctx"), 0);
    Ok(())
}
