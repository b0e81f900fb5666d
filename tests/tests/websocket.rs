mod common;

use std::sync::Arc;

use canopy::proto::*;
use canopy::{Engine, MemoryStore, RequestError, Store, TransportError};
use canopy_core::codec;
use canopy_websocket_client::WebsocketClient;
use common::*;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

async fn bind() -> anyhow::Result<(TcpListener, String)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}", listener.local_addr()?);
    Ok((listener, url))
}

fn frame(message: &ServerMessage) -> Message {
    Message::Binary(bincode::serialize(message).unwrap().into())
}

#[tokio::test]
async fn command_round_trip() -> anyhow::Result<()> {
    let (listener, url) = bind().await?;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Binary(data) = msg {
                let ClientMessage::Request(request) = bincode::deserialize(&data).unwrap();
                let payload = codec::encode_response(&ResponsePayload::ObjectOpen(ObjectOpenResponse {
                    root_id: "root".into(),
                }))
                .unwrap();
                let response = ServerMessage::Response(WireResponse {
                    request_id: request.id,
                    error: CommandError::ok(),
                    payload: Some(payload),
                    event: None,
                });
                ws.send(frame(&response)).await.unwrap();
            }
        }
    });

    let engine = Arc::new(Engine::new(Arc::new(MemoryStore::new())));
    let client = WebsocketClient::new(engine.clone(), &url)?;
    client.wait_connected().await?;

    let message = engine
        .request(CommandPayload::ObjectOpen(ObjectOpenRequest { object_id: "obj".into() }))
        .await?;
    let Some(ResponsePayload::ObjectOpen(res)) = message.payload else { panic!("expected objectOpen payload") };
    assert_eq!(res.root_id, "root");

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn pushed_events_apply_in_wire_order() -> anyhow::Result<()> {
    let (listener, url) = bind().await?;
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(frame(&ServerMessage::Event(add_event("ctx", text_block("a", "before"))))).await.unwrap();
        let edit = Event::new(
            "ctx",
            vec![canopy::proto::Message::BlockSetText(BlockSetText {
                id: "a".into(),
                text: Some("after".into()),
                marks: None,
                style: None,
                checked: None,
                color: None,
            })],
        );
        ws.send(frame(&ServerMessage::Event(edit))).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let client = WebsocketClient::new(engine, &url)?;
    client.wait_connected().await?;

    assert!(
        wait_for(|| {
            store
                .get_leaf("ctx", "a")
                .map(|b| matches!(&b.content, BlockContent::Text(t) if t.text == "after"))
                .unwrap_or(false)
        })
        .await,
        "the edit depends on the add landing first"
    );

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn reconnects_after_server_close_and_keeps_state() -> anyhow::Result<()> {
    let (listener, url) = bind().await?;
    tokio::spawn(async move {
        // First connection pushes one event and hangs up.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(frame(&ServerMessage::Event(add_event("ctx", text_block("first", ""))))).await.unwrap();
        ws.close(None).await.unwrap();

        // The client comes back on its own; push another event.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(frame(&ServerMessage::Event(add_event("ctx", text_block("second", ""))))).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(Engine::new(store.clone()));
    let client = WebsocketClient::new(engine, &url)?;

    assert!(wait_for(|| store.get_leaf("ctx", "first").is_some()).await);
    assert!(wait_for(|| store.get_leaf("ctx", "second").is_some()).await);
    // Nothing applied before the drop was lost.
    assert!(store.get_leaf("ctx", "first").is_some());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn in_flight_request_is_abandoned_on_disconnect() -> anyhow::Result<()> {
    let (listener, url) = bind().await?;
    tokio::spawn(async move {
        // Take the request, answer nothing, hang up.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        drop(ws);

        // Accept the reconnect so the loop settles.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let engine = Arc::new(Engine::new(Arc::new(MemoryStore::new())));
    let client = WebsocketClient::new(engine.clone(), &url)?;
    client.wait_connected().await?;

    let err = engine
        .request(CommandPayload::ObjectOpen(ObjectOpenRequest { object_id: "obj".into() }))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport(TransportError::NoResponse)));

    client.shutdown().await?;
    Ok(())
}
