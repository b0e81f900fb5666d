//! The synchronization engine: owns the store seam, runs pushed and embedded
//! event batches through the pipeline, and dispatches typed commands over
//! whatever transport is attached.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use canopy_proto::{CommandError, CommandPayload, Event, RequestId, ResponsePayload, WireRequest};
use tracing::{debug, error, warn};

use crate::apply::Applier;
use crate::codec;
use crate::collab::{ErrorReporter, Noop, ProgressSink, Telemetry};
use crate::error::RequestError;
use crate::order::order_batch;
use crate::store::Store;
use crate::structure::StructuralIndex;
use crate::transport::Transport;

/// A completed command: the structured (successful) error, the decoded
/// kind-specific payload if the kind has one, and the embedded event that was
/// already applied before the caller saw this.
#[derive(Debug)]
pub struct CommandMessage {
    pub error: CommandError,
    pub payload: Option<ResponsePayload>,
    pub event: Option<Event>,
}

pub struct Engine {
    store: Arc<dyn Store>,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    error_reporter: Arc<dyn ErrorReporter>,
    telemetry: Arc<dyn Telemetry>,
    progress: Arc<dyn ProgressSink>,
    /// Serializes batch application; pushed and embedded events never
    /// interleave mid-batch.
    apply_gate: tokio::sync::Mutex<()>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            transport: RwLock::new(None),
            error_reporter: Arc::new(Noop),
            telemetry: Arc::new(Noop),
            progress: Arc::new(Noop),
            apply_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Connectors call this once their channel is usable. Replaces any
    /// previously attached transport.
    pub fn attach_transport(&self, transport: Arc<dyn Transport>) {
        *self.transport.write().unwrap_or_else(|e| e.into_inner()) = Some(transport);
    }

    fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Entry point for events pushed by the authority.
    pub async fn handle_event(&self, event: Event) {
        self.apply_event(event, false).await;
    }

    async fn apply_event(&self, event: Event, embedded: bool) {
        let _gate = self.apply_gate.lock().await;
        if !embedded {
            // Embedded events are logged once with their carrying response.
            for message in &event.messages {
                debug!(context = %event.context_id, kind = %message.kind(), "event");
            }
        }
        let Event { context_id, mut messages } = event;
        let index = StructuralIndex::build(&messages);
        order_batch(&mut messages);
        Applier::new(self.store.as_ref(), self.progress.as_ref()).apply_batch(&context_id, &messages, &index);
    }

    /// Send one typed command and wait for its outcome. The embedded event,
    /// if any, is fully applied before this resolves.
    pub async fn request(&self, payload: CommandPayload) -> Result<CommandMessage, RequestError> {
        let kind = payload.kind();
        let Some(transport) = self.transport() else {
            return Err(RequestError::NoTransport);
        };
        if !transport.supports(kind) {
            error!(%kind, "command kind not exposed by transport");
            return Err(RequestError::Unsupported(kind));
        }

        let issued = Instant::now();
        let bytes = codec::encode_request(&payload).map_err(|source| RequestError::Encode { kind, source })?;
        let request = WireRequest { id: RequestId::new(), kind, payload: bytes };
        debug!(%request, "sending");

        let response = transport.call(request).await.map_err(|err| {
            warn!(%kind, %err, "request abandoned");
            err
        })?;
        let returned = Instant::now();

        // The embedded event rides along whether or not the command itself
        // failed; it must land before the caller learns the outcome.
        if let Some(event) = response.event.clone() {
            self.apply_event(event, true).await;
        }

        if !response.error.is_ok() {
            let CommandError { code, description } = response.error;
            error!(%kind, code, %description, "command failed");
            self.error_reporter.report_error(&format!("{kind}: {description}"));
            self.telemetry
                .record_event("Error", &[("cmd", kind.name().to_string()), ("code", code.to_string())]);
            return Err(RequestError::Command { kind, code, description });
        }

        let payload = match &response.payload {
            Some(bytes) => {
                codec::decode_response(kind, bytes).map_err(|source| RequestError::Decode { kind, source })?
            }
            None => None,
        };
        let completed = Instant::now();

        let middle_ms = returned.duration_since(issued).as_millis();
        let render_ms = completed.duration_since(returned).as_millis();
        debug!(%response, middle_ms, render_ms, "completed");
        self.telemetry.record_event(
            kind.name(),
            &[("middleTime", middle_ms.to_string()), ("renderTime", render_ms.to_string())],
        );

        Ok(CommandMessage { error: response.error, payload, event: response.event })
    }
}
