use std::sync::{Arc, Mutex};
use std::time::Duration;

use canopy::proto;
use canopy::{ErrorReporter, Telemetry};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
}

#[allow(unused)]
pub fn text_block(id: &str, text: &str) -> proto::Block {
    proto::Block::new(
        id,
        proto::BlockContent::Text(proto::TextContent { text: text.to_string(), ..Default::default() }),
    )
}

#[allow(unused)]
pub fn add_event(context_id: &str, block: proto::Block) -> proto::Event {
    proto::Event::new(context_id, vec![proto::Message::BlockAdd(proto::BlockAdd { blocks: vec![block] })])
}

/// Poll until the condition holds or a few seconds pass.
#[allow(unused)]
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Records everything the engine reports outward.
#[derive(Default)]
pub struct Recording {
    pub errors: Mutex<Vec<String>>,
    pub events: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

#[allow(unused)]
impl Recording {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl ErrorReporter for Recording {
    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

impl Telemetry for Recording {
    fn record_event(&self, name: &str, attributes: &[(&str, String)]) {
        self.events
            .lock()
            .unwrap()
            .push((name.to_string(), attributes.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()));
    }
}
