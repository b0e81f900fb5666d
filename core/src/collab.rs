use canopy_proto::ProgressUpdate;

/// External error-reporting collaborator (a Sentry-like sink in production).
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, message: &str);
}

/// External telemetry collaborator. Attributes are flat name/value pairs.
pub trait Telemetry: Send + Sync {
    fn record_event(&self, name: &str, attributes: &[(&str, String)]);
}

/// Consumer of process progress (the UI's progress indicator in production).
pub trait ProgressSink: Send + Sync {
    fn progress_set(&self, progress: ProgressUpdate);
    fn progress_clear(&self);
}

/// Default collaborator that swallows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl ErrorReporter for Noop {
    fn report_error(&self, _message: &str) {}
}

impl Telemetry for Noop {
    fn record_event(&self, _name: &str, _attributes: &[(&str, String)]) {}
}

impl ProgressSink for Noop {
    fn progress_set(&self, _progress: ProgressUpdate) {}
    fn progress_clear(&self) {}
}
