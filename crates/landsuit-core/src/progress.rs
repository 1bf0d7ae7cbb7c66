//! Human-readable progress reporting at pipeline stage boundaries.

/// Receives one message per stage boundary. Informational only.
pub trait ProgressSink: Send + Sync {
    fn message(&self, msg: &str);
}

/// Forwards progress to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn message(&self, msg: &str) {
        tracing::info!("{msg}");
    }
}
