use crate::model::{PageId, TelemetryFrame};
use serde::{Deserialize, Serialize};

/// Default staleness threshold before the link is shown as disconnected.
pub const STALE_AFTER_MS: u64 = 2_000;

/// Shared configuration for the console consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSettings {
    pub stale_after_ms: u64,
    pub default_page: PageId,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            stale_after_ms: STALE_AFTER_MS,
            default_page: PageId::Home,
        }
    }
}

/// Common error type for telemetry sources.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("source disconnected: {0}")]
    Disconnected(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Capability shared by every provider of telemetry frames.
///
/// Consumers only ever see this trait; whether frames are synthesised or
/// received from the outside is decided when the source is built.
pub trait TelemetrySource {
    fn name(&self) -> &'static str;
    fn start(&mut self) -> SourceResult<()>;
    /// Returns the next frame, or `None` when nothing is available. A stopped
    /// source never yields frames.
    fn poll_frame(&mut self, now_ms: u64) -> SourceResult<Option<TelemetryFrame>>;
    /// Everything available for one frame slot, oldest first. Sources that
    /// buffer external frames hand out their whole backlog.
    fn poll_batch(&mut self, now_ms: u64) -> SourceResult<Vec<TelemetryFrame>> {
        Ok(self.poll_frame(now_ms)?.into_iter().collect())
    }
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}
