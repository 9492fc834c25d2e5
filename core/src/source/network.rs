use crate::model::TelemetryFrame;
use crate::prelude::{SourceError, SourceResult, TelemetrySource};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Producer half feeding frames into a [`NetworkSource`].
#[derive(Debug, Clone)]
pub struct FrameSender {
    inner: UnboundedSender<TelemetryFrame>,
}

impl FrameSender {
    /// Validates and queues a frame.
    pub fn send(&self, frame: TelemetryFrame) -> SourceResult<()> {
        frame.validate()?;
        self.inner
            .send(frame)
            .map_err(|_| SourceError::Disconnected("network source dropped".into()))
    }

    /// Parses a JSON encoded frame and queues it.
    pub fn send_json(&self, payload: &str) -> SourceResult<()> {
        let frame: TelemetryFrame = serde_json::from_str(payload)
            .map_err(|err| SourceError::InvalidFrame(err.to_string()))?;
        self.send(frame)
    }
}

/// Source variant fed by an external producer (HTTP bridge, socket reader).
///
/// Frames are handed out in arrival order. [`TelemetrySource::poll_batch`]
/// drains the whole queue so a burst never outlives its slot.
#[derive(Debug)]
pub struct NetworkSource {
    receiver: UnboundedReceiver<TelemetryFrame>,
    running: bool,
}

impl NetworkSource {
    pub fn channel() -> (FrameSender, NetworkSource) {
        let (inner, receiver) = mpsc::unbounded_channel();
        (
            FrameSender { inner },
            NetworkSource {
                receiver,
                running: false,
            },
        )
    }
}

impl TelemetrySource for NetworkSource {
    fn name(&self) -> &'static str {
        "network"
    }

    fn start(&mut self) -> SourceResult<()> {
        self.running = true;
        Ok(())
    }

    fn poll_frame(&mut self, _now_ms: u64) -> SourceResult<Option<TelemetryFrame>> {
        if !self.running {
            return Ok(None);
        }
        match self.receiver.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SourceError::Disconnected(
                "all frame senders dropped".into(),
            )),
        }
    }

    fn poll_batch(&mut self, now_ms: u64) -> SourceResult<Vec<TelemetryFrame>> {
        let mut frames = Vec::new();
        loop {
            match self.poll_frame(now_ms) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => return Ok(frames),
                // Senders went away mid-drain; the next slot reports it.
                Err(_) if !frames.is_empty() => return Ok(frames),
                Err(err) => return Err(err),
            }
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
