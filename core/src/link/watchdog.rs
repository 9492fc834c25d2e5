use crate::model::ConnectivityState;
use crate::prelude::STALE_AFTER_MS;

/// Period of the link health check, independent of the frame tick.
pub const WATCHDOG_PERIOD_MS: u64 = 1_200;

/// Derives the connectivity shown to the driver from frame arrival times.
///
/// While the last observation is fresh the display follows whatever the
/// frame reported; once it ages past the threshold the display is forced to
/// `Disconnected` regardless of the frame's own field.
#[derive(Debug, Clone)]
pub struct ConnectivityWatchdog {
    stale_after_ms: u64,
    last_frame_at: Option<u64>,
    reported: ConnectivityState,
    display: ConnectivityState,
}

impl ConnectivityWatchdog {
    pub fn new(stale_after_ms: u64) -> Self {
        Self {
            stale_after_ms,
            last_frame_at: None,
            reported: ConnectivityState::Disconnected,
            display: ConnectivityState::Disconnected,
        }
    }

    /// Records a frame arrival. Returns the new display state if it changed.
    pub fn observe(
        &mut self,
        reported: ConnectivityState,
        now_ms: u64,
    ) -> Option<ConnectivityState> {
        self.last_frame_at = Some(now_ms);
        self.reported = reported;
        self.refresh(now_ms)
    }

    /// Periodic health check. Returns the new display state if it changed.
    pub fn check(&mut self, now_ms: u64) -> Option<ConnectivityState> {
        self.refresh(now_ms)
    }

    pub fn is_stale(&self, now_ms: u64) -> bool {
        match self.last_frame_at {
            Some(at) => now_ms.saturating_sub(at) > self.stale_after_ms,
            None => true,
        }
    }

    pub fn display(&self) -> ConnectivityState {
        self.display
    }

    pub fn last_frame_at(&self) -> Option<u64> {
        self.last_frame_at
    }

    fn refresh(&mut self, now_ms: u64) -> Option<ConnectivityState> {
        let next = if self.is_stale(now_ms) {
            ConnectivityState::Disconnected
        } else {
            self.reported
        };
        if next == self.display {
            return None;
        }
        self.display = next;
        Some(next)
    }
}

impl Default for ConnectivityWatchdog {
    fn default() -> Self {
        Self::new(STALE_AFTER_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_without_frames() {
        let mut watchdog = ConnectivityWatchdog::default();
        assert_eq!(watchdog.display(), ConnectivityState::Disconnected);
        assert!(watchdog.is_stale(0));
        assert_eq!(watchdog.check(WATCHDOG_PERIOD_MS), None);
        assert_eq!(watchdog.last_frame_at(), None);
    }

    #[test]
    fn stale_link_overrides_frame_report() {
        let mut watchdog = ConnectivityWatchdog::default();
        assert_eq!(
            watchdog.observe(ConnectivityState::Connected, 1_000),
            Some(ConnectivityState::Connected)
        );
        // exactly at the threshold the link is still fresh
        assert_eq!(watchdog.check(3_000), None);
        assert_eq!(
            watchdog.check(3_001),
            Some(ConnectivityState::Disconnected)
        );
        assert_eq!(watchdog.check(4_200), None);
    }

    #[test]
    fn resumed_frames_restore_reported_state() {
        let mut watchdog = ConnectivityWatchdog::default();
        watchdog.observe(ConnectivityState::Connected, 0);
        watchdog.check(5_000);
        assert_eq!(watchdog.display(), ConnectivityState::Disconnected);

        assert_eq!(
            watchdog.observe(ConnectivityState::Connected, 5_080),
            Some(ConnectivityState::Connected)
        );
        assert_eq!(watchdog.check(6_000), None);
    }

    #[test]
    fn fresh_frames_show_their_own_state() {
        let mut watchdog = ConnectivityWatchdog::new(500);
        assert_eq!(
            watchdog.observe(ConnectivityState::Connecting, 100),
            Some(ConnectivityState::Connecting)
        );
        assert_eq!(
            watchdog.observe(ConnectivityState::Connected, 200),
            Some(ConnectivityState::Connected)
        );
        assert_eq!(watchdog.check(701), Some(ConnectivityState::Disconnected));
    }

    #[test]
    fn clock_stepping_backwards_is_not_stale() {
        let mut watchdog = ConnectivityWatchdog::default();
        watchdog.observe(ConnectivityState::Connected, 10_000);
        assert!(!watchdog.is_stale(9_000));
    }
}
