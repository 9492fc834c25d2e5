//! Single consumer applying frames, watchdog runs and driver commands to the
//! dashboard state.

use crate::alerts::AlertManager;
use crate::diagnostics::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::link::ConnectivityWatchdog;
use crate::model::{Alert, ConnectivityState, PageId, TelemetryFrame};
use crate::prelude::ConsoleSettings;
use crate::routing::{PageRouter, RoutingReactor};

/// Notifications for the presentation layer, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    FrameUpdated(TelemetryFrame),
    BannerChanged(Option<Alert>),
    ConnectivityChanged(ConnectivityState),
    NavigationForced(PageId),
    PageChanged(PageId),
}

pub struct Console {
    alerts: AlertManager,
    watchdog: ConnectivityWatchdog,
    reactor: RoutingReactor,
    router: PageRouter,
    banner: Option<Alert>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Console {
    pub fn new(settings: &ConsoleSettings) -> Self {
        Self {
            alerts: AlertManager::new(),
            watchdog: ConnectivityWatchdog::new(settings.stale_after_ms),
            reactor: RoutingReactor::new(),
            router: PageRouter::new(settings.default_page),
            banner: None,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("console"),
        }
    }

    /// Applies one frame. The frame itself is handed back last, after the
    /// alert and routing effects it caused.
    pub fn handle_frame(&mut self, frame: TelemetryFrame, now_ms: u64) -> Vec<ConsoleEvent> {
        let mut events = Vec::new();
        self.metrics.record_frame(frame.alerts.len());
        self.logger.trace(&format!(
            "frame ts={} speed={:.1} battery={}% alerts={}",
            frame.timestamp,
            frame.speed_kmh,
            frame.battery_percent,
            frame.alerts.len()
        ));

        if let Some(state) = self.watchdog.observe(frame.connectivity, now_ms) {
            self.logger.record(&format!("link {}", state));
            events.push(ConsoleEvent::ConnectivityChanged(state));
        }

        if !frame.alerts.is_empty() {
            self.alerts.ingest(frame.alerts.iter().cloned());
            events.extend(self.refresh_banner());
        }

        if let Some(page) = self.reactor.decide(&frame, self.router.current()) {
            if self.router.navigate(page) {
                self.metrics.record_forced_navigation();
                self.logger.record(&format!("reverse engaged, forcing {}", page));
                events.push(ConsoleEvent::NavigationForced(page));
            }
        }

        events.push(ConsoleEvent::FrameUpdated(frame));
        events
    }

    /// Watchdog run, independent of frame cadence.
    pub fn check_link(&mut self, now_ms: u64) -> Vec<ConsoleEvent> {
        match self.watchdog.check(now_ms) {
            Some(state) => {
                if state == ConnectivityState::Disconnected {
                    self.metrics.record_link_drop();
                    self.logger.warn(&format!(
                        "no frame since {:?}, link shown as {}",
                        self.watchdog.last_frame_at(),
                        state
                    ));
                } else {
                    self.logger.record(&format!("link {}", state));
                }
                vec![ConsoleEvent::ConnectivityChanged(state)]
            }
            None => Vec::new(),
        }
    }

    /// Driver dismissed an alert.
    pub fn acknowledge(&mut self, alert_id: &str) -> Vec<ConsoleEvent> {
        self.alerts.acknowledge(alert_id);
        self.logger.record(&format!("alert {} acknowledged", alert_id));
        self.refresh_banner().into_iter().collect()
    }

    /// Driver picked a page.
    pub fn navigate(&mut self, page: PageId) -> Vec<ConsoleEvent> {
        if self.router.navigate(page) {
            vec![ConsoleEvent::PageChanged(page)]
        } else {
            Vec::new()
        }
    }

    pub fn record_source_error(&self, message: &str) {
        self.metrics.record_source_error();
        self.logger.warn(message);
    }

    pub fn banner_alert(&self) -> Option<&Alert> {
        self.banner.as_ref()
    }

    pub fn display_connectivity(&self) -> ConnectivityState {
        self.watchdog.display()
    }

    pub fn current_page(&self) -> PageId {
        self.router.current()
    }

    /// Receipt time of the latest frame, as the watchdog measures it.
    pub fn last_frame_at(&self) -> Option<u64> {
        self.watchdog.last_frame_at()
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn refresh_banner(&mut self) -> Option<ConsoleEvent> {
        let next = self.alerts.banner_alert().cloned();
        if next == self.banner {
            return None;
        }
        if let Some(alert) = next.as_ref() {
            self.logger
                .record(&format!("banner {} ({})", alert.alert_id, alert.level));
        }
        self.banner = next.clone();
        Some(ConsoleEvent::BannerChanged(next))
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(&ConsoleSettings::default())
    }
}
