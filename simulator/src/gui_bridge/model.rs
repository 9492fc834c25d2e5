use kartcore::diagnostics::MetricsSnapshot;
use kartcore::model::{Alert, ConnectivityState, GpsFixState, PageId};
use kartcore::{Console, ConsoleEvent};
use serde::{Deserialize, Serialize};

/// Dashboard snapshot served to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardModel {
    pub speed_kmh: f64,
    pub power_kw: f64,
    pub battery_percent: u8,
    pub reverse: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub heading_deg: f64,
    pub fix_state: GpsFixState,
    /// What the source claims about its own link.
    pub reported_link: ConnectivityState,
    /// What the driver sees, after the watchdog.
    pub link: ConnectivityState,
    pub banner: Option<Alert>,
    /// Every alert seen so far, acknowledged ones included.
    pub active_alerts: Vec<Alert>,
    pub page: PageId,
    /// Receipt time of the latest frame, the clock the watchdog ages.
    pub last_frame_at: Option<u64>,
    pub metrics: MetricsSnapshot,
}

impl DashboardModel {
    pub fn new(page: PageId) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: &ConsoleEvent) {
        match event {
            ConsoleEvent::FrameUpdated(frame) => {
                self.speed_kmh = frame.speed_kmh;
                self.power_kw = frame.power_kw();
                self.battery_percent = frame.battery_percent;
                self.reverse = frame.reverse;
                self.latitude = frame.gps.latitude;
                self.longitude = frame.gps.longitude;
                self.heading_deg = frame.gps.heading_deg;
                self.fix_state = frame.gps.fix_state;
                self.reported_link = frame.connectivity;
            }
            ConsoleEvent::BannerChanged(banner) => self.banner = banner.clone(),
            ConsoleEvent::ConnectivityChanged(state) => self.link = *state,
            ConsoleEvent::NavigationForced(page) | ConsoleEvent::PageChanged(page) => {
                self.page = *page
            }
        }
    }

    /// Copies the console state that events do not carry.
    pub fn sync(&mut self, console: &Console) {
        self.metrics = console.metrics();
        self.last_frame_at = console.last_frame_at();
        self.active_alerts = console.alerts().active().cloned().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kartcore::source::TelemetrySimulator;

    #[test]
    fn frame_and_link_events_are_kept_apart() {
        let mut model = DashboardModel::new(PageId::Home);
        let frame = TelemetrySimulator::default().tick(80);
        model.apply(&ConsoleEvent::FrameUpdated(frame.clone()));
        model.apply(&ConsoleEvent::ConnectivityChanged(
            ConnectivityState::Disconnected,
        ));
        model.apply(&ConsoleEvent::NavigationForced(PageId::Camera));

        assert_eq!(model.reported_link, ConnectivityState::Connected);
        assert_eq!(model.link, ConnectivityState::Disconnected);
        assert_eq!(model.page, PageId::Camera);
        assert_eq!(model.last_frame_at, None);
        assert!((model.power_kw - frame.speed_kmh * 0.8).abs() < 1e-9);
    }

    #[test]
    fn sync_uses_receipt_time_and_lists_alerts() {
        let mut console = Console::default();
        let frame = TelemetrySimulator::default().tick(5);
        console.handle_frame(frame, 640);
        console.acknowledge("overheat");

        let mut model = DashboardModel::new(PageId::Home);
        model.sync(&console);
        assert_eq!(model.last_frame_at, Some(640));
        assert_eq!(model.metrics.frames, 1);
        assert_eq!(model.active_alerts.len(), 1);
        assert_eq!(model.active_alerts[0].alert_id, "overheat");
    }
}
