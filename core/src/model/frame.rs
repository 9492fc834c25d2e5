use crate::model::Alert;
use crate::prelude::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link state, either self-reported by a source or derived by the watchdog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectivityState::Disconnected => "DISCONNECTED",
            ConnectivityState::Connecting => "CONNECTING",
            ConnectivityState::Connected => "CONNECTED",
        };
        f.write_str(label)
    }
}

/// GPS lock quality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GpsFixState {
    #[default]
    NoFix,
    #[serde(rename = "fix_2d")]
    Fix2d,
    #[serde(rename = "fix_3d")]
    Fix3d,
}

impl fmt::Display for GpsFixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GpsFixState::NoFix => "NO FIX",
            GpsFixState::Fix2d => "FIX 2D",
            GpsFixState::Fix3d => "FIX 3D",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GpsData {
    pub latitude: f64,
    pub longitude: f64,
    pub heading_deg: f64,
    pub fix_state: GpsFixState,
}

/// One telemetry snapshot. Timestamps are milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryFrame {
    pub speed_kmh: f64,
    pub battery_percent: u8,
    pub reverse: bool,
    pub connectivity: ConnectivityState,
    pub gps: GpsData,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    pub timestamp: u64,
}

impl TelemetryFrame {
    /// Drive power shown next to the speed read-out.
    pub fn power_kw(&self) -> f64 {
        self.speed_kmh * 0.8
    }

    /// Checks the ranges of a frame that did not come from the simulator.
    pub fn validate(&self) -> SourceResult<()> {
        if !self.speed_kmh.is_finite() || self.speed_kmh < 0.0 {
            return Err(SourceError::InvalidFrame(format!(
                "speed {} km/h out of range",
                self.speed_kmh
            )));
        }
        if self.battery_percent > 100 {
            return Err(SourceError::InvalidFrame(format!(
                "battery {}% out of range",
                self.battery_percent
            )));
        }
        let heading = self.gps.heading_deg;
        if !heading.is_finite() || !(0.0..360.0).contains(&heading) {
            return Err(SourceError::InvalidFrame(format!(
                "heading {} out of range",
                heading
            )));
        }
        if !(-90.0..=90.0).contains(&self.gps.latitude)
            || !(-180.0..=180.0).contains(&self.gps.longitude)
        {
            return Err(SourceError::InvalidFrame(format!(
                "position {}, {} out of range",
                self.gps.latitude, self.gps.longitude
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> TelemetryFrame {
        TelemetryFrame {
            speed_kmh: 30.0,
            battery_percent: 80,
            reverse: false,
            connectivity: ConnectivityState::Connected,
            gps: GpsData {
                latitude: 37.7749,
                longitude: -122.4194,
                heading_deg: 12.0,
                fix_state: GpsFixState::Fix3d,
            },
            alerts: Vec::new(),
            timestamp: 1_000,
        }
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(frame().validate().is_ok());

        let mut bad = frame();
        bad.battery_percent = 150;
        assert!(matches!(bad.validate(), Err(SourceError::InvalidFrame(_))));

        let mut bad = frame();
        bad.gps.heading_deg = 360.0;
        assert!(bad.validate().is_err());

        let mut bad = frame();
        bad.speed_kmh = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn frame_json_uses_snake_case_states() {
        let value = serde_json::to_value(frame()).unwrap();
        assert_eq!(value["connectivity"], "connected");
        assert_eq!(value["gps"]["fix_state"], "fix_3d");
    }

    #[test]
    fn frame_without_alerts_field_parses() {
        let json = r#"{
            "speed_kmh": 12.5,
            "battery_percent": 64,
            "reverse": true,
            "connectivity": "connecting",
            "gps": {"latitude": 1.0, "longitude": 2.0, "heading_deg": 90.0, "fix_state": "fix_2d"},
            "timestamp": 42
        }"#;
        let parsed: TelemetryFrame = serde_json::from_str(json).unwrap();
        assert!(parsed.alerts.is_empty());
        assert_eq!(parsed.gps.fix_state, GpsFixState::Fix2d);
        assert_eq!(parsed.connectivity, ConnectivityState::Connecting);
    }

    #[test]
    fn power_tracks_speed() {
        assert!((frame().power_kw() - 24.0).abs() < 1e-9);
    }
}
