use crate::model::{
    Alert, AlertLevel, ConnectivityState, GpsData, GpsFixState, TelemetryFrame,
};
use crate::prelude::{SourceResult, TelemetrySource};
use serde::{Deserialize, Serialize};

/// Period between simulated frames.
pub const TICK_PERIOD_MS: u64 = 80;

const HEADING_RATE: f64 = 37.0;
const POSITION_STEP: f64 = 0.000_02;
const REVERSE_SPEED_KMH: f64 = 6.0;
const LOW_BATTERY_PERCENT: f64 = 20.0;

pub const BATTERY_LOW_ID: &str = "battery-low";
pub const OVERHEAT_ID: &str = "overheat";

/// Parameters of the synthetic drive profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub phase_step: f64,
    pub cruise_speed_kmh: f64,
    pub speed_swing_kmh: f64,
    pub battery_start: f64,
    pub battery_drain: f64,
    pub battery_floor: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            phase_step: 0.07,
            cruise_speed_kmh: 28.0,
            speed_swing_kmh: 16.0,
            battery_start: 100.0,
            battery_drain: 0.006,
            battery_floor: 5.0,
            latitude: 37.7749,
            longitude: -122.4194,
        }
    }
}

/// Mutable generator state, advanced once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorState {
    pub phase: f64,
    pub battery: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl SimulatorState {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            phase: 0.0,
            battery: config.battery_start,
            latitude: config.latitude,
            longitude: config.longitude,
        }
    }
}

/// Deterministic telemetry generator.
#[derive(Debug, Clone)]
pub struct TelemetrySimulator {
    config: SimulatorConfig,
    state: SimulatorState,
}

impl TelemetrySimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let state = SimulatorState::from_config(&config);
        Self { config, state }
    }

    pub fn with_state(config: SimulatorConfig, state: SimulatorState) -> Self {
        Self { config, state }
    }

    pub fn state(&self) -> SimulatorState {
        self.state
    }

    /// Advances the profile by one step and returns the resulting frame.
    pub fn tick(&mut self, timestamp: u64) -> TelemetryFrame {
        let config = &self.config;
        let state = &mut self.state;

        state.phase += config.phase_step;
        let phase = state.phase;
        let speed_kmh = (config.cruise_speed_kmh + config.speed_swing_kmh * phase.sin()).max(0.0);
        state.battery = (state.battery - config.battery_drain).max(config.battery_floor);
        let heading_deg = (phase * HEADING_RATE).rem_euclid(360.0);
        state.latitude += POSITION_STEP * phase.cos();
        state.longitude += POSITION_STEP * phase.sin();
        let reverse = speed_kmh < REVERSE_SPEED_KMH && pulse(phase, 9.0, 30);

        let mut alerts = Vec::new();
        if state.battery < LOW_BATTERY_PERCENT && pulse(phase, 10.0, 35) {
            alerts.push(Alert::new(
                BATTERY_LOW_ID,
                AlertLevel::Warning,
                "Battery low. Please plan a recharge soon.",
                false,
                timestamp,
            ));
        }
        if pulse(phase, 10.0, 250) {
            alerts.push(Alert::new(
                OVERHEAT_ID,
                AlertLevel::Critical,
                "Motor temperature critical. Slow down now.",
                true,
                timestamp,
            ));
        }

        TelemetryFrame {
            speed_kmh,
            battery_percent: state.battery.clamp(0.0, 100.0) as u8,
            reverse,
            connectivity: ConnectivityState::Connected,
            gps: GpsData {
                latitude: state.latitude,
                longitude: state.longitude,
                heading_deg,
                fix_state: GpsFixState::Fix3d,
            },
            alerts,
            timestamp,
        }
    }
}

impl Default for TelemetrySimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

/// True on the steps where `floor(phase * scale)` is a multiple of `period`.
fn pulse(phase: f64, scale: f64, period: i64) -> bool {
    ((phase * scale).floor() as i64).rem_euclid(period) == 0
}

/// Source variant backed by the in-process simulator.
#[derive(Debug)]
pub struct SimulatedSource {
    simulator: TelemetrySimulator,
    running: bool,
}

impl SimulatedSource {
    pub fn new(simulator: TelemetrySimulator) -> Self {
        Self {
            simulator,
            running: false,
        }
    }
}

impl TelemetrySource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn start(&mut self) -> SourceResult<()> {
        self.running = true;
        Ok(())
    }

    fn poll_frame(&mut self, now_ms: u64) -> SourceResult<Option<TelemetryFrame>> {
        if !self.running {
            return Ok(None);
        }
        Ok(Some(self.simulator.tick(now_ms)))
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
