pub mod network;
pub mod simulated;

pub use network::{FrameSender, NetworkSource};
pub use simulated::{
    SimulatedSource, SimulatorConfig, SimulatorState, TelemetrySimulator, TICK_PERIOD_MS,
};
