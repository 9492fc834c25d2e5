use clap::ValueEnum;
use kartcore::prelude::TelemetrySource;
use kartcore::source::{FrameSender, NetworkSource, SimulatedSource, SimulatorConfig, TelemetrySimulator};
use serde::{Deserialize, Serialize};

/// Which telemetry provider feeds the console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Simulated,
    Network,
}

/// Source section of the workflow config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SourceProfile {
    pub kind: SourceKind,
    pub simulator: SimulatorConfig,
}

/// A built source plus, for network sources, the handle that feeds it.
pub struct BuiltSource {
    pub source: Box<dyn TelemetrySource>,
    pub frames: Option<FrameSender>,
}

pub fn build_source(profile: &SourceProfile) -> BuiltSource {
    match profile.kind {
        SourceKind::Simulated => BuiltSource {
            source: Box::new(SimulatedSource::new(TelemetrySimulator::new(
                profile.simulator.clone(),
            ))),
            frames: None,
        },
        SourceKind::Network => {
            let (sender, source) = NetworkSource::channel();
            BuiltSource {
                source: Box::new(source),
                frames: Some(sender),
            }
        }
    }
}
