//! Telemetry, alert and connectivity core for the electric kart console.
//!
//! Frames come from a [`prelude::TelemetrySource`], are applied by the
//! [`console::Console`], and surface to the presentation layer as
//! [`console::ConsoleEvent`]s. The link watchdog runs on its own schedule and
//! never depends on the frame cadence.

pub mod alerts;
pub mod clock;
pub mod console;
pub mod diagnostics;
pub mod link;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod source;

pub use console::{Console, ConsoleEvent};
pub use prelude::{ConsoleSettings, SourceError, SourceResult, TelemetrySource};
