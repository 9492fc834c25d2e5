pub mod watchdog;

pub use watchdog::{ConnectivityWatchdog, WATCHDOG_PERIOD_MS};
