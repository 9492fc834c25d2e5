pub mod alert;
pub mod frame;
pub mod page;

pub use alert::{Alert, AlertLevel};
pub use frame::{ConnectivityState, GpsData, GpsFixState, TelemetryFrame};
pub use page::PageId;
