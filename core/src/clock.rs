use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in milliseconds since the UNIX epoch. A clock set before the
/// epoch reads as zero.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
