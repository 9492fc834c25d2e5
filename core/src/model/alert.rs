use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Driver-facing alert. `alert_id` is the identity key across frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub alert_id: String,
    pub level: AlertLevel,
    pub message: String,
    #[serde(default)]
    pub ack_required: bool,
    pub timestamp: u64,
}

impl Alert {
    pub fn new(
        alert_id: impl Into<String>,
        level: AlertLevel,
        message: impl Into<String>,
        ack_required: bool,
        timestamp: u64,
    ) -> Self {
        Self {
            alert_id: alert_id.into(),
            level,
            message: message.into(),
            ack_required,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_by_severity() {
        assert!(AlertLevel::Info < AlertLevel::Warning);
        assert!(AlertLevel::Warning < AlertLevel::Critical);
    }
}
