use crate::model::Alert;
use std::collections::{BTreeMap, HashSet};

/// Tracks active alerts by id and the ids the driver has acknowledged.
///
/// Entries are never evicted; an acknowledged id stays hidden from the
/// banner even when the same alert is emitted again later.
#[derive(Debug, Default)]
pub struct AlertManager {
    active: BTreeMap<String, Alert>,
    acked: HashSet<String>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores each alert under its id, replacing any previous copy.
    pub fn ingest<I>(&mut self, alerts: I)
    where
        I: IntoIterator<Item = Alert>,
    {
        for alert in alerts {
            self.active.insert(alert.alert_id.clone(), alert);
        }
    }

    /// Marks an id as acknowledged. Unknown ids are accepted and apply once
    /// the alert shows up.
    pub fn acknowledge(&mut self, alert_id: &str) {
        if !self.acked.contains(alert_id) {
            self.acked.insert(alert_id.to_string());
        }
    }

    pub fn is_acknowledged(&self, alert_id: &str) -> bool {
        self.acked.contains(alert_id)
    }

    /// Highest severity unacknowledged alert. Equal severities prefer the
    /// newest timestamp, then the smallest id.
    pub fn banner_alert(&self) -> Option<&Alert> {
        self.active
            .values()
            .filter(|alert| !self.acked.contains(&alert.alert_id))
            .max_by(|a, b| {
                a.level
                    .cmp(&b.level)
                    .then(a.timestamp.cmp(&b.timestamp))
                    .then_with(|| b.alert_id.cmp(&a.alert_id))
            })
    }

    /// Every stored alert, acknowledged or not, ordered by id.
    pub fn active(&self) -> impl Iterator<Item = &Alert> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
