use crate::generator::profile::SourceProfile;
use anyhow::{ensure, Context};
use kartcore::link::WATCHDOG_PERIOD_MS;
use kartcore::model::PageId;
use kartcore::prelude::{ConsoleSettings, STALE_AFTER_MS};
use kartcore::source::TICK_PERIOD_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub tick_ms: u64,
    pub watchdog_ms: u64,
    pub stale_after_ms: u64,
    pub default_page: PageId,
    pub bind: SocketAddr,
    pub source: SourceProfile,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_PERIOD_MS,
            watchdog_ms: WATCHDOG_PERIOD_MS,
            stale_after_ms: STALE_AFTER_MS,
            default_page: PageId::Home,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            source: SourceProfile::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.tick_ms > 0, "tick_ms must be positive");
        ensure!(self.watchdog_ms > 0, "watchdog_ms must be positive");
        Ok(())
    }

    pub fn to_console_settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            stale_after_ms: self.stale_after_ms,
            default_page: self.default_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::SourceKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_console_timing() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.tick_ms, 80);
        assert_eq!(cfg.watchdog_ms, 1_200);
        assert_eq!(cfg.to_console_settings().stale_after_ms, 2_000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"tick_ms: 40\ndefault_page: navigation\nbind: 0.0.0.0:9100\nsource:\n  kind: network\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.tick_ms, 40);
        assert_eq!(cfg.watchdog_ms, 1_200);
        assert_eq!(cfg.default_page, PageId::Navigation);
        assert_eq!(cfg.bind.port(), 9100);
        assert_eq!(cfg.source.kind, SourceKind::Network);
    }

    #[test]
    fn config_load_rejects_zero_period() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"watchdog_ms: 0\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
