use crate::gui_bridge::bridge::{BridgeCommand, GuiBridge};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use kartcore::clock::unix_millis;
use kartcore::model::{Alert, ConnectivityState, PageId, TelemetryFrame};
use kartcore::prelude::TelemetrySource;
use kartcore::{Console, ConsoleEvent};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, MissedTickBehavior};

/// Shape of a headless run on the virtual clock.
#[derive(Debug, Clone, Copy)]
pub struct OfflinePlan {
    pub ticks: usize,
    /// Stop the source after this many tick slots; the watchdog keeps going.
    pub stop_after: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: usize,
    pub forced_navigations: usize,
    pub link_drops: usize,
    pub source_errors: usize,
    pub banner: Option<Alert>,
    pub link: ConnectivityState,
    pub page: PageId,
    pub last_frame: Option<TelemetryFrame>,
}

pub struct Runner {
    config: WorkflowConfig,
    source: Box<dyn TelemetrySource>,
    console: Console,
    bridge: Option<Arc<GuiBridge>>,
    last_frame: Option<TelemetryFrame>,
}

impl Runner {
    pub fn new(config: WorkflowConfig, source: Box<dyn TelemetrySource>) -> Self {
        let console = Console::new(&config.to_console_settings());
        Self {
            config,
            source,
            console,
            bridge: None,
            last_frame: None,
        }
    }

    pub fn with_bridge(mut self, bridge: Arc<GuiBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// One frame slot: poll the source and apply everything it produced, in
    /// order.
    pub fn tick(&mut self, now_ms: u64) {
        match self.source.poll_batch(now_ms) {
            Ok(frames) => {
                for frame in frames {
                    let events = self.console.handle_frame(frame, now_ms);
                    self.dispatch(events);
                }
            }
            Err(err) => self
                .console
                .record_source_error(&format!("{} source: {}", self.source.name(), err)),
        }
    }

    pub fn check_link(&mut self, now_ms: u64) {
        let events = self.console.check_link(now_ms);
        self.dispatch(events);
    }

    /// Applies a UI request. Returns `false` once shutdown was requested.
    pub fn apply(&mut self, command: BridgeCommand) -> bool {
        match command {
            BridgeCommand::Acknowledge(alert_id) => {
                let events = self.console.acknowledge(&alert_id);
                self.dispatch(events);
            }
            BridgeCommand::Navigate(page) => {
                let events = self.console.navigate(page);
                self.dispatch(events);
            }
            BridgeCommand::StartSource => {
                if let Err(err) = self.source.start() {
                    self.console
                        .record_source_error(&format!("restarting {}: {}", self.source.name(), err));
                }
            }
            BridgeCommand::StopSource => {
                info!("stopping {} source, watchdog keeps running", self.source.name());
                self.source.stop();
            }
            BridgeCommand::Shutdown => return false,
        }
        true
    }

    /// Runs tick slots on a virtual clock starting at zero, firing the
    /// watchdog on its own period in between.
    pub fn run_offline(&mut self, plan: OfflinePlan) -> anyhow::Result<RunSummary> {
        self.source
            .start()
            .with_context(|| format!("starting {} source", self.source.name()))?;

        let tick_ms = self.config.tick_ms;
        let watchdog_ms = self.config.watchdog_ms;
        let mut next_check = watchdog_ms;

        for slot in 1..=plan.ticks {
            let now = slot as u64 * tick_ms;
            while next_check <= now {
                self.check_link(next_check);
                next_check += watchdog_ms;
            }
            if plan.stop_after.is_some_and(|limit| slot > limit) && self.source.is_running() {
                self.apply(BridgeCommand::StopSource);
            }
            self.tick(now);
        }

        self.source.stop();
        Ok(self.summary())
    }

    /// Drives both schedules on the current task until Ctrl+C or a shutdown
    /// request.
    pub async fn run_live(
        &mut self,
        mut commands: UnboundedReceiver<BridgeCommand>,
    ) -> anyhow::Result<RunSummary> {
        self.source
            .start()
            .with_context(|| format!("starting {} source", self.source.name()))?;
        info!(
            "console live: {} source, tick {} ms, watchdog {} ms",
            self.source.name(),
            self.config.tick_ms,
            self.config.watchdog_ms
        );

        let mut ticks = interval(Duration::from_millis(self.config.tick_ms));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut checks = interval(Duration::from_millis(self.config.watchdog_ms));
        checks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticks.tick() => self.tick(unix_millis()),
                _ = checks.tick() => self.check_link(unix_millis()),
                Some(command) = commands.recv() => {
                    if !self.apply(command) {
                        info!("shutdown requested");
                        break;
                    }
                }
                result = &mut shutdown => {
                    result.context("awaiting Ctrl+C to exit")?;
                    info!("Ctrl+C received");
                    break;
                }
            }
        }

        self.source.stop();
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        let metrics = self.console.metrics();
        RunSummary {
            frames: metrics.frames,
            forced_navigations: metrics.forced_navigations,
            link_drops: metrics.link_drops,
            source_errors: metrics.source_errors,
            banner: self.console.banner_alert().cloned(),
            link: self.console.display_connectivity(),
            page: self.console.current_page(),
            last_frame: self.last_frame.clone(),
        }
    }

    fn dispatch(&mut self, events: Vec<ConsoleEvent>) {
        for event in &events {
            if let ConsoleEvent::FrameUpdated(frame) = event {
                self.last_frame = Some(frame.clone());
            }
        }
        if let Some(bridge) = self.bridge.as_ref() {
            bridge.publish(&events);
            bridge.publish_console(&self.console);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_source, SourceKind, SourceProfile};
    use kartcore::model::AlertLevel;
    use kartcore::source::SimulatorConfig;
    use tokio::sync::mpsc;

    fn runner(config: WorkflowConfig) -> Runner {
        let built = build_source(&config.source);
        Runner::new(config, built.source)
    }

    #[test]
    fn runner_executes_offline_workflow() {
        let mut runner = runner(WorkflowConfig::default());
        let summary = runner
            .run_offline(OfflinePlan {
                ticks: 100,
                stop_after: None,
            })
            .unwrap();
        assert_eq!(summary.frames, 100);
        assert_eq!(summary.link, ConnectivityState::Connected);
        assert_eq!(summary.page, PageId::Home);
        assert_eq!(summary.banner.unwrap().level, AlertLevel::Critical);
        assert_eq!(summary.last_frame.unwrap().timestamp, 8_000);
    }

    #[test]
    fn stopped_source_ages_out_the_link() {
        let mut runner = runner(WorkflowConfig::default());
        let summary = runner
            .run_offline(OfflinePlan {
                ticks: 100,
                stop_after: Some(25),
            })
            .unwrap();
        assert_eq!(summary.frames, 25);
        assert_eq!(summary.link, ConnectivityState::Disconnected);
        assert_eq!(summary.link_drops, 1);
        assert_eq!(summary.last_frame.unwrap().timestamp, 2_000);
    }

    #[test]
    fn reverse_profile_forces_camera() {
        let config = WorkflowConfig {
            source: SourceProfile {
                kind: SourceKind::Simulated,
                simulator: SimulatorConfig {
                    speed_swing_kmh: 30.0,
                    ..Default::default()
                },
            },
            ..Default::default()
        };
        let mut runner = runner(config);
        let summary = runner
            .run_offline(OfflinePlan {
                ticks: 400,
                stop_after: None,
            })
            .unwrap();
        assert!(summary.forced_navigations >= 1);
        assert_eq!(summary.page, PageId::Camera);
    }

    #[test]
    fn commands_update_console_and_bridge() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let bridge = Arc::new(GuiBridge::new(tx, PageId::Home));
        let mut runner = runner(WorkflowConfig::default()).with_bridge(bridge.clone());
        runner.source.start().unwrap();
        runner.tick(80);
        assert_eq!(bridge.snapshot().banner.unwrap().alert_id, "overheat");

        assert!(runner.apply(BridgeCommand::Acknowledge("overheat".into())));
        assert!(runner.apply(BridgeCommand::Navigate(PageId::Settings)));
        let snapshot = bridge.snapshot();
        assert!(snapshot.banner.is_none());
        assert_eq!(snapshot.page, PageId::Settings);
        assert_eq!(snapshot.metrics.frames, 1);
        assert_eq!(snapshot.last_frame_at, Some(80));
        assert_eq!(snapshot.active_alerts.len(), 1);
        assert_eq!(snapshot.active_alerts[0].alert_id, "overheat");
        assert!(!runner.apply(BridgeCommand::Shutdown));
    }

    #[test]
    fn network_burst_then_silence_drops_the_link() {
        let config = WorkflowConfig {
            source: SourceProfile {
                kind: SourceKind::Network,
                ..Default::default()
            },
            ..Default::default()
        };
        let built = build_source(&config.source);
        let sender = built.frames.unwrap();
        let mut simulator = kartcore::source::TelemetrySimulator::default();
        for _ in 0..60 {
            sender.send(simulator.tick(0)).unwrap();
        }

        // First slot at 80 ms drains the burst; silence afterwards must show
        // within stale_after_ms plus one watchdog period.
        let mut runner = Runner::new(config, built.source);
        let summary = runner
            .run_offline(OfflinePlan {
                ticks: 30,
                stop_after: None,
            })
            .unwrap();
        assert_eq!(summary.frames, 60);
        assert_eq!(summary.source_errors, 0);
        assert_eq!(summary.link, ConnectivityState::Disconnected);
        assert_eq!(summary.link_drops, 1);
        drop(sender);
    }

    #[test]
    fn stamped_receipt_time_drives_dashboard_last_frame() {
        let config = WorkflowConfig {
            source: SourceProfile {
                kind: SourceKind::Network,
                ..Default::default()
            },
            ..Default::default()
        };
        let built = build_source(&config.source);
        let sender = built.frames.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let bridge = Arc::new(GuiBridge::new(tx, PageId::Home));
        let mut runner = Runner::new(config, built.source).with_bridge(bridge.clone());
        runner.source.start().unwrap();

        sender
            .send(kartcore::source::TelemetrySimulator::default().tick(5))
            .unwrap();
        runner.tick(9_000);
        assert_eq!(bridge.snapshot().last_frame_at, Some(9_000));
    }

    #[test]
    fn network_source_errors_are_counted_not_fatal() {
        let config = WorkflowConfig {
            source: SourceProfile {
                kind: SourceKind::Network,
                ..Default::default()
            },
            ..Default::default()
        };
        let built = build_source(&config.source);
        drop(built.frames);
        let mut runner = Runner::new(config, built.source);
        let summary = runner
            .run_offline(OfflinePlan {
                ticks: 3,
                stop_after: None,
            })
            .unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.source_errors, 3);
    }

    #[tokio::test]
    async fn live_loop_stops_on_shutdown_command() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(BridgeCommand::Navigate(PageId::Navigation)).unwrap();
        tx.send(BridgeCommand::Shutdown).unwrap();
        let mut runner = runner(WorkflowConfig::default());
        let summary = runner.run_live(rx).await.unwrap();
        assert_eq!(summary.page, PageId::Navigation);
        assert!(!runner.source.is_running());
    }
}
