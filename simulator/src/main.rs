use anyhow::Context;
use clap::Parser;
use generator::profile::{build_source, SourceKind};
use gui_bridge::bridge::GuiBridge;
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::sync::mpsc;
use workflow::config::WorkflowConfig;
use workflow::runner::{OfflinePlan, RunSummary, Runner};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Telemetry simulator and console driver for the kart dashboard")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the telemetry source from the config
    #[arg(long, value_enum)]
    source: Option<SourceKind>,
    /// Run a fixed number of ticks on a virtual clock and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, default_value_t = 250)]
    ticks: usize,
    /// Stop the source after this many ticks of an offline run
    #[arg(long)]
    stop_after: Option<usize>,
    /// Append the offline summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Expose the dashboard over HTTP while running live
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if let Some(kind) = args.source {
        config.source.kind = kind;
    }

    let built = build_source(&config.source);

    if args.offline {
        let mut runner = Runner::new(config, built.source);
        let summary = runner.run_offline(OfflinePlan {
            ticks: args.ticks,
            stop_after: args.stop_after,
        })?;
        let report = format_summary(&summary);
        print!("{}", report);

        if let Some(report_path) = args.report {
            if let Some(parent) = report_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&report_path)
                .with_context(|| format!("opening report {}", report_path.display()))?;
            file.write_all(report.as_bytes())?;
        }
        return Ok(());
    }

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let mut runner = Runner::new(config.clone(), built.source);
    if args.serve {
        let bridge = Arc::new(GuiBridge::new(commands_tx.clone(), config.default_page));
        let bound = bridge
            .serve(config.bind, built.frames)
            .context("starting HTTP bridge")?;
        bridge.publish_status(&format!(
            "HTTP bridge running on http://{} (Ctrl+C to stop)...",
            bound
        ));
        runner = runner.with_bridge(bridge);
    } else if config.source.kind == SourceKind::Network {
        warn!("network source without --serve: nothing will feed frames");
    }

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating console runtime")?;
    let summary = runtime.block_on(runner.run_live(commands_rx))?;
    drop(commands_tx);
    print!("{}", format_summary(&summary));

    Ok(())
}

fn format_summary(summary: &RunSummary) -> String {
    let banner = summary
        .banner
        .as_ref()
        .map(|alert| format!("{} ({})", alert.alert_id, alert.level))
        .unwrap_or_else(|| "none".into());
    let battery = summary
        .last_frame
        .as_ref()
        .map(|frame| format!("{}%", frame.battery_percent))
        .unwrap_or_else(|| "--".into());
    format!(
        "frames={} battery={} banner={} link={} page={} forced_navigations={} link_drops={} source_errors={}\n",
        summary.frames,
        battery,
        banner,
        summary.link,
        summary.page,
        summary.forced_navigations,
        summary.link_drops,
        summary.source_errors
    )
}
