use crate::gui_bridge::model::DashboardModel;
use anyhow::Context;
use kartcore::model::{PageId, TelemetryFrame};
use kartcore::source::FrameSender;
use kartcore::{Console, ConsoleEvent, SourceError};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock},
    thread,
};
use tokio::runtime::Builder;
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter, Rejection, Reply,
};

/// Requests from the UI, executed by the console loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCommand {
    Acknowledge(String),
    Navigate(PageId),
    StartSource,
    StopSource,
    Shutdown,
}

pub type CommandSender = UnboundedSender<BridgeCommand>;
type SharedModel = Arc<RwLock<DashboardModel>>;

#[derive(Debug, Deserialize)]
struct AcknowledgeRequest {
    alert_id: String,
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    page: PageId,
}

/// HTTP face of the console: serves the dashboard snapshot and forwards UI
/// requests into the console loop.
pub struct GuiBridge {
    state: SharedModel,
    commands: CommandSender,
}

impl GuiBridge {
    pub fn new(commands: CommandSender, page: PageId) -> Self {
        Self {
            state: Arc::new(RwLock::new(DashboardModel::new(page))),
            commands,
        }
    }

    pub fn routes(
        &self,
        frames: Option<FrameSender>,
    ) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        api(self.state.clone(), self.commands.clone(), frames)
    }

    /// Serves the routes from a dedicated thread with its own runtime.
    /// Blocks until the listener is bound and returns its address.
    pub fn serve(
        &self,
        addr: SocketAddr,
        frames: Option<FrameSender>,
    ) -> anyhow::Result<SocketAddr> {
        let routes = self.routes(frames);
        let (bound_tx, bound_rx) = oneshot::channel::<anyhow::Result<SocketAddr>>();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = bound_tx.send(Err(err).context("building bridge runtime"));
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(addr) {
                    Ok((bound, server)) => {
                        info!("[bridge] listening on http://{}", bound);
                        let _ = bound_tx.send(Ok(bound));
                        server.await;
                    }
                    Err(err) => {
                        let _ = bound_tx
                            .send(Err(err).with_context(|| format!("binding {}", addr)));
                    }
                }
            });
        });
        bound_rx
            .blocking_recv()
            .context("bridge thread exited before binding")?
    }

    pub fn publish(&self, events: &[ConsoleEvent]) {
        if events.is_empty() {
            return;
        }
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for event in events {
            guard.apply(event);
        }
    }

    pub fn publish_console(&self, console: &Console) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.sync(console);
    }

    pub fn publish_status(&self, message: &str) {
        info!("[bridge] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> DashboardModel {
        read_model(&self.state)
    }
}

fn read_model(state: &SharedModel) -> DashboardModel {
    state
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn api(
    state: SharedModel,
    commands: CommandSender,
    frames: Option<FrameSender>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let commands_filter = warp::any().map(move || commands.clone());
    let frames_filter = warp::any().map(move || frames.clone());

    let dashboard = warp::path("dashboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedModel| warp::reply::json(&read_model(&state)));

    let ingest = warp::path("ingest")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(frames_filter)
        .map(|frame: TelemetryFrame, frames: Option<FrameSender>| {
            ingest_frame(frames.as_ref(), frame)
        });

    let acknowledge = warp::path("acknowledge")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(commands_filter.clone())
        .map(|request: AcknowledgeRequest, commands: CommandSender| {
            dispatch(&commands, BridgeCommand::Acknowledge(request.alert_id))
        });

    let navigate = warp::path("navigate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(commands_filter.clone())
        .map(|request: NavigateRequest, commands: CommandSender| {
            dispatch(&commands, BridgeCommand::Navigate(request.page))
        });

    let source_control = warp::path!("source" / String)
        .and(warp::post())
        .and(commands_filter.clone())
        .map(|action: String, commands: CommandSender| match action.as_str() {
            "start" => dispatch(&commands, BridgeCommand::StartSource),
            "stop" => dispatch(&commands, BridgeCommand::StopSource),
            _ => reply_status(StatusCode::NOT_FOUND, "unknown source action"),
        });

    let shutdown = warp::path("shutdown")
        .and(warp::path::end())
        .and(warp::post())
        .and(commands_filter)
        .map(|commands: CommandSender| dispatch(&commands, BridgeCommand::Shutdown));

    dashboard
        .or(ingest)
        .or(acknowledge)
        .or(navigate)
        .or(source_control)
        .or(shutdown)
}

fn reply_status(status: StatusCode, message: &str) -> WithStatus<Json> {
    let label = if status.is_success() { "ok" } else { "error" };
    warp::reply::with_status(
        warp::reply::json(&json!({ "status": label, "message": message })),
        status,
    )
}

fn dispatch(commands: &CommandSender, command: BridgeCommand) -> WithStatus<Json> {
    match commands.send(command) {
        Ok(()) => reply_status(StatusCode::ACCEPTED, "queued"),
        Err(err) => {
            warn!("[bridge] console loop stopped, dropping {:?}", err.0);
            reply_status(StatusCode::SERVICE_UNAVAILABLE, "console loop stopped")
        }
    }
}

fn ingest_frame(frames: Option<&FrameSender>, frame: TelemetryFrame) -> WithStatus<Json> {
    let Some(sender) = frames else {
        return reply_status(
            StatusCode::CONFLICT,
            "console is not fed by a network source",
        );
    };
    match sender.send(frame) {
        Ok(()) => reply_status(StatusCode::ACCEPTED, "frame queued"),
        Err(SourceError::InvalidFrame(reason)) => {
            reply_status(StatusCode::UNPROCESSABLE_ENTITY, &reason)
        }
        Err(err) => reply_status(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
    }
}
