use crate::gui_bridge::model::StatusModel;
use dronecore::interface::{Alert, AlertSink, Band, SweepStatus};
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

pub fn status_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

type SharedModel = Arc<RwLock<StatusModel>>;

fn snapshot(state: &SharedModel) -> StatusModel {
    match state.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// `GET /status` returns the whole model, `GET /events` the recent alerts.
pub fn routes(
    state: SharedModel,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let status_route = warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedModel| warp::reply::json(&snapshot(&state)));

    let events_route = warp::path("events")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedModel| warp::reply::json(&snapshot(&state).events));

    status_route.or(events_route)
}

/// Alert sink that mirrors the sweep into an HTTP-readable model.
#[derive(Clone)]
pub struct StatusBridge {
    state: SharedModel,
}

impl StatusBridge {
    pub fn new(bands: Vec<Band>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StatusModel::new(bands))),
        }
    }

    /// Serves the model on a background thread until the process exits.
    pub fn serve(&self, addr: SocketAddr) -> thread::JoinHandle<()> {
        let routes = routes(self.state.clone());
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("status bridge runtime failed: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(addr) {
                    Ok((bound, server)) => {
                        log::info!("status bridge listening on http://{}", bound);
                        server.await;
                    }
                    Err(err) => log::error!("status bridge could not bind {}: {}", addr, err),
                }
            });
        })
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> StatusModel {
        snapshot(&self.state)
    }

    fn update(&self, apply: impl FnOnce(&mut StatusModel)) {
        match self.state.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }
}

impl AlertSink for StatusBridge {
    fn emit(&mut self, alert: &Alert) {
        self.update(|model| model.record_alert(alert));
    }

    fn status(&mut self, status: &SweepStatus) {
        self.update(|model| model.record_status(status));
    }
}
