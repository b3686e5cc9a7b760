use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::response::{pretty_json, PingAck, StatusReport};
use crate::http::server::AppState;
use crate::scheduler::RoundTrigger;

/// `GET /` and `GET /health`.
pub async fn get_status(State(state): State<AppState>) -> Response {
    let store = state.runner.store();
    let report = StatusReport::new(
        state.runner.registry().len(),
        store.snapshot(),
        store.uptime().as_secs(),
    );
    pretty_json(StatusCode::OK, &report)
}

/// `GET /ping`: start a round and answer without waiting for it.
pub async fn trigger_ping(State(state): State<AppState>) -> Response {
    state.runner.spawn(RoundTrigger::Manual);
    tracing::info!("Manual ping triggered");
    pretty_json(StatusCode::OK, &PingAck::default())
}

/// Unknown routes get an empty 404.
pub async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
