use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::aggregate::{Aggregator, Window};
use crate::publish::{SnapshotBundle, SnapshotPublisher};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub publisher: SnapshotPublisher,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/snapshot", get(snapshot))
        .route("/ws", get(ws_upgrade))
        .route("/debug/records", get(debug_records))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct SnapshotQuery {
    #[serde(default)]
    window: Option<String>,
}

/// Latest published bundle; `?window=1D` narrows to one window's snapshot.
/// `null` until the first successful cycle.
async fn snapshot(
    State(state): State<AppState>,
    Query(q): Query<SnapshotQuery>,
) -> Response {
    let Some(bundle) = state.publisher.last_known() else {
        return Json(serde_json::Value::Null).into_response();
    };

    match q.window {
        None => Json((*bundle).clone()).into_response(),
        Some(label) => match Window::from_label(&label) {
            Some(window) => {
                let snap = bundle.windows.get(window.label()).cloned().unwrap_or_default();
                Json(snap).into_response()
            }
            None => (
                StatusCode::BAD_REQUEST,
                format!("unknown window '{label}'"),
            )
                .into_response(),
        },
    }
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_snapshots(socket, state))
}

/// Push the last known bundle on connect, then every new bundle as it is
/// published. The connection ends when the client goes away.
async fn stream_snapshots(mut socket: WebSocket, state: AppState) {
    let mut rx = state.publisher.subscribe();

    let initial = rx.borrow_and_update().clone();
    if let Some(bundle) = initial {
        if send_bundle(&mut socket, &bundle).await.is_err() {
            return;
        }
    }

    while rx.changed().await.is_ok() {
        let latest = rx.borrow_and_update().clone();
        if let Some(bundle) = latest {
            if send_bundle(&mut socket, &bundle).await.is_err() {
                return;
            }
        }
    }
}

async fn send_bundle(socket: &mut WebSocket, bundle: &SnapshotBundle) -> Result<(), axum::Error> {
    let json = serde_json::to_string(bundle).unwrap_or_else(|_| "null".to_string());
    socket.send(Message::Text(json.into())).await
}

/// Raw per-cycle record map, for quick diagnostics.
async fn debug_records(State(state): State<AppState>) -> Response {
    Json(state.aggregator.records()).into_response()
}
