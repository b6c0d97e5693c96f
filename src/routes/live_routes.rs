//! Rutas del canal en vivo
//!
//! Cada conexión WebSocket tiene su propia suscripción: se crea al abrir el
//! socket y se suelta al cerrarlo.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::{get, post},
    Json, Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use crate::controllers::analysis_controller::AnalysisController;
use crate::dto::api_response::ApiResponse;
use crate::models::analysis::LiveUpdate;
use crate::services::live_channel::{LiveChannel, LiveMessage};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

pub fn create_live_router() -> Router<AppState> {
    Router::new()
        .route("/api/live/updates", post(ingest_update))
        .route("/ws/live", get(live_socket))
}

async fn ingest_update(
    State(state): State<AppState>,
    AppJson(update): AppJson<LiveUpdate>,
) -> Result<Json<ApiResponse<LiveUpdate>>, AppError> {
    let controller = AnalysisController::new(&state);
    let response = controller.ingest_live(update).await?;
    Ok(Json(response))
}

async fn live_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let live = state.live.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, live))
}

async fn handle_socket(socket: WebSocket, live: LiveChannel) {
    let mut subscription = live.subscribe();
    let (mut sender, mut receiver) = socket.split();
    tracing::info!("🔌 Live client connected ({} open)", live.subscriber_count());

    if let Some(message) = subscription.current() {
        if send_message(&mut sender, &message).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            message = subscription.next() => match message {
                Some(message) => {
                    if send_message(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(subscription);
    tracing::info!("🔌 Live client disconnected");
}

async fn send_message(sender: &mut SplitSink<WebSocket, Message>, message: &LiveMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            tracing::warn!("Failed to encode live message: {}", e);
            Ok(())
        }
    }
}
