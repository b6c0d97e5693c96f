//! Rutas HTTP
//!
//! `create_app_router` arma el router completo con trazas, compresión y CORS.

pub mod analysis_routes;
pub mod case_routes;
pub mod dispatch_routes;
pub mod incident_routes;
pub mod live_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::dto::analysis_dto::{DashboardConfigResponse, VehicleTypeOption};
use crate::dto::api_response::ApiResponse;
use crate::middleware::cors::cors_middleware;
use crate::models::vehicle::VehicleType;
use crate::state::AppState;

pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/dashboard/config", get(dashboard_config))
        .nest("/api/dispatch", dispatch_routes::create_dispatch_router())
        .nest("/api/analysis", analysis_routes::create_analysis_router(max_upload_bytes))
        .nest("/api/location", analysis_routes::create_location_router())
        .nest("/api/incidents", incident_routes::create_incident_router())
        .nest("/api/cases", case_routes::create_case_router())
        .merge(live_routes::create_live_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let vehicles = state.registry.read().await.len();
    Json(json!({
        "status": "ok",
        "service": "fire-dispatch",
        "timestamp": state.clock.now().to_rfc3339(),
        "vehicles": vehicles,
        "live_subscribers": state.live.subscriber_count(),
    }))
}

async fn dashboard_config(State(state): State<AppState>) -> Json<ApiResponse<DashboardConfigResponse>> {
    let vehicle_types = VehicleType::ALL
        .iter()
        .map(|vehicle_type| VehicleTypeOption {
            value: *vehicle_type,
            label: vehicle_type.label().to_string(),
        })
        .collect();

    Json(ApiResponse::success(DashboardConfigResponse {
        video_feed_url: state.config.video_feed_url.clone(),
        display_tick_secs: state.config.display_tick_secs,
        vehicle_types,
    }))
}
