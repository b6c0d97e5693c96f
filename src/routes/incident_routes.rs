use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::controllers::incident_controller::IncidentController;
use crate::dto::api_response::ApiResponse;
use crate::dto::incident_dto::{IncidentMapResponse, IncidentResponse, UpdateZoneRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

pub fn create_incident_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidents))
        .route("/zone", put(update_zone))
}

async fn list_incidents(State(state): State<AppState>) -> Json<ApiResponse<IncidentMapResponse>> {
    let controller = IncidentController::new(&state);
    Json(ApiResponse::success(controller.map().await))
}

async fn update_zone(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateZoneRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, AppError> {
    let controller = IncidentController::new(&state);
    let response = controller.update_zone(request).await?;
    Ok(Json(response))
}
