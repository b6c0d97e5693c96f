use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::dispatch_controller::DispatchController;
use crate::dto::api_response::ApiResponse;
use crate::dto::dispatch_dto::{
    ArrivalRequest, AvailabilityResponse, CommitDispatchRequest, DispatchBoardEntry, MaintenanceRequest,
    ProposalResponse, ProposeDispatchRequest, VehicleListQuery, VehicleResponse,
};
use crate::models::vehicle::VehicleId;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{AppJson, AppPath, AppQuery};

pub fn create_dispatch_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/availability", get(availability))
        .route("/proposals", post(propose_dispatch))
        .route("/commit", post(commit_dispatch))
        .route("/vehicles/:id/recall", post(recall_vehicle))
        .route("/vehicles/:id/arrival", post(record_arrival))
        .route("/vehicles/:id/maintenance", post(set_maintenance))
        .route("/board", get(dispatch_board))
}

async fn list_vehicles(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VehicleListQuery>,
) -> Json<ApiResponse<Vec<VehicleResponse>>> {
    let controller = DispatchController::new(&state);
    Json(ApiResponse::success(controller.list(query).await))
}

async fn availability(State(state): State<AppState>) -> Json<ApiResponse<Vec<AvailabilityResponse>>> {
    let controller = DispatchController::new(&state);
    Json(ApiResponse::success(controller.availability().await))
}

async fn propose_dispatch(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProposeDispatchRequest>,
) -> Result<Json<ApiResponse<ProposalResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.propose(request).await?;
    Ok(Json(response))
}

async fn commit_dispatch(
    State(state): State<AppState>,
    AppJson(request): AppJson<CommitDispatchRequest>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.commit(request).await?;
    Ok(Json(response))
}

async fn recall_vehicle(
    State(state): State<AppState>,
    AppPath(id): AppPath<VehicleId>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.recall(id).await?;
    Ok(Json(response))
}

async fn record_arrival(
    State(state): State<AppState>,
    AppPath(id): AppPath<VehicleId>,
    AppJson(request): AppJson<ArrivalRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.record_arrival(id, request).await?;
    Ok(Json(response))
}

async fn set_maintenance(
    State(state): State<AppState>,
    AppPath(id): AppPath<VehicleId>,
    AppJson(request): AppJson<MaintenanceRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = DispatchController::new(&state);
    let response = controller.set_maintenance(id, request).await?;
    Ok(Json(response))
}

async fn dispatch_board(State(state): State<AppState>) -> Json<ApiResponse<Vec<DispatchBoardEntry>>> {
    let controller = DispatchController::new(&state);
    Json(ApiResponse::success(controller.board().await))
}
