use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::case_controller::CaseController;
use crate::dto::api_response::ApiResponse;
use crate::dto::case_dto::{CaseResponse, SubmitCaseRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

pub fn create_case_router() -> Router<AppState> {
    Router::new().route("/", get(list_cases).post(submit_case))
}

async fn submit_case(
    State(state): State<AppState>,
    AppJson(request): AppJson<SubmitCaseRequest>,
) -> Result<Json<ApiResponse<CaseResponse>>, AppError> {
    let controller = CaseController::new(&state);
    let response = controller.submit(request).await?;
    Ok(Json(response))
}

async fn list_cases(State(state): State<AppState>) -> Json<ApiResponse<Vec<CaseResponse>>> {
    let controller = CaseController::new(&state);
    Json(ApiResponse::success(controller.list().await))
}
