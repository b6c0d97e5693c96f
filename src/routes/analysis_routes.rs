use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::analysis_controller::AnalysisController;
use crate::dto::analysis_dto::{ImageAnalysisResponse, LocationResponse, LocationSearchQuery, ZoneAnalysisApiRequest};
use crate::dto::api_response::ApiResponse;
use crate::dto::incident_dto::IncidentResponse;
use crate::services::analysis_backend::ImageUpload;
use crate::services::dashboard_state::HeatmapSnapshot;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};
use crate::utils::extract::{AppJson, AppQuery};

/// Nombre del campo multipart con la imagen
const IMAGE_FIELD: &str = "image";

pub fn create_analysis_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/image",
            post(analyze_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/zone", post(analyze_zone))
        .route("/heatmap", get(current_heatmap))
}

pub fn create_location_router() -> Router<AppState> {
    Router::new().route("/search", get(search_location))
}

async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImageAnalysisResponse>>, AppError> {
    let upload = read_image_upload(multipart).await?;
    let controller = AnalysisController::new(&state);
    let response = controller.analyze_image(upload).await?;
    Ok(Json(response))
}

async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;

        if bytes.is_empty() {
            return Err(bad_request_error("Uploaded image is empty"));
        }

        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        });
    }

    Err(AppError::BadRequest(format!("Missing '{}' field in upload", IMAGE_FIELD)))
}

async fn analyze_zone(
    State(state): State<AppState>,
    AppJson(request): AppJson<ZoneAnalysisApiRequest>,
) -> Result<Json<ApiResponse<IncidentResponse>>, AppError> {
    let controller = AnalysisController::new(&state);
    let response = controller.analyze_zone(request).await?;
    Ok(Json(response))
}

async fn current_heatmap(State(state): State<AppState>) -> Json<ApiResponse<Option<HeatmapSnapshot>>> {
    let controller = AnalysisController::new(&state);
    Json(ApiResponse::success(controller.heatmap().await))
}

async fn search_location(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LocationSearchQuery>,
) -> Result<Json<ApiResponse<LocationResponse>>, AppError> {
    let controller = AnalysisController::new(&state);
    let response = controller.search_location(query).await?;
    Ok(Json(response))
}
