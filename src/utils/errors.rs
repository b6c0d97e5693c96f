//! Sistema de manejo de errores
//!
//! Este módulo define los errores de la API y su conversión a respuestas
//! HTTP. Los errores del registro de despacho y los del backend remoto se
//! mantienen separados hasta este punto.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::notification::Notification;
use crate::repositories::dispatch_registry::DispatchError;
use crate::repositories::incident_repository::IncidentNotFound;
use crate::services::analysis_backend::BackendError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::LocationNotFound(msg) => AppError::NotFound(msg),
            BackendError::RemoteCallFailed(msg) => AppError::RemoteCallFailed(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // Sin parámetros de ruta es un error de enrutado, no del cliente
        if rejection.status().is_server_error() {
            return AppError::Internal(rejection.body_text());
        }
        AppError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<IncidentNotFound> for AppError {
    fn from(e: IncidentNotFound) -> Self {
        AppError::NotFound(e.to_string())
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
    notification: Notification,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str, notification: Notification) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
            details: None,
            code: code.to_string(),
            notification,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Dispatch(DispatchError::NoVehiclesAvailable) => {
                tracing::warn!("Dispatch requested but no vehicles could be selected");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new(
                        "No Vehicles Available",
                        DispatchError::NoVehiclesAvailable.to_string(),
                        "NO_VEHICLES_AVAILABLE",
                        Notification::warning(
                            "No Vehicles Available",
                            "Please select a quantity for at least one vehicle type.",
                        ),
                    ),
                )
            }

            AppError::Dispatch(DispatchError::NotFound(id)) => {
                tracing::warn!("Vehicle not found: {}", id);
                let message = format!("Vehicle {} not found", id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", message.clone(), "NOT_FOUND", Notification::error("Not Found", message)),
                )
            }

            AppError::Dispatch(DispatchError::StaleProposal(stale)) => {
                let ids: Vec<String> = stale.iter().map(|id| id.to_string()).collect();
                let message = DispatchError::StaleProposal(stale).to_string();
                tracing::warn!("Stale dispatch proposal: {}", message);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new(
                        "Conflict",
                        message,
                        "STALE_PROPOSAL",
                        Notification::warning(
                            "Dispatch Outdated",
                            "Some vehicles are no longer available. Please review the selection again.",
                        ),
                    )
                    .with_details(json!({ "stale_vehicle_ids": ids })),
                )
            }

            AppError::Dispatch(e @ DispatchError::InvalidTransition { .. }) => {
                tracing::warn!("Invalid vehicle transition: {}", e);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new(
                        "Conflict",
                        e.to_string(),
                        "INVALID_TRANSITION",
                        Notification::error("Action Not Allowed", e.to_string()),
                    ),
                )
            }

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "Validation Error",
                        "The provided data is invalid".to_string(),
                        "VALIDATION_ERROR",
                        Notification::error("Error", "Please review the submitted data."),
                    )
                    .with_details(json!(e)),
                )
            }

            AppError::RemoteCallFailed(msg) => {
                tracing::error!("Remote call failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(
                        "Remote Call Failed",
                        "An error occurred while communicating with the analysis service".to_string(),
                        "REMOTE_CALL_FAILED",
                        Notification::error("Request Failed", "Please try again"),
                    )
                    .with_details(json!({ "remote_error": msg })),
                )
            }

            AppError::NotFound(msg) => {
                tracing::warn!("Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", msg.clone(), "NOT_FOUND", Notification::error("Not Found", msg)),
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Bad Request", msg.clone(), "BAD_REQUEST", Notification::warning("Bad Request", msg)),
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        "INTERNAL_ERROR",
                        Notification::error("Error", "An unexpected error occurred"),
                    )
                    .with_details(json!({ "internal_error": msg })),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
