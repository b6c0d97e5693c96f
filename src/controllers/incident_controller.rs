use std::sync::Arc;

use tokio::sync::RwLock;

use crate::dto::api_response::ApiResponse;
use crate::dto::incident_dto::{IncidentMapResponse, IncidentResponse, UpdateZoneRequest};
use crate::repositories::incident_repository::IncidentRepository;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct IncidentController {
    incidents: Arc<RwLock<IncidentRepository>>,
}

impl IncidentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            incidents: state.incidents.clone(),
        }
    }

    pub async fn map(&self) -> IncidentMapResponse {
        let incidents = self.incidents.read().await;
        IncidentMapResponse {
            incidents: incidents.list().iter().map(IncidentResponse::from).collect(),
            heat_points: incidents.heat_points(),
        }
    }

    pub async fn update_zone(&self, request: UpdateZoneRequest) -> Result<ApiResponse<IncidentResponse>, AppError> {
        let incident = self
            .incidents
            .write()
            .await
            .update_zone(request.lat, request.lon, request.zone_type)?;

        let message = format!("Zone type updated to {}", incident.zone_type);
        Ok(ApiResponse::success_with_message(IncidentResponse::from(&incident), message))
    }
}
