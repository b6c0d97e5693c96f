//! Controlador de análisis
//!
//! Orquesta las llamadas al backend de análisis y aplica los resultados al
//! estado del panel. Los locks se toman solo antes y después de cada llamada
//! remota, nunca durante.

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::dto::analysis_dto::{ImageAnalysisResponse, LocationResponse, LocationSearchQuery, ZoneAnalysisApiRequest};
use crate::dto::api_response::ApiResponse;
use crate::dto::incident_dto::IncidentResponse;
use crate::models::analysis::{format_risk_percent, LiveUpdate};
use crate::models::incident::FireIncident;
use crate::models::notification::Notification;
use crate::repositories::incident_repository::IncidentRepository;
use crate::services::analysis_backend::{FireAnalysisBackend, ImageUpload, ZoneAnalysisRequest};
use crate::services::dashboard_state::{DashboardState, HeatmapSnapshot};
use crate::services::live_channel::LiveChannel;
use crate::state::AppState;
use crate::utils::clock::Clock;
use crate::utils::errors::AppError;

/// Por encima de este riesgo una imagen se marca como peligrosa
pub const RISK_WARNING_THRESHOLD: f64 = 0.5;
/// Por encima de este riesgo se emite una alerta
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

pub struct AnalysisController {
    backend: Arc<dyn FireAnalysisBackend>,
    dashboard: Arc<RwLock<DashboardState>>,
    incidents: Arc<RwLock<IncidentRepository>>,
    live: LiveChannel,
    clock: Arc<dyn Clock>,
}

impl AnalysisController {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            dashboard: state.dashboard.clone(),
            incidents: state.incidents.clone(),
            live: state.live.clone(),
            clock: state.clock.clone(),
        }
    }

    pub async fn analyze_image(&self, upload: ImageUpload) -> Result<ApiResponse<ImageAnalysisResponse>, AppError> {
        let ticket = self.dashboard.write().await.begin_analysis();

        let result = self.backend.analyze_image(upload).await?;
        tracing::debug!(
            dimensions = ?result.heatmap_data.dimensions(),
            risk_level = result.risk_level,
            "Image analysis received"
        );

        let applied = self.dashboard.write().await.apply_analysis(
            ticket,
            result.heatmap_data.clone(),
            result.risk_level,
            self.clock.now(),
        );

        let risk_level = result.risk_level;
        let mut response = ApiResponse::success(ImageAnalysisResponse::new(result, applied));
        if risk_level > RISK_WARNING_THRESHOLD {
            response = response.with_notification(Notification::high_risk_detected(risk_level));
        }

        let description = format!("Fire risk level: {}", format_risk_percent(risk_level));
        let complete = if risk_level > HIGH_RISK_THRESHOLD {
            Notification::error("Analysis Complete", description)
        } else {
            Notification::info("Analysis Complete", description)
        };
        Ok(response.with_notification(complete))
    }

    /// Analizar una zona y registrar el incidente resultante
    pub async fn analyze_zone(&self, request: ZoneAnalysisApiRequest) -> Result<ApiResponse<IncidentResponse>, AppError> {
        request.validate()?;

        let remote_request = ZoneAnalysisRequest::from(&request);
        let analysis = self.backend.analyze_zone(&remote_request).await?;

        let incident = FireIncident::new(
            request.lat,
            request.lon,
            analysis.risk_level,
            request.location_name,
            request.zone_type,
            self.clock.now(),
        );
        self.incidents.write().await.append(incident.clone());

        let mut response = ApiResponse::success_with_message(
            IncidentResponse::from(&incident),
            format!("Incident recorded at {}", incident.location_name),
        );
        if incident.risk_level > HIGH_RISK_THRESHOLD {
            let notification = Notification::error(
                "High Risk Zone",
                format!(
                    "{} ({}): fire risk level {}",
                    incident.location_name,
                    incident.zone_type,
                    format_risk_percent(incident.risk_level)
                ),
            );
            self.live.notify(notification.clone());
            response = response.with_notification(notification);
        }
        Ok(response)
    }

    pub async fn search_location(&self, query: LocationSearchQuery) -> Result<ApiResponse<LocationResponse>, AppError> {
        let ticket = self.dashboard.write().await.begin_location_search();

        let location = self.backend.geocode(query.address.trim()).await?;

        let applied = self.dashboard.write().await.apply_location(ticket, location.clone());
        Ok(ApiResponse::success(LocationResponse { location, applied }))
    }

    pub async fn heatmap(&self) -> Option<HeatmapSnapshot> {
        self.dashboard.read().await.heatmap().cloned()
    }

    /// Recibir una actualización en vivo y reenviarla a los suscriptores
    pub async fn ingest_live(&self, update: LiveUpdate) -> Result<ApiResponse<LiveUpdate>, AppError> {
        update.validate()?;

        self.dashboard.write().await.apply_live(&update, self.clock.now());
        self.live.publish_update(update.clone());

        let max_risk = update.max_risk;
        let mut response = ApiResponse::success_with_message(update, "Live update received".to_string());
        if max_risk > HIGH_RISK_THRESHOLD {
            let notification = Notification::high_risk_alert(max_risk);
            self.live.notify(notification.clone());
            response = response.with_notification(notification);
        }
        Ok(response)
    }
}
