use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::analysis::{format_risk_percent, AnalysisResult, HeatmapData, Location};
use crate::models::incident::ZoneType;
use crate::models::vehicle::VehicleType;
use crate::services::analysis_backend::ZoneAnalysisRequest;

// Response del análisis de imagen
#[derive(Debug, Serialize)]
pub struct ImageAnalysisResponse {
    pub risk_level: f64,
    pub risk_percent: String,
    pub heatmap_data: HeatmapData,
    pub timestamp: Option<String>,
    /// false si una petición más reciente ya reemplazó este resultado
    pub applied: bool,
}

impl ImageAnalysisResponse {
    pub fn new(result: AnalysisResult, applied: bool) -> Self {
        Self {
            risk_level: result.risk_level,
            risk_percent: format_risk_percent(result.risk_level),
            heatmap_data: result.heatmap_data,
            timestamp: result.timestamp,
            applied,
        }
    }
}

// Request para analizar una zona
#[derive(Debug, Deserialize, Validate)]
pub struct ZoneAnalysisApiRequest {
    pub zone_type: ZoneType,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,

    #[validate(length(max = 200))]
    pub location_name: Option<String>,
}

impl From<&ZoneAnalysisApiRequest> for ZoneAnalysisRequest {
    fn from(request: &ZoneAnalysisApiRequest) -> Self {
        ZoneAnalysisRequest {
            zone_type: request.zone_type,
            lat: request.lat,
            lon: request.lon,
            location_name: request.location_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationSearchQuery {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: Location,
    pub applied: bool,
}

#[derive(Debug, Serialize)]
pub struct VehicleTypeOption {
    pub value: VehicleType,
    pub label: String,
}

// Configuración que necesita el panel para arrancar
#[derive(Debug, Serialize)]
pub struct DashboardConfigResponse {
    pub video_feed_url: String,
    pub display_tick_secs: u64,
    pub vehicle_types: Vec<VehicleTypeOption>,
}
