use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::format_risk_percent;
use crate::models::incident::{FireIncident, RiskBand, ZoneType};

// Marcador de incidente para el mapa
#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub risk_level: f64,
    pub risk_percent: String,
    pub risk_band: RiskBand,
    pub marker_color: String,
    pub timestamp: DateTime<Utc>,
    pub location_name: String,
    pub zone_type: ZoneType,
}

impl From<&FireIncident> for IncidentResponse {
    fn from(incident: &FireIncident) -> Self {
        let band = incident.risk_band();
        Self {
            id: incident.id,
            lat: incident.lat,
            lon: incident.lon,
            risk_level: incident.risk_level,
            risk_percent: format_risk_percent(incident.risk_level),
            risk_band: band,
            marker_color: band.marker_color().to_string(),
            timestamp: incident.timestamp,
            location_name: incident.location_name.clone(),
            zone_type: incident.zone_type,
        }
    }
}

// Marcadores más capa de calor
#[derive(Debug, Serialize)]
pub struct IncidentMapResponse {
    pub incidents: Vec<IncidentResponse>,
    pub heat_points: Vec<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub lat: f64,
    pub lon: f64,
    pub zone_type: ZoneType,
}
