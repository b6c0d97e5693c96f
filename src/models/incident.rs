//! Modelo de FireIncident
//!
//! Incidentes producidos por el análisis de zona. Se muestran en el mapa como
//! marcadores coloreados según su banda de riesgo y alimentan la capa de calor.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de zona analizada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Commercial,
    Residential,
    Industrial,
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneType::Commercial => "commercial",
            ZoneType::Residential => "residential",
            ZoneType::Industrial => "industrial",
        };
        f.write_str(name)
    }
}

/// Banda de riesgo usada para colorear marcadores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub const HIGH_THRESHOLD: f64 = 0.7;
    pub const MODERATE_THRESHOLD: f64 = 0.3;

    pub fn classify(risk_level: f64) -> Self {
        if risk_level > Self::HIGH_THRESHOLD {
            RiskBand::High
        } else if risk_level > Self::MODERATE_THRESHOLD {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    pub fn marker_color(&self) -> &'static str {
        match self {
            RiskBand::Low => "green",
            RiskBand::Moderate => "orange",
            RiskBand::High => "red",
        }
    }
}

/// Incidente de incendio registrado en el mapa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireIncident {
    pub id: Uuid,
    pub lat: f64,
    pub lon: f64,
    pub risk_level: f64,
    pub timestamp: DateTime<Utc>,
    pub location_name: String,
    pub zone_type: ZoneType,
}

impl FireIncident {
    pub const UNKNOWN_LOCATION: &'static str = "Unknown Location";

    pub fn new(
        lat: f64,
        lon: f64,
        risk_level: f64,
        location_name: Option<String>,
        zone_type: ZoneType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let location_name = location_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| Self::UNKNOWN_LOCATION.to_string());

        Self {
            id: Uuid::new_v4(),
            lat,
            lon,
            risk_level,
            timestamp,
            location_name,
            zone_type,
        }
    }

    pub fn risk_band(&self) -> RiskBand {
        RiskBand::classify(self.risk_level)
    }

    /// Punto `[lat, lon, riesgo]` para la capa de calor
    pub fn heat_point(&self) -> [f64; 3] {
        [self.lat, self.lon, self.risk_level]
    }
}
