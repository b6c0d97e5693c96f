//! Repositorio de incidentes
//!
//! Lista en memoria de los incidentes producidos por el análisis de zona.
//! Solo crece; nunca se poda.

use thiserror::Error;

use crate::models::incident::{FireIncident, ZoneType};

#[derive(Debug, Error, PartialEq)]
#[error("No incident found at ({lat}, {lon})")]
pub struct IncidentNotFound {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Default)]
pub struct IncidentRepository {
    incidents: Vec<FireIncident>,
}

impl IncidentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, incident: FireIncident) {
        log::info!(
            "🔥 Incident recorded at ({}, {}) risk {:.2} zone {}",
            incident.lat,
            incident.lon,
            incident.risk_level,
            incident.zone_type
        );
        self.incidents.push(incident);
    }

    pub fn list(&self) -> &[FireIncident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Puntos `[lat, lon, riesgo]` para la capa de calor
    pub fn heat_points(&self) -> Vec<[f64; 3]> {
        self.incidents.iter().map(FireIncident::heat_point).collect()
    }

    /// Corregir el tipo de zona del primer incidente con esas coordenadas exactas
    pub fn update_zone(&mut self, lat: f64, lon: f64, zone_type: ZoneType) -> Result<FireIncident, IncidentNotFound> {
        let incident = self
            .incidents
            .iter_mut()
            .find(|i| i.lat == lat && i.lon == lon)
            .ok_or(IncidentNotFound { lat, lon })?;

        incident.zone_type = zone_type;
        Ok(incident.clone())
    }
}
