//! Estado de visualización del panel
//!
//! Guarda el último heatmap mostrado y la ubicación actual del incidente.
//! Las respuestas remotas que llegan después de una acción más reciente del
//! usuario se descartan: cada petición recibe un ticket y solo el ticket más
//! nuevo puede escribir.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::analysis::{HeatmapData, LiveUpdate, Location};

/// Ticket de una petición remota en curso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Secuencia de tickets para un tipo de petición
#[derive(Debug, Default)]
struct RequestSequence {
    issued: u64,
}

impl RequestSequence {
    fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapSource {
    ImageAnalysis,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSnapshot {
    pub source: HeatmapSource,
    pub heatmap_data: HeatmapData,
    pub risk_level: f64,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    analysis: RequestSequence,
    location_search: RequestSequence,
    heatmap: Option<HeatmapSnapshot>,
    location: Option<Location>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_analysis(&mut self) -> RequestTicket {
        self.analysis.begin()
    }

    /// Aplicar un resultado de análisis de imagen si su ticket sigue vigente
    pub fn apply_analysis(
        &mut self,
        ticket: RequestTicket,
        heatmap_data: HeatmapData,
        risk_level: f64,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.analysis.is_current(ticket) {
            tracing::debug!(?ticket, "Discarding stale image analysis result");
            return false;
        }

        self.heatmap = Some(HeatmapSnapshot {
            source: HeatmapSource::ImageAnalysis,
            heatmap_data,
            risk_level,
            received_at: now,
        });
        true
    }

    /// Las actualizaciones en vivo siempre ganan (última escritura)
    pub fn apply_live(&mut self, update: &LiveUpdate, now: DateTime<Utc>) {
        if let Some(heatmap_data) = &update.heatmap_data {
            self.heatmap = Some(HeatmapSnapshot {
                source: HeatmapSource::Live,
                heatmap_data: heatmap_data.clone(),
                risk_level: update.max_risk,
                received_at: now,
            });
        }
    }

    pub fn heatmap(&self) -> Option<&HeatmapSnapshot> {
        self.heatmap.as_ref()
    }

    pub fn begin_location_search(&mut self) -> RequestTicket {
        self.location_search.begin()
    }

    pub fn apply_location(&mut self, ticket: RequestTicket, location: Location) -> bool {
        if !self.location_search.is_current(ticket) {
            tracing::debug!(?ticket, "Discarding stale location search result");
            return false;
        }
        self.location = Some(location);
        true
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}
