//! Modelos de análisis de riesgo
//!
//! Resultados que devuelve el backend de análisis de incendios: análisis de
//! imagen, actualizaciones en vivo y ubicaciones geocodificadas.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Datos del heatmap tal como llegan del backend.
///
/// El contrato es una matriz numérica; el backend histórico envía además una
/// figura JSON opaca, que se conserva sin interpretar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeatmapData {
    Grid(Vec<Vec<f64>>),
    Figure(serde_json::Value),
}

impl HeatmapData {
    /// Valor máximo de la matriz (None para figuras opacas o matrices vacías)
    pub fn max_value(&self) -> Option<f64> {
        match self {
            HeatmapData::Grid(rows) => rows
                .iter()
                .flatten()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v)))),
            HeatmapData::Figure(_) => None,
        }
    }

    /// Dimensiones (filas, columnas) de la matriz
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        match self {
            HeatmapData::Grid(rows) => Some((rows.len(), rows.first().map_or(0, |r| r.len()))),
            HeatmapData::Figure(_) => None,
        }
    }
}

/// Resultado del análisis de una imagen subida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_level: f64,
    pub heatmap_data: HeatmapData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Evento del canal en vivo. Los riesgos son fracciones en [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LiveUpdate {
    pub heatmap_data: Option<HeatmapData>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_risk: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub avg_risk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_zones: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Ubicación geocodificada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
}

/// Formatear un nivel de riesgo [0,1] como porcentaje con un decimal
pub fn format_risk_percent(risk: f64) -> String {
    format!("{:.1}%", risk * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heatmap_grid_decoding() {
        let data: HeatmapData = serde_json::from_value(json!([[0.1, 0.9], [0.4, 0.2]])).unwrap();
        assert_eq!(data.max_value(), Some(0.9));
        assert_eq!(data.dimensions(), Some((2, 2)));
    }

    #[test]
    fn test_heatmap_figure_is_kept_opaque() {
        let data: HeatmapData =
            serde_json::from_value(json!({ "data": [{ "type": "heatmap" }], "layout": {} })).unwrap();
        assert!(matches!(data, HeatmapData::Figure(_)));
        assert_eq!(data.max_value(), None);
    }

    #[test]
    fn test_format_risk_percent() {
        assert_eq!(format_risk_percent(0.75), "75.0%");
        assert_eq!(format_risk_percent(1.0), "100.0%");
        assert_eq!(format_risk_percent(0.0), "0.0%");
    }

    #[test]
    fn test_live_update_risk_range() {
        let update: LiveUpdate =
            serde_json::from_value(json!({ "heatmap_data": null, "max_risk": 0.85, "avg_risk": 0.3 })).unwrap();
        assert!(update.validate().is_ok());

        let too_high: LiveUpdate = serde_json::from_value(json!({ "heatmap_data": null, "max_risk": 42.0 })).unwrap();
        assert!(too_high.validate().is_err());

        let negative_avg: LiveUpdate =
            serde_json::from_value(json!({ "heatmap_data": null, "max_risk": 0.2, "avg_risk": -0.1 })).unwrap();
        assert!(negative_avg.validate().is_err());
    }
}
