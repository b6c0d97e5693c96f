//! Cliente del backend de análisis de incendios
//!
//! Todo el cálculo (segmentación, riesgo, geocodificación) vive en un servicio
//! externo. Este módulo define el contrato como trait y una implementación
//! HTTP con reqwest. Sin reintentos ni cache: un fallo se reporta tal cual.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::analysis::{AnalysisResult, HeatmapData, Location};
use crate::models::incident::ZoneType;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::RemoteCallFailed("request timed out".to_string())
        } else {
            BackendError::RemoteCallFailed(e.to_string())
        }
    }
}

/// Imagen subida por el usuario
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAnalysisRequest {
    pub zone_type: ZoneType,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAnalysisResponse {
    pub risk_level: f64,
    #[serde(default)]
    pub heatmap_data: Option<HeatmapData>,
}

/// Cuerpo de error que devuelve el backend (`{"error": "..."}`)
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
}

#[async_trait]
pub trait FireAnalysisBackend: Send + Sync {
    async fn analyze_image(&self, upload: ImageUpload) -> Result<AnalysisResult, BackendError>;

    async fn analyze_zone(&self, request: &ZoneAnalysisRequest) -> Result<ZoneAnalysisResponse, BackendError>;

    async fn geocode(&self, address: &str) -> Result<Location, BackendError>;
}

pub struct HttpFireAnalysisBackend {
    base_url: String,
    client: Client,
}

impl HttpFireAnalysisBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("FireDispatch/1.0")
            .build()
            .map_err(|e| BackendError::RemoteCallFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T, BackendError> {
        let status = response.status();
        log::info!("📡 {} response status: {}", operation, status);

        if !status.is_success() {
            let message = Self::error_message(response).await;
            log::error!("❌ {} failed with status {}: {}", operation, status, message);
            return Err(BackendError::RemoteCallFailed(format!("{} returned {}: {}", operation, status, message)));
        }

        response.json::<T>().await.map_err(|e| {
            log::error!("❌ Failed to parse {} response: {}", operation, e);
            BackendError::RemoteCallFailed(format!("Failed to parse {} response: {}", operation, e))
        })
    }

    /// El riesgo remoto es una fracción en [0, 1]
    fn ensure_risk_range(risk_level: f64, operation: &str) -> Result<(), BackendError> {
        if risk_level.is_finite() && (0.0..=1.0).contains(&risk_level) {
            return Ok(());
        }
        log::error!("❌ {} returned an out-of-range risk level: {}", operation, risk_level);
        Err(BackendError::RemoteCallFailed(format!(
            "{} returned an out-of-range risk level: {}",
            operation, risk_level
        )))
    }

    async fn error_message(response: Response) -> String {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<BackendErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(text)
    }
}

#[async_trait]
impl FireAnalysisBackend for HttpFireAnalysisBackend {
    async fn analyze_image(&self, upload: ImageUpload) -> Result<AnalysisResult, BackendError> {
        log::info!("🖼️ Uploading image '{}' ({} bytes) for analysis", upload.filename, upload.bytes.len());

        let mut part = Part::bytes(upload.bytes).file_name(upload.filename);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| BackendError::RemoteCallFailed(format!("Invalid content type: {}", e)))?;
        }
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.endpoint("analyze_image"))
            .multipart(form)
            .send()
            .await?;

        let result: AnalysisResult = Self::decode(response, "Image analysis").await?;
        Self::ensure_risk_range(result.risk_level, "Image analysis")?;
        Ok(result)
    }

    async fn analyze_zone(&self, request: &ZoneAnalysisRequest) -> Result<ZoneAnalysisResponse, BackendError> {
        log::info!("🗺️ Analyzing {} zone at ({}, {})", request.zone_type, request.lat, request.lon);

        let response = self
            .client
            .post(self.endpoint("analyze_zone"))
            .json(request)
            .send()
            .await?;

        let analysis: ZoneAnalysisResponse = Self::decode(response, "Zone analysis").await?;
        Self::ensure_risk_range(analysis.risk_level, "Zone analysis")?;
        Ok(analysis)
    }

    async fn geocode(&self, address: &str) -> Result<Location, BackendError> {
        log::info!("🗺️ Geocoding address: {}", address);

        let address = address.trim();
        let url = if address.is_empty() {
            // sin dirección el backend resuelve la ubicación por IP
            self.endpoint("search_location")
        } else {
            format!("{}?address={}", self.endpoint("search_location"), urlencoding::encode(address))
        };

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            let message = Self::error_message(response).await;
            log::warn!("⚠️ No coordinates found for address: {}", address);
            let message = if message.trim().is_empty() {
                address.to_string()
            } else {
                message
            };
            return Err(BackendError::LocationNotFound(message));
        }

        let location: Location = Self::decode(response, "Geocoding").await?;
        log::info!("✅ Geocoding successful: {} -> ({}, {})", address, location.lat, location.lon);
        Ok(location)
    }
}
