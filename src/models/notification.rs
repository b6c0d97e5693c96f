//! Notificaciones para el usuario
//!
//! Equivalente tipado de los toasts del panel. Se adjuntan a las respuestas
//! HTTP y se empujan por el canal en vivo.

use serde::{Deserialize, Serialize};

use super::analysis::format_risk_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, description)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, description)
    }

    /// Riesgo alto detectado en una imagen analizada
    pub fn high_risk_detected(risk_level: f64) -> Self {
        Self::error(
            "High Risk Detected",
            format!("Fire risk level: {}", format_risk_percent(risk_level)),
        )
    }

    /// Alerta de riesgo alto recibida por el canal en vivo
    pub fn high_risk_alert(max_risk: f64) -> Self {
        Self::error(
            "High Risk Alert!",
            format!("Fire risk level: {}", format_risk_percent(max_risk)),
        )
    }
}
