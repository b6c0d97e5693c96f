//! Modelo de CaseReport
//!
//! Reportes de caso enviados desde el panel para estudio posterior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado del caso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Pending,
    InProcess,
    Rejected,
}

impl CaseStatus {
    /// Texto que acompaña al estado en el panel
    pub fn summary(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "Pending inspection. Awaiting review.",
            CaseStatus::InProcess => "Inspection in process.",
            CaseStatus::Rejected => "Application rejected.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: Uuid,
    pub status: CaseStatus,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

impl CaseReport {
    pub fn new(status: CaseStatus, description: &str, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            description: description.trim().to_string(),
            submitted_at,
        }
    }
}
