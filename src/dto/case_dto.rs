use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::case_report::{CaseReport, CaseStatus};

// Request para enviar un caso a estudio
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCaseRequest {
    #[serde(default)]
    pub status: CaseStatus,

    #[validate(length(max = 5000), custom = "not_blank")]
    #[serde(default)]
    pub description: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Please provide a description of the situation.".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CaseResponse {
    pub id: Uuid,
    pub status: CaseStatus,
    pub status_summary: String,
    pub description: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<&CaseReport> for CaseResponse {
    fn from(report: &CaseReport) -> Self {
        Self {
            id: report.id,
            status: report.status,
            status_summary: report.status.summary().to_string(),
            description: report.description.clone(),
            submitted_at: report.submitted_at,
        }
    }
}
