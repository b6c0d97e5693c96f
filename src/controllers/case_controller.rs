use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::case_dto::{CaseResponse, SubmitCaseRequest};
use crate::models::case_report::CaseReport;
use crate::models::notification::Notification;
use crate::repositories::case_repository::CaseRepository;
use crate::state::AppState;
use crate::utils::clock::Clock;
use crate::utils::errors::AppError;

pub struct CaseController {
    cases: Arc<RwLock<CaseRepository>>,
    clock: Arc<dyn Clock>,
}

impl CaseController {
    pub fn new(state: &AppState) -> Self {
        Self {
            cases: state.cases.clone(),
            clock: state.clock.clone(),
        }
    }

    pub async fn submit(&self, request: SubmitCaseRequest) -> Result<ApiResponse<CaseResponse>, AppError> {
        request.validate()?;

        let report = CaseReport::new(request.status, &request.description, self.clock.now());
        let report = self.cases.write().await.insert(report);

        let notification = Notification::success("Case Submitted", "Your case has been submitted for study.");
        Ok(ApiResponse::success_with_message(CaseResponse::from(&report), "Case submitted".to_string())
            .with_notification(notification))
    }

    pub async fn list(&self) -> Vec<CaseResponse> {
        self.cases.read().await.list().iter().map(CaseResponse::from).collect()
    }
}
