//! Repositorio de reportes de caso (en memoria)

use crate::models::case_report::CaseReport;

#[derive(Debug, Default)]
pub struct CaseRepository {
    reports: Vec<CaseReport>,
}

impl CaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, report: CaseReport) -> CaseReport {
        log::info!("📝 Case {} submitted with status {:?}", report.id, report.status);
        self.reports.push(report.clone());
        report
    }

    pub fn list(&self) -> &[CaseReport] {
        &self.reports
    }
}
