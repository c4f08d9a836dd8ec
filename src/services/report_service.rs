// src/services/report_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::report::AdminReport,
};

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    pool: PgPool,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository, pool: PgPool) -> Self {
        Self { report_repo, pool }
    }

    pub async fn full_report(&self) -> Result<AdminReport, AppError> {
        let summary = self.report_repo.get_summary(&self.pool).await?;
        let raffles = self.report_repo.get_raffle_rows(&self.pool).await?;
        let top_partners = self.report_repo.get_top_partners(&self.pool).await?;

        Ok(AdminReport {
            summary,
            raffles,
            top_partners,
        })
    }
}
