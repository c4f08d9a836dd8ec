// src/models/report.rs
//
// Relatórios financeiros do back-office. Tudo agregado na leitura.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    #[schema(example = "540.00")]
    pub sales_today: Decimal,
    #[schema(example = "12500.00")]
    pub gross_total: Decimal,
    #[schema(example = "3750.00")]
    pub commission_total: Decimal,
    // Líquido da casa: bruto menos comissões.
    #[schema(example = "8750.00")]
    pub net_total: Decimal,
    pub pending_withdrawals: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaffleReportRow {
    pub raffle_id: Uuid,
    pub title: String,
    pub sales_count: i64,
    pub numbers_sold: i64,
    pub gross: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPartnerRow {
    pub partner_id: Uuid,
    pub name: String,
    pub sales_count: i64,
    pub gross: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminReport {
    pub summary: FinancialSummary,
    pub raffles: Vec<RaffleReportRow>,
    pub top_partners: Vec<TopPartnerRow>,
}
