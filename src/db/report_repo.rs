// src/db/report_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::report::{FinancialSummary, RaffleReportRow, TopPartnerRow},
};

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resumo geral do back-office. Uma transação para um snapshot
    // consistente das somas.
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<FinancialSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Vendas de Hoje
        let sales_today = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE status = 'COMPLETED' AND created_at::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Bruto e comissões acumulados
        let (gross_total, commission_total): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COALESCE(SUM(commission_amount), 0)
            FROM sales
            WHERE status = 'COMPLETED'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Saques aguardando revisão
        let pending_withdrawals = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE status = 'PENDING'",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FinancialSummary {
            sales_today,
            gross_total,
            commission_total,
            net_total: gross_total - commission_total,
            pending_withdrawals,
        })
    }

    // Fechamento por rifa.
    pub async fn get_raffle_rows<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<RaffleReportRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, RaffleReportRow>(
            r#"
            SELECT
                r.id AS raffle_id,
                r.title,
                COUNT(s.id) AS sales_count,
                COALESCE(SUM(s.quantity), 0)::bigint AS numbers_sold,
                COALESCE(SUM(s.total_amount), 0) AS gross,
                COALESCE(SUM(s.commission_amount), 0) AS commission
            FROM raffles r
            LEFT JOIN sales s ON s.raffle_id = r.id AND s.status = 'COMPLETED'
            GROUP BY r.id, r.title
            ORDER BY gross DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // Top 5 parceiros por receita gerada.
    pub async fn get_top_partners<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<TopPartnerRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TopPartnerRow>(
            r#"
            SELECT
                p.id AS partner_id,
                p.name,
                COUNT(s.id) AS sales_count,
                COALESCE(SUM(s.total_amount), 0) AS gross,
                COALESCE(SUM(s.commission_amount), 0) AS commission
            FROM profiles p
            JOIN sales s ON s.partner_id = p.id AND s.status = 'COMPLETED'
            WHERE p.role = 'PARTNER'
            GROUP BY p.id, p.name
            ORDER BY gross DESC
            LIMIT 5
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
