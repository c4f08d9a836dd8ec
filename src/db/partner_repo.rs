// src/db/partner_repo.rs
//
// Cliques no link de divulgação e saques de comissão.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::partner::{PartnerClick, Withdrawal, WithdrawalMethod, WithdrawalStatus},
};

#[derive(Clone)]
pub struct PartnerRepository {
    pool: PgPool,
}

impl PartnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIQUES
    // =========================================================================

    pub async fn insert_click<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
        referrer: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<PartnerClick, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let click = sqlx::query_as::<_, PartnerClick>(
            r#"
            INSERT INTO partner_clicks (partner_id, referrer, user_agent)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(partner_id)
        .bind(referrer)
        .bind(user_agent)
        .fetch_one(executor)
        .await?;
        Ok(click)
    }

    // Marca a conversão uma única vez (um clique vira no máximo uma venda).
    pub async fn mark_click_converted<'e, E>(
        &self,
        executor: E,
        click_id: Uuid,
        sale_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE partner_clicks
            SET converted = TRUE, sale_id = $2
            WHERE id = $1 AND NOT converted
            "#,
        )
        .bind(click_id)
        .bind(sale_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_clicks<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Vec<PartnerClick>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clicks = sqlx::query_as::<_, PartnerClick>(
            "SELECT * FROM partner_clicks WHERE partner_id = $1 ORDER BY created_at DESC",
        )
        .bind(partner_id)
        .fetch_all(executor)
        .await?;
        Ok(clicks)
    }

    pub async fn click_stats<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE converted)
            FROM partner_clicks
            WHERE partner_id = $1
            "#,
        )
        .bind(partner_id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // =========================================================================
    //  SAQUES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_withdrawal<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
        amount: Decimal,
        method: WithdrawalMethod,
        pix_key: Option<&str>,
        bank_name: Option<&str>,
        bank_agency: Option<&str>,
        bank_account: Option<&str>,
    ) -> Result<Withdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            INSERT INTO withdrawals (
                partner_id, amount, method,
                pix_key, bank_name, bank_agency, bank_account
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(partner_id)
        .bind(amount)
        .bind(method)
        .bind(pix_key)
        .bind(bank_name)
        .bind(bank_agency)
        .bind(bank_account)
        .fetch_one(executor)
        .await?;
        Ok(withdrawal)
    }

    pub async fn find_withdrawal<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawal =
            sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(withdrawal)
    }

    pub async fn list_withdrawals_by_partner<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Vec<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            "SELECT * FROM withdrawals WHERE partner_id = $1 ORDER BY created_at DESC",
        )
        .bind(partner_id)
        .fetch_all(executor)
        .await?;
        Ok(withdrawals)
    }

    pub async fn list_withdrawals_by_status<'e, E>(
        &self,
        executor: E,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT * FROM withdrawals
            WHERE ($1::withdrawal_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;
        Ok(withdrawals)
    }

    // Saldo já comprometido: saques processados ou aprovados.
    pub async fn sum_withdrawn<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM withdrawals
            WHERE partner_id = $1 AND status IN ($2, $3)
            "#,
        )
        .bind(partner_id)
        .bind(WithdrawalStatus::Processed)
        .bind(WithdrawalStatus::Approved)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn sum_pending<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM withdrawals
            WHERE partner_id = $1 AND status = $2
            "#,
        )
        .bind(partner_id)
        .bind(WithdrawalStatus::Pending)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn update_withdrawal_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: WithdrawalStatus,
        rejection_reason: Option<&str>,
        processed_at: Option<DateTime<Utc>>,
    ) -> Result<Withdrawal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            UPDATE withdrawals
            SET status = $2,
                rejection_reason = COALESCE($3, rejection_reason),
                processed_at = COALESCE($4, processed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(processed_at)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::WithdrawalNotFound)?;
        Ok(withdrawal)
    }
}
