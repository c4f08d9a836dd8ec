// src/db/sale_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{PaymentMethod, Sale, SaleStatus},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
        partner_id: Option<Uuid>,
        click_id: Option<Uuid>,
        customer_name: &str,
        customer_whatsapp: &str,
        customer_city: &str,
        quantity: i32,
        unit_price: Decimal,
        total_amount: Decimal,
        commission_amount: Decimal,
        payment_method: PaymentMethod,
        is_door_to_door: bool,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                raffle_id, partner_id, click_id,
                customer_name, customer_whatsapp, customer_city,
                quantity, unit_price, total_amount, commission_amount,
                payment_method, is_door_to_door
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(raffle_id)
        .bind(partner_id)
        .bind(click_id)
        .bind(customer_name)
        .bind(customer_whatsapp)
        .bind(customer_city)
        .bind(quantity)
        .bind(unit_price)
        .bind(total_amount)
        .bind(commission_amount)
        .bind(payment_method)
        .bind(is_door_to_door)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    // Trava a linha da venda durante acerto/cancelamento porta a porta.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    // Usada na finalização do checkout: trava a linha da venda para que
    // dois polls simultâneos do storefront não finalizem a mesma venda.
    pub async fn find_by_session_for_update<'e, E>(
        &self,
        executor: E,
        session_id: &str,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE checkout_session_id = $1 FOR UPDATE",
        )
        .bind(session_id)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    pub async fn set_session_id<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        session_id: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET checkout_session_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(session_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SaleNotFound)?;
        Ok(sale)
    }

    pub async fn mark_completed<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        stamp_settlement: bool,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET status = $2,
                settled_at = CASE WHEN $3 THEN NOW() ELSE settled_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(SaleStatus::Completed)
        .bind(stamp_settlement)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SaleNotFound)?;
        Ok(sale)
    }

    pub async fn mark_cancelled<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        reason: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET status = $2, cancellation_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(SaleStatus::Cancelled)
        .bind(reason)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SaleNotFound)?;
        Ok(sale)
    }

    pub async fn list_by_partner<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE partner_id = $1 ORDER BY created_at DESC",
        )
        .bind(partner_id)
        .fetch_all(executor)
        .await?;
        Ok(sales)
    }

    // Soma das comissões que já contam para o saldo (vendas COMPLETED).
    pub async fn sum_commission<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(commission_amount), 0)
            FROM sales
            WHERE partner_id = $1 AND status = $2
            "#,
        )
        .bind(partner_id)
        .bind(SaleStatus::Completed)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn partner_sales_aggregates<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<(i64, Decimal), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE partner_id = $1 AND status = $2
            "#,
        )
        .bind(partner_id)
        .bind(SaleStatus::Completed)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn count_pending_door_to_door<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM sales
            WHERE partner_id = $1 AND is_door_to_door AND status = $2
            "#,
        )
        .bind(partner_id)
        .bind(SaleStatus::Pending)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }
}
