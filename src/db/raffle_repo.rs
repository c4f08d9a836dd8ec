// src/db/raffle_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::raffle::{Raffle, RaffleStatus, WinningNumber},
};

#[derive(Clone)]
pub struct RaffleRepository {
    pool: PgPool,
}

impl RaffleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  RIFAS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        title: &str,
        description: Option<&str>,
        total_numbers: i32,
        price_per_number: Decimal,
        discount_price: Option<Decimal>,
        discount_min_quantity: Option<i32>,
        commission_rate: Decimal,
        draw_date: Option<DateTime<Utc>>,
        image_url: Option<&str>,
    ) -> Result<Raffle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle = sqlx::query_as::<_, Raffle>(
            r#"
            INSERT INTO raffles (
                title, description, total_numbers, price_per_number,
                discount_price, discount_min_quantity, commission_rate,
                draw_date, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(total_numbers)
        .bind(price_per_number)
        .bind(discount_price)
        .bind(discount_min_quantity)
        .bind(commission_rate)
        .bind(draw_date)
        .bind(image_url)
        .fetch_one(executor)
        .await?;

        Ok(raffle)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Raffle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle = sqlx::query_as::<_, Raffle>("SELECT * FROM raffles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(raffle)
    }

    // Trava a linha da rifa dentro da transação corrente. É esse lock
    // que serializa alocações concorrentes de números da mesma rifa.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Raffle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle =
            sqlx::query_as::<_, Raffle>("SELECT * FROM raffles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(raffle)
    }

    // A vitrine trabalha com uma única rifa ativa por vez.
    pub async fn find_active<'e, E>(&self, executor: E) -> Result<Option<Raffle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle = sqlx::query_as::<_, Raffle>(
            "SELECT * FROM raffles WHERE status = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(RaffleStatus::Active)
        .fetch_optional(executor)
        .await?;
        Ok(raffle)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Raffle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffles =
            sqlx::query_as::<_, Raffle>("SELECT * FROM raffles ORDER BY created_at DESC")
                .fetch_all(executor)
                .await?;
        Ok(raffles)
    }

    // Campos de precificação/comissão editados pelo admin no formulário.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_config<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        price_per_number: Option<Decimal>,
        discount_price: Option<Decimal>,
        discount_min_quantity: Option<i32>,
        commission_rate: Option<Decimal>,
        draw_date: Option<DateTime<Utc>>,
        image_url: Option<&str>,
    ) -> Result<Raffle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle = sqlx::query_as::<_, Raffle>(
            r#"
            UPDATE raffles
            SET title                 = COALESCE($2, title),
                description           = COALESCE($3, description),
                price_per_number      = COALESCE($4, price_per_number),
                discount_price        = COALESCE($5, discount_price),
                discount_min_quantity = COALESCE($6, discount_min_quantity),
                commission_rate       = COALESCE($7, commission_rate),
                draw_date             = COALESCE($8, draw_date),
                image_url             = COALESCE($9, image_url),
                updated_at            = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(price_per_number)
        .bind(discount_price)
        .bind(discount_min_quantity)
        .bind(commission_rate)
        .bind(draw_date)
        .bind(image_url)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RaffleNotFound)?;

        Ok(raffle)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RaffleStatus,
    ) -> Result<Raffle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let raffle = sqlx::query_as::<_, Raffle>(
            r#"
            UPDATE raffles
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RaffleNotFound)?;

        Ok(raffle)
    }

    // =========================================================================
    //  NÚMEROS COMPRADOS
    // =========================================================================

    pub async fn list_purchased_numbers<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
    ) -> Result<Vec<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let numbers = sqlx::query_scalar::<_, i32>(
            "SELECT number FROM purchased_numbers WHERE raffle_id = $1",
        )
        .bind(raffle_id)
        .fetch_all(executor)
        .await?;
        Ok(numbers)
    }

    pub async fn count_purchased<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchased_numbers WHERE raffle_id = $1",
        )
        .bind(raffle_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // Insere todos os números da venda de uma vez (UNNEST). Se a UNIQUE
    // (raffle_id, number) estourar, outra venda levou um dos números no
    // meio do caminho: o chamador decide se tenta de novo.
    pub async fn insert_purchased_numbers<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
        sale_id: Uuid,
        numbers: &[i32],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO purchased_numbers (raffle_id, sale_id, number)
            SELECT $1, $2, n FROM UNNEST($3::int4[]) AS n
            "#,
        )
        .bind(raffle_id)
        .bind(sale_id)
        .bind(numbers)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NumberAlreadyTaken;
                }
            }
            e.into()
        })?;

        Ok(())
    }

    pub async fn numbers_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let numbers = sqlx::query_scalar::<_, i32>(
            "SELECT number FROM purchased_numbers WHERE sale_id = $1 ORDER BY number ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(numbers)
    }

    // Libera os números de uma venda porta a porta cancelada.
    pub async fn delete_numbers_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM purchased_numbers WHERE sale_id = $1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  NÚMEROS PREMIADOS
    // =========================================================================

    pub async fn insert_winning_number<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
        number: i32,
        prize: &str,
    ) -> Result<WinningNumber, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let winning = sqlx::query_as::<_, WinningNumber>(
            r#"
            INSERT INTO winning_numbers (raffle_id, number, prize)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(raffle_id)
        .bind(number)
        .bind(prize)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "winning_numbers_raffle_id_number_key".to_string(),
                    );
                }
            }
            e.into()
        })?;

        Ok(winning)
    }

    pub async fn list_winning_numbers<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
    ) -> Result<Vec<WinningNumber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let winners = sqlx::query_as::<_, WinningNumber>(
            "SELECT * FROM winning_numbers WHERE raffle_id = $1 ORDER BY number ASC",
        )
        .bind(raffle_id)
        .fetch_all(executor)
        .await?;
        Ok(winners)
    }

    // Marca como reivindicados os números premiados que acabaram de sair
    // nesta venda e retorna só os que realmente bateram.
    pub async fn claim_winning_numbers<'e, E>(
        &self,
        executor: E,
        raffle_id: Uuid,
        sale_id: Uuid,
        numbers: &[i32],
    ) -> Result<Vec<WinningNumber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claimed = sqlx::query_as::<_, WinningNumber>(
            r#"
            UPDATE winning_numbers
            SET claimed_by_sale_id = $2
            WHERE raffle_id = $1
              AND number = ANY($3)
              AND claimed_by_sale_id IS NULL
            RETURNING *
            "#,
        )
        .bind(raffle_id)
        .bind(sale_id)
        .bind(numbers)
        .fetch_all(executor)
        .await?;
        Ok(claimed)
    }

    // Prêmios que já saíram para uma venda (usado na resposta idempotente
    // do verify-payment).
    pub async fn list_claimed_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<WinningNumber>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claimed = sqlx::query_as::<_, WinningNumber>(
            "SELECT * FROM winning_numbers WHERE claimed_by_sale_id = $1 ORDER BY number ASC",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(claimed)
    }

    pub async fn flag_winner_numbers<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        numbers: &[i32],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE purchased_numbers SET is_winner = TRUE WHERE sale_id = $1 AND number = ANY($2)",
        )
        .bind(sale_id)
        .bind(numbers)
        .execute(executor)
        .await?;
        Ok(())
    }
}
