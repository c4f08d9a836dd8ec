// src/services/raffle_service.rs
//
// Ciclo de vida das rifas e o sorteio de números. A alocação roda com a
// linha da rifa travada (SELECT ... FOR UPDATE): é o lock que fecha a
// janela entre "ler números livres" e "gravar números vendidos" quando
// dois compradores chegam juntos. A UNIQUE (raffle_id, number) fica de
// rede de segurança, com uma única retentativa.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::RaffleRepository,
    models::raffle::{Raffle, RaffleAvailability, RaffleStatus, WinningNumber},
};

#[derive(Clone)]
pub struct RaffleService {
    raffle_repo: RaffleRepository,
    pool: PgPool,
}

impl RaffleService {
    pub fn new(raffle_repo: RaffleRepository, pool: PgPool) -> Self {
        Self { raffle_repo, pool }
    }

    // =========================================================================
    //  ALOCAÇÃO DE NÚMEROS
    // =========================================================================

    /// Sorteia `quantity` números livres da rifa e grava todos em nome da
    /// venda. Deve ser chamada dentro da transação da venda: abre um
    /// savepoint próprio para poder retentar sem derrubar o chamador.
    pub async fn allocate_numbers(
        &self,
        conn: &mut PgConnection,
        raffle_id: Uuid,
        sale_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<i32>, AppError> {
        // Uma retentativa: colisão com o lock em mãos significa escrita
        // concorrente fora deste caminho, então na segunda falha a gente
        // devolve o erro em vez de insistir.
        for attempt in 0..2 {
            match self
                .try_allocate(&mut *conn, raffle_id, sale_id, quantity)
                .await
            {
                Err(AppError::NumberAlreadyTaken) if attempt == 0 => {
                    tracing::warn!(
                        "Colisão de número na rifa {}, retentando sorteio",
                        raffle_id
                    );
                    continue;
                }
                other => return other,
            }
        }
        Err(AppError::NumberAlreadyTaken)
    }

    async fn try_allocate(
        &self,
        conn: &mut PgConnection,
        raffle_id: Uuid,
        sale_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<i32>, AppError> {
        use sqlx::Acquire;
        let mut tx = conn.begin().await?;

        let raffle = self
            .raffle_repo
            .find_by_id_for_update(&mut *tx, raffle_id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        if raffle.status != RaffleStatus::Active {
            return Err(AppError::RaffleNotActive);
        }

        let used: HashSet<i32> = self
            .raffle_repo
            .list_purchased_numbers(&mut *tx, raffle_id)
            .await?
            .into_iter()
            .collect();

        let mut drawn = draw_free_numbers(
            raffle.total_numbers,
            &used,
            quantity as usize,
            &mut rand::rng(),
        )
        .map_err(|available| AppError::InsufficientNumbers {
            available: available as i64,
        })?;

        self.raffle_repo
            .insert_purchased_numbers(&mut *tx, raffle_id, sale_id, &drawn)
            .await?;

        tx.commit().await?;

        drawn.sort_unstable();
        Ok(drawn)
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_raffle(
        &self,
        title: &str,
        description: Option<&str>,
        total_numbers: i32,
        price_per_number: Decimal,
        discount_price: Option<Decimal>,
        discount_min_quantity: Option<i32>,
        commission_rate: Decimal,
        draw_date: Option<DateTime<Utc>>,
        image_url: Option<&str>,
    ) -> Result<Raffle, AppError> {
        if let Err(e) =
            validate_discount_config(price_per_number, discount_price, discount_min_quantity)
        {
            let mut errors = ValidationErrors::new();
            errors.add("discountPrice", e);
            return Err(AppError::ValidationError(errors));
        }

        let raffle = self
            .raffle_repo
            .create(
                &self.pool,
                title,
                description,
                total_numbers,
                price_per_number,
                discount_price,
                discount_min_quantity,
                commission_rate,
                draw_date,
                image_url,
            )
            .await?;

        tracing::info!("🎟️ Rifa criada: {} ({} números)", raffle.title, raffle.total_numbers);
        Ok(raffle)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_raffle(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        price_per_number: Option<Decimal>,
        discount_price: Option<Decimal>,
        discount_min_quantity: Option<i32>,
        commission_rate: Option<Decimal>,
        draw_date: Option<DateTime<Utc>>,
        image_url: Option<&str>,
    ) -> Result<Raffle, AppError> {
        self.raffle_repo
            .update_config(
                &self.pool,
                id,
                title,
                description,
                price_per_number,
                discount_price,
                discount_min_quantity,
                commission_rate,
                draw_date,
                image_url,
            )
            .await
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        next: RaffleStatus,
    ) -> Result<Raffle, AppError> {
        let raffle = self
            .raffle_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        if !raffle.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: raffle.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let updated = self.raffle_repo.set_status(&self.pool, id, next).await?;
        tracing::info!("🎟️ Rifa {} agora está {:?}", updated.title, updated.status);
        Ok(updated)
    }

    pub async fn find_active(&self) -> Result<Option<Raffle>, AppError> {
        self.raffle_repo.find_active(&self.pool).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Raffle, AppError> {
        self.raffle_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::RaffleNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Raffle>, AppError> {
        self.raffle_repo.list(&self.pool).await
    }

    pub async fn availability(&self, id: Uuid) -> Result<RaffleAvailability, AppError> {
        let raffle = self
            .raffle_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        let sold = self.raffle_repo.count_purchased(&self.pool, id).await?;

        Ok(RaffleAvailability {
            raffle_id: raffle.id,
            total_numbers: raffle.total_numbers,
            sold,
            available: raffle.total_numbers as i64 - sold,
        })
    }

    // =========================================================================
    //  NÚMEROS PREMIADOS
    // =========================================================================

    pub async fn add_winning_numbers(
        &self,
        raffle_id: Uuid,
        entries: &[(i32, String)],
    ) -> Result<Vec<WinningNumber>, AppError> {
        use sqlx::Acquire;

        let mut tx = self.pool.begin().await?;

        let raffle = self
            .raffle_repo
            .find_by_id(&mut *tx, raffle_id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        let mut created = Vec::with_capacity(entries.len());
        for (number, prize) in entries {
            if *number < 1 || *number > raffle.total_numbers {
                let mut err = ValidationError::new("range");
                err.message = Some(
                    format!(
                        "O número premiado deve estar entre 1 e {}.",
                        raffle.total_numbers
                    )
                    .into(),
                );
                let mut errors = ValidationErrors::new();
                errors.add("number", err);
                return Err(AppError::ValidationError(errors));
            }

            let winning = self
                .raffle_repo
                .insert_winning_number(&mut *tx, raffle_id, *number, prize)
                .await?;
            created.push(winning);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn list_winning_numbers(
        &self,
        raffle_id: Uuid,
    ) -> Result<Vec<WinningNumber>, AppError> {
        self.raffle_repo
            .list_winning_numbers(&self.pool, raffle_id)
            .await
    }
}

/// Sorteio puro: diferença entre 1..=total e os já vendidos, embaralhada
/// (Fisher-Yates) e cortada no tamanho pedido. Err carrega quantos ainda
/// restam, para a mensagem de erro do chamador.
pub fn draw_free_numbers(
    total_numbers: i32,
    used: &HashSet<i32>,
    quantity: usize,
    rng: &mut impl Rng,
) -> Result<Vec<i32>, usize> {
    let mut free: Vec<i32> = (1..=total_numbers).filter(|n| !used.contains(n)).collect();

    if free.len() < quantity {
        return Err(free.len());
    }

    free.shuffle(rng);
    free.truncate(quantity);
    Ok(free)
}

// Desconto só faz sentido completo: preço menor que o cheio e quantidade
// mínima de pelo menos 2.
fn validate_discount_config(
    price_per_number: Decimal,
    discount_price: Option<Decimal>,
    discount_min_quantity: Option<i32>,
) -> Result<(), ValidationError> {
    match (discount_price, discount_min_quantity) {
        (None, None) => Ok(()),
        (Some(discount), Some(min_qty)) => {
            if discount >= price_per_number {
                let mut err = ValidationError::new("discount");
                err.message = Some("O preço com desconto deve ser menor que o preço cheio.".into());
                return Err(err);
            }
            if min_qty < 2 {
                let mut err = ValidationError::new("discount");
                err.message = Some("A quantidade mínima do desconto deve ser pelo menos 2.".into());
                return Err(err);
            }
            Ok(())
        }
        _ => {
            let mut err = ValidationError::new("discount");
            err.message =
                Some("Desconto exige preço promocional e quantidade mínima juntos.".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn draws_distinct_numbers_within_range() {
        let used: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let drawn = draw_free_numbers(100, &used, 10, &mut rng()).unwrap();

        assert_eq!(drawn.len(), 10);
        let unique: HashSet<i32> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), 10);
        for n in &drawn {
            assert!((1..=100).contains(n));
            assert!(!used.contains(n));
        }
    }

    #[test]
    fn fails_with_remaining_count_when_not_enough() {
        let used: HashSet<i32> = (1..=98).collect();
        // Só restam 99 e 100.
        assert_eq!(draw_free_numbers(100, &used, 3, &mut rng()), Err(2));
    }

    #[test]
    fn exact_remaining_quantity_still_succeeds() {
        let used: HashSet<i32> = (1..=99).collect();
        let drawn = draw_free_numbers(100, &used, 1, &mut rng()).unwrap();
        assert_eq!(drawn, vec![100]);
    }

    #[test]
    fn sold_out_raffle_has_zero_available() {
        let used: HashSet<i32> = (1..=10).collect();
        assert_eq!(draw_free_numbers(10, &used, 1, &mut rng()), Err(0));
    }

    #[test]
    fn discount_config_must_be_complete_and_cheaper() {
        assert!(validate_discount_config(dec!(1.99), None, None).is_ok());
        assert!(validate_discount_config(dec!(1.99), Some(dec!(0.99)), Some(10)).is_ok());
        // Incompleto
        assert!(validate_discount_config(dec!(1.99), Some(dec!(0.99)), None).is_err());
        // Mais caro que o cheio
        assert!(validate_discount_config(dec!(1.99), Some(dec!(2.50)), Some(10)).is_err());
        // Quantidade mínima degenerada
        assert!(validate_discount_config(dec!(1.99), Some(dec!(0.99)), Some(1)).is_err());
    }
}
