// src/services/sale_service.rs
//
// Regras de preço e comissão, criação de vendas (online e porta a
// porta), finalização pós-pagamento e acerto/cancelamento em campo.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PartnerRepository, ProfileRepository, RaffleRepository, SaleRepository},
    models::{
        profile::Profile,
        raffle::Raffle,
        sale::{CompletedSale, PaymentMethod, PrizeMatch, Sale, SaleStatus},
    },
    services::raffle_service::RaffleService,
};

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    raffle_repo: RaffleRepository,
    profile_repo: ProfileRepository,
    partner_repo: PartnerRepository,
    raffle_service: RaffleService,
    pool: PgPool,
}

// Dados de contato do comprador (não precisa ter perfil).
pub struct CustomerInfo<'a> {
    pub name: &'a str,
    pub whatsapp: &'a str,
    pub city: &'a str,
}

impl SaleService {
    pub fn new(
        sale_repo: SaleRepository,
        raffle_repo: RaffleRepository,
        profile_repo: ProfileRepository,
        partner_repo: PartnerRepository,
        raffle_service: RaffleService,
        pool: PgPool,
    ) -> Self {
        Self {
            sale_repo,
            raffle_repo,
            profile_repo,
            partner_repo,
            raffle_service,
            pool,
        }
    }

    // =========================================================================
    //  VENDA ONLINE (checkout)
    // =========================================================================

    /// Cria a venda PENDING do checkout. Nenhum número é alocado aqui:
    /// isso acontece só quando o pagamento confirma.
    pub async fn create_online_sale(
        &self,
        raffle_id: Uuid,
        partner_slug: Option<&str>,
        click_id: Option<Uuid>,
        customer: CustomerInfo<'_>,
        quantity: i32,
    ) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let raffle = self
            .raffle_repo
            .find_by_id(&mut *tx, raffle_id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        if raffle.status != crate::models::raffle::RaffleStatus::Active {
            return Err(AppError::RaffleNotActive);
        }

        // Atribuição: parceiro só entra se existir, for parceiro e estiver
        // ativo. Caso contrário a venda segue sem comissão.
        let partner = match partner_slug {
            Some(slug) => self.profile_repo.find_by_slug(&mut *tx, slug).await?,
            None => None,
        };
        let partner = partner.filter(Profile::is_commissionable);

        let unit_price = unit_price_for(&raffle, quantity);
        let total_amount = unit_price * Decimal::from(quantity);
        let commission_amount =
            commission_for(total_amount, raffle.commission_rate, partner.is_some());

        let sale = self
            .sale_repo
            .create(
                &mut *tx,
                raffle.id,
                partner.as_ref().map(|p| p.id),
                click_id,
                customer.name,
                customer.whatsapp,
                customer.city,
                quantity,
                unit_price,
                total_amount,
                commission_amount,
                PaymentMethod::Pix,
                false,
            )
            .await?;

        tx.commit().await?;
        Ok(sale)
    }

    pub async fn attach_session(
        &self,
        sale_id: Uuid,
        session_id: &str,
    ) -> Result<Sale, AppError> {
        self.sale_repo
            .set_session_id(&self.pool, sale_id, session_id)
            .await
    }

    /// Chamada quando o provedor confirma o pagamento da sessão. Aloca os
    /// números, completa a venda, converte o clique e revela prêmios
    /// instantâneos. Idempotente: venda já completada devolve o que já saiu.
    pub async fn finalize_paid_sale(&self, session_id: &str) -> Result<CompletedSale, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sale_repo
            .find_by_session_for_update(&mut *tx, session_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;

        if sale.status == SaleStatus::Completed {
            let numbers = self.raffle_repo.numbers_for_sale(&mut *tx, sale.id).await?;
            let prizes = self
                .raffle_repo
                .list_claimed_for_sale(&mut *tx, sale.id)
                .await?
                .into_iter()
                .map(|w| PrizeMatch {
                    number: w.number,
                    prize: w.prize,
                })
                .collect();
            tx.commit().await?;
            return Ok(CompletedSale {
                sale,
                numbers,
                prizes,
            });
        }

        if !sale.status.can_transition_to(SaleStatus::Completed) {
            return Err(AppError::InvalidTransition {
                from: sale.status.as_str().to_string(),
                to: SaleStatus::Completed.as_str().to_string(),
            });
        }

        let numbers = self
            .raffle_service
            .allocate_numbers(&mut *tx, sale.raffle_id, sale.id, sale.quantity)
            .await?;

        let sale = self.sale_repo.mark_completed(&mut *tx, sale.id, false).await?;

        if let Some(click_id) = sale.click_id {
            self.partner_repo
                .mark_click_converted(&mut *tx, click_id, sale.id)
                .await?;
        }

        let prizes = self
            .reveal_prizes(&mut tx, sale.raffle_id, sale.id, &numbers)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "💰 Venda {} completada: {} números, {} prêmios instantâneos",
            sale.id,
            numbers.len(),
            prizes.len()
        );

        Ok(CompletedSale {
            sale,
            numbers,
            prizes,
        })
    }

    // =========================================================================
    //  VENDA PORTA A PORTA
    // =========================================================================

    /// Registra uma venda em campo. Os números saem na hora (o comprador
    /// fica com eles no ato); o acerto financeiro vem depois.
    pub async fn register_door_to_door(
        &self,
        partner: &Profile,
        raffle_id: Uuid,
        customer: CustomerInfo<'_>,
        quantity: i32,
        payment_method: PaymentMethod,
    ) -> Result<CompletedSale, AppError> {
        let mut tx = self.pool.begin().await?;

        let raffle = self
            .raffle_repo
            .find_by_id(&mut *tx, raffle_id)
            .await?
            .ok_or(AppError::RaffleNotFound)?;

        if raffle.status != crate::models::raffle::RaffleStatus::Active {
            return Err(AppError::RaffleNotActive);
        }

        let unit_price = unit_price_for(&raffle, quantity);
        let total_amount = unit_price * Decimal::from(quantity);
        let commission_amount = commission_for(
            total_amount,
            raffle.commission_rate,
            partner.is_commissionable(),
        );

        let sale = self
            .sale_repo
            .create(
                &mut *tx,
                raffle.id,
                Some(partner.id),
                None,
                customer.name,
                customer.whatsapp,
                customer.city,
                quantity,
                unit_price,
                total_amount,
                commission_amount,
                payment_method,
                true,
            )
            .await?;

        let numbers = self
            .raffle_service
            .allocate_numbers(&mut *tx, raffle.id, sale.id, quantity)
            .await?;

        tx.commit().await?;

        Ok(CompletedSale {
            sale,
            numbers,
            prizes: Vec::new(),
        })
    }

    /// Acerto: o dinheiro da venda em campo chegou. A comissão passa a
    /// contar para o saldo do parceiro.
    pub async fn settle_door_to_door(
        &self,
        actor: &Profile,
        sale_id: Uuid,
    ) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self.load_door_to_door(&mut tx, actor, sale_id).await?;

        if !sale.status.can_transition_to(SaleStatus::Completed) {
            return Err(AppError::InvalidTransition {
                from: sale.status.as_str().to_string(),
                to: SaleStatus::Completed.as_str().to_string(),
            });
        }

        let sale = self.sale_repo.mark_completed(&mut *tx, sale.id, true).await?;
        tx.commit().await?;

        tracing::info!("🤝 Venda porta a porta {} acertada", sale.id);
        Ok(sale)
    }

    /// Cancelamento: libera os números de volta para a rifa, sem comissão.
    pub async fn cancel_door_to_door(
        &self,
        actor: &Profile,
        sale_id: Uuid,
        reason: &str,
    ) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self.load_door_to_door(&mut tx, actor, sale_id).await?;

        if !sale.status.can_transition_to(SaleStatus::Cancelled) {
            return Err(AppError::InvalidTransition {
                from: sale.status.as_str().to_string(),
                to: SaleStatus::Cancelled.as_str().to_string(),
            });
        }

        let released = self
            .raffle_repo
            .delete_numbers_for_sale(&mut *tx, sale.id)
            .await?;
        let sale = self
            .sale_repo
            .mark_cancelled(&mut *tx, sale.id, reason)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "↩️ Venda porta a porta {} cancelada, {} números liberados",
            sale.id,
            released
        );
        Ok(sale)
    }

    // Carrega a venda travada e valida que é porta a porta e que o ator
    // pode mexer nela (o próprio parceiro ou um admin).
    async fn load_door_to_door(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor: &Profile,
        sale_id: Uuid,
    ) -> Result<Sale, AppError> {
        use crate::models::profile::UserRole;

        let sale = self
            .sale_repo
            .find_by_id_for_update(&mut **tx, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;

        if !sale.is_door_to_door {
            return Err(AppError::SaleNotFound);
        }

        let is_owner = sale.partner_id == Some(actor.id);
        if !is_owner && actor.role != UserRole::Admin {
            return Err(AppError::AccessDenied { required: "ADMIN" });
        }

        Ok(sale)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Sale, AppError> {
        self.sale_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn numbers_for_sale(&self, sale_id: Uuid) -> Result<Vec<i32>, AppError> {
        self.raffle_repo.numbers_for_sale(&self.pool, sale_id).await
    }

    pub async fn list_by_partner(&self, partner_id: Uuid) -> Result<Vec<Sale>, AppError> {
        self.sale_repo.list_by_partner(&self.pool, partner_id).await
    }

    async fn reveal_prizes(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        raffle_id: Uuid,
        sale_id: Uuid,
        numbers: &[i32],
    ) -> Result<Vec<PrizeMatch>, AppError> {
        let claimed = self
            .raffle_repo
            .claim_winning_numbers(&mut **tx, raffle_id, sale_id, numbers)
            .await?;

        if claimed.is_empty() {
            return Ok(Vec::new());
        }

        let winner_numbers: Vec<i32> = claimed.iter().map(|w| w.number).collect();
        self.raffle_repo
            .flag_winner_numbers(&mut **tx, sale_id, &winner_numbers)
            .await?;

        Ok(claimed
            .into_iter()
            .map(|w| PrizeMatch {
                number: w.number,
                prize: w.prize,
            })
            .collect())
    }
}

/// Preço unitário: cai para o promocional quando a quantidade atinge o
/// mínimo configurado. Sem desconto configurado, vale o preço cheio.
pub fn unit_price_for(raffle: &Raffle, quantity: i32) -> Decimal {
    match (raffle.discount_price, raffle.discount_min_quantity) {
        (Some(discount), Some(min_qty)) if quantity >= min_qty => discount,
        _ => raffle.price_per_number,
    }
}

/// Comissão do parceiro: percentual sobre o total, arredondado a
/// centavos. Sem parceiro comissionável, zero.
pub fn commission_for(total_amount: Decimal, commission_rate: Decimal, commissionable: bool) -> Decimal {
    if !commissionable {
        return Decimal::ZERO;
    }
    (total_amount * commission_rate / Decimal::from(100)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raffle::RaffleStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn raffle() -> Raffle {
        Raffle {
            id: Uuid::new_v4(),
            title: "Rifa de teste".to_string(),
            description: None,
            total_numbers: 100,
            price_per_number: dec!(1.99),
            discount_price: Some(dec!(0.99)),
            discount_min_quantity: Some(10),
            commission_rate: dec!(30),
            status: RaffleStatus::Active,
            draw_date: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn five_numbers_pay_full_price() {
        let r = raffle();
        let unit = unit_price_for(&r, 5);
        assert_eq!(unit, dec!(1.99));
        assert_eq!(unit * Decimal::from(5), dec!(9.95));
    }

    #[test]
    fn ten_numbers_hit_the_discount() {
        let r = raffle();
        let unit = unit_price_for(&r, 10);
        assert_eq!(unit, dec!(0.99));
        assert_eq!(unit * Decimal::from(10), dec!(9.90));
    }

    #[test]
    fn no_discount_configured_means_full_price() {
        let mut r = raffle();
        r.discount_price = None;
        r.discount_min_quantity = None;
        assert_eq!(unit_price_for(&r, 50), dec!(1.99));
    }

    #[test]
    fn commission_is_thirty_percent_of_hundred() {
        assert_eq!(commission_for(dec!(100.00), dec!(30), true), dec!(30.00));
    }

    #[test]
    fn commission_rounds_to_cents() {
        // 9.95 * 30% = 2.985 -> 2.98 (banker's rounding do rust_decimal)
        assert_eq!(commission_for(dec!(9.95), dec!(30), true), dec!(2.98));
    }

    #[test]
    fn no_partner_no_commission() {
        assert_eq!(commission_for(dec!(100.00), dec!(30), false), dec!(0));
    }
}
