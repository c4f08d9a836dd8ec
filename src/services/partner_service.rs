// src/services/partner_service.rs
//
// Tudo do portal do parceiro: saldo derivado, pedido e revisão de
// saques, estatísticas do painel e rastreio de cliques do link.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PartnerRepository, ProfileRepository, SaleRepository},
    models::{
        partner::{PartnerClick, PartnerStats, Withdrawal, WithdrawalMethod, WithdrawalStatus},
        profile::Profile,
    },
};

// Limites do saque em reais.
pub const MIN_WITHDRAWAL: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const MAX_WITHDRAWAL: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

#[derive(Clone)]
pub struct PartnerService {
    profile_repo: ProfileRepository,
    partner_repo: PartnerRepository,
    sale_repo: SaleRepository,
    pool: PgPool,
}

// Destino do saque, conforme o método.
pub struct WithdrawalDetails<'a> {
    pub pix_key: Option<&'a str>,
    pub bank_name: Option<&'a str>,
    pub bank_agency: Option<&'a str>,
    pub bank_account: Option<&'a str>,
}

impl PartnerService {
    pub fn new(
        profile_repo: ProfileRepository,
        partner_repo: PartnerRepository,
        sale_repo: SaleRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            profile_repo,
            partner_repo,
            sale_repo,
            pool,
        }
    }

    // =========================================================================
    //  SAQUES
    // =========================================================================

    /// O saldo disponível nunca é persistido: comissões de vendas
    /// completadas menos saques processados/aprovados, recalculado da
    /// história toda na mesma transação que insere o saque.
    pub async fn request_withdrawal(
        &self,
        partner: &Profile,
        amount: Decimal,
        method: WithdrawalMethod,
        details: WithdrawalDetails<'_>,
    ) -> Result<Withdrawal, AppError> {
        let mut tx = self.pool.begin().await?;

        // Checagem de saldo e inserção na mesma transação.
        let earned = self.sale_repo.sum_commission(&mut *tx, partner.id).await?;
        let withdrawn = self.partner_repo.sum_withdrawn(&mut *tx, partner.id).await?;
        let available = earned - withdrawn;

        validate_withdrawal_amount(amount, available)?;

        let withdrawal = self
            .partner_repo
            .create_withdrawal(
                &mut *tx,
                partner.id,
                amount,
                method,
                details.pix_key,
                details.bank_name,
                details.bank_agency,
                details.bank_account,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🏧 Saque de R$ {} solicitado pelo parceiro {}",
            amount,
            partner.slug
        );
        Ok(withdrawal)
    }

    /// Revisão do admin: aprova, rejeita, processa ou marca falha,
    /// respeitando a máquina de estados do saque.
    pub async fn review_withdrawal(
        &self,
        withdrawal_id: Uuid,
        next: WithdrawalStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Withdrawal, AppError> {
        let mut tx = self.pool.begin().await?;

        let withdrawal = self
            .partner_repo
            .find_withdrawal(&mut *tx, withdrawal_id)
            .await?
            .ok_or(AppError::WithdrawalNotFound)?;

        if !withdrawal.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: withdrawal.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        // Rejeição sem motivo não conta como revisão.
        if next == WithdrawalStatus::Rejected && rejection_reason.is_none() {
            let mut err = validator::ValidationError::new("required");
            err.message = Some("Informe o motivo da rejeição.".into());
            let mut errors = validator::ValidationErrors::new();
            errors.add("rejectionReason", err);
            return Err(AppError::ValidationError(errors));
        }

        let processed_at = (next == WithdrawalStatus::Processed).then(Utc::now);

        let updated = self
            .partner_repo
            .update_withdrawal_status(&mut *tx, withdrawal_id, next, rejection_reason, processed_at)
            .await?;

        tx.commit().await?;

        tracing::info!("🏧 Saque {} -> {:?}", withdrawal_id, next);
        Ok(updated)
    }

    pub async fn list_withdrawals(&self, partner_id: Uuid) -> Result<Vec<Withdrawal>, AppError> {
        self.partner_repo
            .list_withdrawals_by_partner(&self.pool, partner_id)
            .await
    }

    pub async fn list_withdrawals_by_status(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, AppError> {
        self.partner_repo
            .list_withdrawals_by_status(&self.pool, status)
            .await
    }

    // =========================================================================
    //  CLIQUES
    // =========================================================================

    /// Registra uma visita ao link de divulgação. O id devolvido viaja
    /// com o storefront até o checkout para fechar a conversão.
    pub async fn track_click(
        &self,
        slug: &str,
        referrer: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<PartnerClick, AppError> {
        let partner = self
            .profile_repo
            .find_by_slug(&self.pool, slug)
            .await?
            .filter(Profile::is_commissionable)
            .ok_or(AppError::ProfileNotFound)?;

        self.partner_repo
            .insert_click(&self.pool, partner.id, referrer, user_agent)
            .await
    }

    pub async fn list_clicks(&self, partner_id: Uuid) -> Result<Vec<PartnerClick>, AppError> {
        self.partner_repo.list_clicks(&self.pool, partner_id).await
    }

    // =========================================================================
    //  PAINEL
    // =========================================================================

    pub async fn stats(&self, partner_id: Uuid) -> Result<PartnerStats, AppError> {
        let mut tx = self.pool.begin().await?;

        let (clicks, conversions) = self.partner_repo.click_stats(&mut *tx, partner_id).await?;
        let (sales_count, total_sold) = self
            .sale_repo
            .partner_sales_aggregates(&mut *tx, partner_id)
            .await?;
        let commission_earned = self.sale_repo.sum_commission(&mut *tx, partner_id).await?;
        let withdrawn = self.partner_repo.sum_withdrawn(&mut *tx, partner_id).await?;
        let pending_withdrawals = self.partner_repo.sum_pending(&mut *tx, partner_id).await?;
        let pending_door_to_door = self
            .sale_repo
            .count_pending_door_to_door(&mut *tx, partner_id)
            .await?;

        tx.commit().await?;

        Ok(PartnerStats {
            partner_id,
            clicks,
            conversions,
            sales_count,
            total_sold,
            commission_earned,
            available_balance: commission_earned - withdrawn,
            pending_withdrawals,
            pending_door_to_door,
        })
    }

    // =========================================================================
    //  ADMINISTRAÇÃO
    // =========================================================================

    pub async fn list_partners(&self) -> Result<Vec<Profile>, AppError> {
        self.profile_repo.list_partners(&self.pool).await
    }

    /// Desativa o parceiro: o perfil continua existindo, mas novas vendas
    /// não comissionam mais.
    pub async fn deactivate_partner(&self, partner_id: Uuid) -> Result<Profile, AppError> {
        let profile = self
            .profile_repo
            .set_active(&self.pool, partner_id, false)
            .await?;
        tracing::info!("🚫 Parceiro {} desativado", profile.slug);
        Ok(profile)
    }
}

/// Regra de valor do saque: dentro dos limites e coberto pelo saldo.
pub fn validate_withdrawal_amount(amount: Decimal, available: Decimal) -> Result<(), AppError> {
    if amount < MIN_WITHDRAWAL || amount > MAX_WITHDRAWAL {
        let mut err = validator::ValidationError::new("range");
        err.message = Some(
            format!(
                "O saque deve ficar entre R$ {} e R$ {}.",
                MIN_WITHDRAWAL, MAX_WITHDRAWAL
            )
            .into(),
        );
        let mut errors = validator::ValidationErrors::new();
        errors.add("amount", err);
        return Err(AppError::ValidationError(errors));
    }

    if amount > available {
        return Err(AppError::InsufficientBalance { available });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_below_minimum() {
        assert!(matches!(
            validate_withdrawal_amount(dec!(49.99), dec!(500)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_above_maximum() {
        assert!(matches!(
            validate_withdrawal_amount(dec!(100000.01), dec!(200000)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_more_than_balance_naming_it() {
        // Pedir 60 com 50 de saldo falha informando os 50 disponíveis.
        match validate_withdrawal_amount(dec!(60.00), dec!(50.00)) {
            Err(AppError::InsufficientBalance { available }) => {
                assert_eq!(available, dec!(50.00));
            }
            other => panic!("esperava InsufficientBalance, veio {:?}", other.err()),
        }
    }

    #[test]
    fn accepts_exact_balance_at_minimum() {
        assert!(validate_withdrawal_amount(dec!(50), dec!(50)).is_ok());
    }

    #[test]
    fn balance_is_commissions_minus_withdrawn() {
        let earned = dec!(375.00);
        let withdrawn = dec!(150.00);
        assert_eq!(earned - withdrawn, dec!(225.00));
    }
}
