// src/models/sale.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn can_transition_to(self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Completed)
                | (SaleStatus::Pending, SaleStatus::Cancelled)
                | (SaleStatus::Completed, SaleStatus::Refunded)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "PENDING",
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Cancelled => "CANCELLED",
            SaleStatus::Refunded => "REFUNDED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Cash,
    Card,
}

// Uma venda de números. O comprador é identificado pelos campos de
// contato (não precisa ter perfil); o parceiro, quando houver, entra
// como atribuição de comissão.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub raffle_id: Uuid,
    pub partner_id: Option<Uuid>,
    pub click_id: Option<Uuid>,

    #[schema(example = "João da Silva")]
    pub customer_name: String,
    #[schema(example = "(11) 99999-9999")]
    pub customer_whatsapp: String,
    #[schema(example = "São Paulo")]
    pub customer_city: String,

    pub quantity: i32,

    #[schema(example = "1.99")]
    pub unit_price: Decimal,
    // Invariante: total_amount = unit_price * quantity
    #[schema(example = "9.95")]
    pub total_amount: Decimal,
    #[schema(example = "2.99")]
    pub commission_amount: Decimal,

    pub status: SaleStatus,
    pub payment_method: PaymentMethod,

    // Venda registrada em campo pelo parceiro, acertada depois.
    pub is_door_to_door: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_session_id: Option<String>,

    pub settled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Um registro por número vendido.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedNumber {
    pub id: Uuid,
    pub raffle_id: Uuid,
    pub sale_id: Uuid,
    pub number: i32,
    pub is_winner: bool,
    pub created_at: DateTime<Utc>,
}

// Prêmio instantâneo revelado na confirmação do pagamento.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeMatch {
    pub number: i32,
    pub prize: String,
}

// Resultado da finalização de uma venda paga: os números sorteados
// para o comprador e os prêmios instantâneos que ele acertou.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSale {
    pub sale: Sale,
    pub numbers: Vec<i32>,
    pub prizes: Vec<PrizeMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_sale_completes_or_cancels() {
        assert!(SaleStatus::Pending.can_transition_to(SaleStatus::Completed));
        assert!(SaleStatus::Pending.can_transition_to(SaleStatus::Cancelled));
        assert!(!SaleStatus::Pending.can_transition_to(SaleStatus::Refunded));
    }

    #[test]
    fn completed_sale_only_refunds() {
        assert!(SaleStatus::Completed.can_transition_to(SaleStatus::Refunded));
        assert!(!SaleStatus::Completed.can_transition_to(SaleStatus::Pending));
        assert!(!SaleStatus::Completed.can_transition_to(SaleStatus::Cancelled));
    }

    #[test]
    fn cancelled_and_refunded_are_terminal() {
        for next in [
            SaleStatus::Pending,
            SaleStatus::Completed,
            SaleStatus::Cancelled,
            SaleStatus::Refunded,
        ] {
            assert!(!SaleStatus::Cancelled.can_transition_to(next));
            assert!(!SaleStatus::Refunded.can_transition_to(next));
        }
    }
}
