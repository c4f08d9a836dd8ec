// src/models/raffle.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "raffle_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaffleStatus {
    Active,
    Finished,
    Cancelled,
}

impl RaffleStatus {
    // Só uma rifa ativa muda de status; FINISHED e CANCELLED são finais.
    pub fn can_transition_to(self, next: RaffleStatus) -> bool {
        matches!(
            (self, next),
            (RaffleStatus::Active, RaffleStatus::Finished)
                | (RaffleStatus::Active, RaffleStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RaffleStatus::Active => "ACTIVE",
            RaffleStatus::Finished => "FINISHED",
            RaffleStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Raffle {
    pub id: Uuid,

    #[schema(example = "Rifa do iPhone 16")]
    pub title: String,
    pub description: Option<String>,

    #[schema(example = 1000)]
    pub total_numbers: i32,

    #[schema(example = "1.99")]
    pub price_per_number: Decimal,

    // Preço com desconto a partir de `discount_min_quantity` números.
    #[schema(example = "0.99")]
    pub discount_price: Option<Decimal>,
    #[schema(example = 10)]
    pub discount_min_quantity: Option<i32>,

    // Percentual repassado ao parceiro (30 = 30%)
    #[schema(example = "30.00")]
    pub commission_rate: Decimal,

    pub status: RaffleStatus,
    pub draw_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Número premiado pré-definido pelo admin. Quando o número é vendido,
// o comprador descobre o prêmio na hora.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinningNumber {
    pub id: Uuid,
    pub raffle_id: Uuid,
    pub number: i32,

    #[schema(example = "R$ 100 no PIX")]
    pub prize: String,

    pub claimed_by_sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Fotografia da disponibilidade de números de uma rifa.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaffleAvailability {
    pub raffle_id: Uuid,
    pub total_numbers: i32,
    pub sold: i64,
    pub available: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_raffle_can_finish_or_cancel() {
        assert!(RaffleStatus::Active.can_transition_to(RaffleStatus::Finished));
        assert!(RaffleStatus::Active.can_transition_to(RaffleStatus::Cancelled));
    }

    #[test]
    fn finished_and_cancelled_are_terminal() {
        assert!(!RaffleStatus::Finished.can_transition_to(RaffleStatus::Active));
        assert!(!RaffleStatus::Finished.can_transition_to(RaffleStatus::Cancelled));
        assert!(!RaffleStatus::Cancelled.can_transition_to(RaffleStatus::Active));
    }
}
