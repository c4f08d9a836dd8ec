// src/models/partner.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Visita registrada no link de divulgação do parceiro.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerClick {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub converted: bool,
    pub sale_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "withdrawal_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalMethod {
    Pix,
    BankTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "withdrawal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
    Failed,
}

impl WithdrawalStatus {
    // Máquina de estados do saque (transições disparadas pelo admin):
    // PENDING -> APPROVED -> PROCESSED
    // PENDING -> REJECTED
    // APPROVED -> FAILED (tentativa de pagamento falhou)
    pub fn can_transition_to(self, next: WithdrawalStatus) -> bool {
        matches!(
            (self, next),
            (WithdrawalStatus::Pending, WithdrawalStatus::Approved)
                | (WithdrawalStatus::Pending, WithdrawalStatus::Rejected)
                | (WithdrawalStatus::Approved, WithdrawalStatus::Processed)
                | (WithdrawalStatus::Approved, WithdrawalStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WithdrawalStatus::Processed | WithdrawalStatus::Rejected | WithdrawalStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::Approved => "APPROVED",
            WithdrawalStatus::Rejected => "REJECTED",
            WithdrawalStatus::Processed => "PROCESSED",
            WithdrawalStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: Uuid,
    pub partner_id: Uuid,

    #[schema(example = "150.00")]
    pub amount: Decimal,
    pub method: WithdrawalMethod,

    // Detalhes do destino: chave PIX ou dados bancários, conforme o método.
    pub pix_key: Option<String>,
    pub bank_name: Option<String>,
    pub bank_agency: Option<String>,
    pub bank_account: Option<String>,

    pub status: WithdrawalStatus,
    pub rejection_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Painel do parceiro: tudo derivado, nada disso é persistido.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStats {
    pub partner_id: Uuid,
    pub clicks: i64,
    pub conversions: i64,
    pub sales_count: i64,
    #[schema(example = "1250.00")]
    pub total_sold: Decimal,
    #[schema(example = "375.00")]
    pub commission_earned: Decimal,
    #[schema(example = "225.00")]
    pub available_balance: Decimal,
    #[schema(example = "50.00")]
    pub pending_withdrawals: Decimal,
    pub pending_door_to_door: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_pending_approved_processed() {
        assert!(WithdrawalStatus::Pending.can_transition_to(WithdrawalStatus::Approved));
        assert!(WithdrawalStatus::Approved.can_transition_to(WithdrawalStatus::Processed));
    }

    #[test]
    fn rejection_only_from_pending() {
        assert!(WithdrawalStatus::Pending.can_transition_to(WithdrawalStatus::Rejected));
        assert!(!WithdrawalStatus::Approved.can_transition_to(WithdrawalStatus::Rejected));
    }

    #[test]
    fn terminal_states_do_not_move() {
        for terminal in [
            WithdrawalStatus::Processed,
            WithdrawalStatus::Rejected,
            WithdrawalStatus::Failed,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                WithdrawalStatus::Pending,
                WithdrawalStatus::Approved,
                WithdrawalStatus::Rejected,
                WithdrawalStatus::Processed,
                WithdrawalStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn no_skipping_approval() {
        assert!(!WithdrawalStatus::Pending.can_transition_to(WithdrawalStatus::Processed));
        assert!(!WithdrawalStatus::Pending.can_transition_to(WithdrawalStatus::Failed));
    }
}
