// src/models/payment.rs
//
// Tipos trocados com o provedor de checkout. Não são linhas de banco:
// a sessão vive no provedor, aqui só guardamos o id na venda.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Pedido de criação de uma sessão de checkout hospedado.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub sale_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub customer_name: String,
    pub customer_whatsapp: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[serde(alias = "id")]
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(alias = "id")]
    pub session_id: String,
    pub paid: bool,
    #[serde(default)]
    pub status: Option<String>,
}
