// src/services/payment_service.rs
//
// Ponte com o provedor de checkout hospedado. O resto do sistema só
// conhece o trait: criar sessão e perguntar se pagou. Erros do provedor
// são repassados como vieram, sem retry.

use async_trait::async_trait;
use serde_json::json;

use crate::{
    common::error::AppError,
    models::payment::{CheckoutRequest, CheckoutSession, SessionStatus},
};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError>;

    async fn get_session_status(&self, session_id: &str) -> Result<SessionStatus, AppError>;
}

// Cliente do provedor de checkout PIX.
pub struct PixCheckoutClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PixCheckoutClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn read_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        // Tenta extrair a mensagem do corpo; senão, repassa o texto cru.
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);
        AppError::PaymentProvider(format!("{}: {}", status, message))
    }
}

#[async_trait]
impl PaymentGateway for PixCheckoutClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "amount": request.amount,
                "description": request.description,
                "customer": {
                    "name": request.customer_name,
                    "whatsapp": request.customer_whatsapp,
                },
                "successUrl": request.success_url,
                "cancelUrl": request.cancel_url,
                "metadata": { "saleId": request.sale_id },
            }))
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))?;

        tracing::info!("💳 Sessão de checkout criada: {}", session.session_id);
        Ok(session)
    }

    async fn get_session_status(&self, session_id: &str) -> Result<SessionStatus, AppError> {
        let url = format!("{}/v1/checkout/sessions/{}", self.base_url, session_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        response
            .json::<SessionStatus>()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))
    }
}

#[cfg(test)]
pub mod testing {
    //! Gateway de mentira para os testes de handler/serviço: devolve
    //! sempre a mesma sessão e o status configurado.

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub struct FakeGateway {
        pub paid: AtomicBool,
    }

    impl FakeGateway {
        pub fn new(paid: bool) -> Self {
            Self {
                paid: AtomicBool::new(paid),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_checkout_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, AppError> {
            Ok(CheckoutSession {
                session_id: format!("sess_{}", request.sale_id.simple()),
                url: format!("https://pagamento.exemplo/{}", request.sale_id),
            })
        }

        async fn get_session_status(&self, session_id: &str) -> Result<SessionStatus, AppError> {
            Ok(SessionStatus {
                session_id: session_id.to_string(),
                paid: self.paid.load(Ordering::Relaxed),
                status: None,
            })
        }
    }

    #[tokio::test]
    async fn fake_gateway_reports_configured_state() {
        let gateway = FakeGateway::new(true);
        let status = gateway.get_session_status("sess_x").await.unwrap();
        assert!(status.paid);
    }
}
