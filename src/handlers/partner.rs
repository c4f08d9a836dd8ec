// src/handlers/partner.rs
//
// Portal do parceiro: cadastro, painel, vendas porta a porta e saques.
// Todas as rotas protegidas aceitam o próprio parceiro; admins podem
// inspecionar qualquer parceiro via ?partnerId=.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::AppError,
        validate::{validate_positive, validate_whatsapp},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PartnerOrAdmin, RequireRole},
    },
    models::{
        partner::{PartnerClick, PartnerStats, Withdrawal, WithdrawalMethod},
        profile::{AuthResponse, Profile, UserRole},
        sale::{CompletedSale, PaymentMethod, Sale},
    },
    services::{partner_service::WithdrawalDetails, sale_service::CustomerInfo},
};

// Admin pode olhar o painel de qualquer parceiro.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PartnerScope {
    pub partner_id: Option<Uuid>,
}

fn resolve_partner(user: &Profile, scope: &PartnerScope) -> Result<Uuid, AppError> {
    match scope.partner_id {
        Some(other) if other != user.id => {
            if user.role == UserRole::Admin {
                Ok(other)
            } else {
                Err(AppError::AccessDenied { required: "ADMIN" })
            }
        }
        _ => Ok(user.id),
    }
}

// ---
// Payload: cadastro de parceiro
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPartnerPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(custom(function = "validate_whatsapp"))]
    pub whatsapp: String,

    #[validate(length(min = 2, message = "A cidade é obrigatória."))]
    pub city: String,

    pub pix_key: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/partner/register",
    request_body = RegisterPartnerPayload,
    responses((status = 201, body = AuthResponse)),
    tag = "Partner"
)]
pub async fn register_partner(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPartnerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (_profile, token) = app_state
        .auth_service
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            Some(&payload.whatsapp),
            Some(&payload.city),
            UserRole::Partner,
            payload.pix_key.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// ---
// Handler: painel
// ---
#[utoipa::path(
    get,
    path = "/api/partner/stats",
    params(PartnerScope),
    responses((status = 200, body = PartnerStats)),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Query(scope): Query<PartnerScope>,
) -> Result<Json<PartnerStats>, AppError> {
    let partner_id = resolve_partner(&user, &scope)?;
    let stats = app_state.partner_service.stats(partner_id).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/partner/sales",
    params(PartnerScope),
    responses((status = 200, body = [Sale])),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Query(scope): Query<PartnerScope>,
) -> Result<Json<Vec<Sale>>, AppError> {
    let partner_id = resolve_partner(&user, &scope)?;
    let sales = app_state.sale_service.list_by_partner(partner_id).await?;
    Ok(Json(sales))
}

#[utoipa::path(
    get,
    path = "/api/partner/clicks",
    params(PartnerScope),
    responses((status = 200, body = [PartnerClick])),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn list_clicks(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Query(scope): Query<PartnerScope>,
) -> Result<Json<Vec<PartnerClick>>, AppError> {
    let partner_id = resolve_partner(&user, &scope)?;
    let clicks = app_state.partner_service.list_clicks(partner_id).await?;
    Ok(Json(clicks))
}

#[utoipa::path(
    get,
    path = "/api/partner/withdrawals",
    params(PartnerScope),
    responses((status = 200, body = [Withdrawal])),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Query(scope): Query<PartnerScope>,
) -> Result<Json<Vec<Withdrawal>>, AppError> {
    let partner_id = resolve_partner(&user, &scope)?;
    let withdrawals = app_state
        .partner_service
        .list_withdrawals(partner_id)
        .await?;
    Ok(Json(withdrawals))
}

// ---
// Payload: pedido de saque
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalPayload {
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    pub method: WithdrawalMethod,

    pub pix_key: Option<String>,
    pub bank_name: Option<String>,
    pub bank_agency: Option<String>,
    pub bank_account: Option<String>,
}

// O destino tem que casar com o método escolhido.
impl CreateWithdrawalPayload {
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        match self.method {
            WithdrawalMethod::Pix if self.pix_key.is_none() => {
                Err(ValidationError::new("PixKeyRequired"))
            }
            WithdrawalMethod::BankTransfer
                if self.bank_name.is_none()
                    || self.bank_agency.is_none()
                    || self.bank_account.is_none() =>
            {
                Err(ValidationError::new("BankDetailsRequired"))
            }
            _ => Ok(()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/partner/withdrawals",
    request_body = CreateWithdrawalPayload,
    responses((status = 201, body = Withdrawal), (status = 422)),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn create_withdrawal(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Json(payload): Json<CreateWithdrawalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("method", e);
        AppError::ValidationError(errors)
    })?;

    let withdrawal = app_state
        .partner_service
        .request_withdrawal(
            &user,
            payload.amount,
            payload.method,
            WithdrawalDetails {
                pix_key: payload.pix_key.as_deref(),
                bank_name: payload.bank_name.as_deref(),
                bank_agency: payload.bank_agency.as_deref(),
                bank_account: payload.bank_account.as_deref(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

// ---
// Payload: venda porta a porta
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoorToDoorPayload {
    pub raffle_id: Uuid,

    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub customer_name: String,

    #[validate(custom(function = "validate_whatsapp"))]
    pub customer_whatsapp: String,

    #[validate(length(min = 2, message = "A cidade é obrigatória."))]
    pub customer_city: String,

    #[validate(range(min = 1, max = 1000, message = "A quantidade deve ficar entre 1 e 1000."))]
    pub quantity: i32,

    pub payment_method: PaymentMethod,
}

#[utoipa::path(
    post,
    path = "/api/partner/door-to-door-sales",
    request_body = CreateDoorToDoorPayload,
    responses((status = 201, body = CompletedSale)),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn create_door_to_door(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Json(payload): Json<CreateDoorToDoorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let registered = app_state
        .sale_service
        .register_door_to_door(
            &user,
            payload.raffle_id,
            CustomerInfo {
                name: &payload.customer_name,
                whatsapp: &payload.customer_whatsapp,
                city: &payload.customer_city,
            },
            payload.quantity,
            payload.payment_method,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

// ---
// Payload: acerto/cancelamento da venda em campo
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DoorToDoorAction {
    Settle,
    Cancel,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchDoorToDoorPayload {
    pub action: DoorToDoorAction,
    // Obrigatório no cancelamento.
    pub reason: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/partner/door-to-door-sales/{id}",
    params(("id" = Uuid, Path, description = "Id da venda")),
    request_body = PatchDoorToDoorPayload,
    responses((status = 200, body = Sale), (status = 409)),
    security(("api_jwt" = [])),
    tag = "Partner"
)]
pub async fn patch_door_to_door(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<PartnerOrAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchDoorToDoorPayload>,
) -> Result<Json<Sale>, AppError> {
    let sale = match payload.action {
        DoorToDoorAction::Settle => app_state.sale_service.settle_door_to_door(&user, id).await?,
        DoorToDoorAction::Cancel => {
            let reason = payload.reason.as_deref().filter(|r| !r.trim().is_empty());
            let reason = reason.ok_or_else(|| {
                let mut err = ValidationError::new("required");
                err.message = Some("Informe o motivo do cancelamento.".into());
                let mut errors = validator::ValidationErrors::new();
                errors.add("reason", err);
                AppError::ValidationError(errors)
            })?;
            app_state
                .sale_service
                .cancel_door_to_door(&user, id, reason)
                .await?
        }
    };

    Ok(Json(sale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: UserRole) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "x".to_string(),
            whatsapp: None,
            city: None,
            role,
            slug: "ana".to_string(),
            pix_key: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn partner_defaults_to_own_id() {
        let user = profile(UserRole::Partner);
        let scope = PartnerScope { partner_id: None };
        assert_eq!(resolve_partner(&user, &scope).unwrap(), user.id);
    }

    #[test]
    fn partner_cannot_spy_on_others() {
        let user = profile(UserRole::Partner);
        let scope = PartnerScope {
            partner_id: Some(Uuid::new_v4()),
        };
        assert!(matches!(
            resolve_partner(&user, &scope),
            Err(AppError::AccessDenied { .. })
        ));
    }

    #[test]
    fn admin_inspects_any_partner() {
        let user = profile(UserRole::Admin);
        let other = Uuid::new_v4();
        let scope = PartnerScope {
            partner_id: Some(other),
        };
        assert_eq!(resolve_partner(&user, &scope).unwrap(), other);
    }

    #[test]
    fn withdrawal_payload_requires_matching_details() {
        let pix_without_key = CreateWithdrawalPayload {
            amount: Decimal::from(100),
            method: WithdrawalMethod::Pix,
            pix_key: None,
            bank_name: None,
            bank_agency: None,
            bank_account: None,
        };
        assert!(pix_without_key.validate_consistency().is_err());

        let bank_incomplete = CreateWithdrawalPayload {
            amount: Decimal::from(100),
            method: WithdrawalMethod::BankTransfer,
            pix_key: None,
            bank_name: Some("Banco do Brasil".to_string()),
            bank_agency: None,
            bank_account: None,
        };
        assert!(bank_incomplete.validate_consistency().is_err());

        let pix_ok = CreateWithdrawalPayload {
            amount: Decimal::from(100),
            method: WithdrawalMethod::Pix,
            pix_key: Some("ana@example.com".to_string()),
            bank_name: None,
            bank_agency: None,
            bank_account: None,
        };
        assert!(pix_ok.validate_consistency().is_ok());
    }
}
