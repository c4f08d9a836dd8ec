// src/handlers/admin.rs
//
// Back-office: configuração de rifas, números premiados, supervisão de
// parceiros, revisão de saques e relatório financeiro. Tudo atrás do
// RequireRole<AdminOnly>.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validate::{validate_commission_rate, validate_positive},
    },
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::{
        partner::{Withdrawal, WithdrawalStatus},
        profile::Profile,
        raffle::{Raffle, RaffleAvailability, RaffleStatus, WinningNumber},
        report::AdminReport,
    },
};

// ---
// Payload: criação de rifa
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRafflePayload {
    #[validate(length(min = 3, message = "O título deve ter no mínimo 3 caracteres."))]
    pub title: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "A rifa precisa de pelo menos 1 número."))]
    pub total_numbers: i32,

    #[validate(custom(function = "validate_positive"))]
    pub price_per_number: Decimal,

    pub discount_price: Option<Decimal>,
    pub discount_min_quantity: Option<i32>,

    #[validate(custom(function = "validate_commission_rate"))]
    pub commission_rate: Decimal,

    pub draw_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/raffles",
    request_body = CreateRafflePayload,
    responses((status = 201, body = Raffle)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn create_raffle(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateRafflePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let raffle = app_state
        .raffle_service
        .create_raffle(
            &payload.title,
            payload.description.as_deref(),
            payload.total_numbers,
            payload.price_per_number,
            payload.discount_price,
            payload.discount_min_quantity,
            payload.commission_rate,
            payload.draw_date,
            payload.image_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(raffle)))
}

// ---
// Payload: edição dos campos de preço/desconto/comissão
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRafflePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_number: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub discount_min_quantity: Option<i32>,
    pub commission_rate: Option<Decimal>,
    pub draw_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/admin/raffles/{id}",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    request_body = UpdateRafflePayload,
    responses((status = 200, body = Raffle)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn update_raffle(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRafflePayload>,
) -> Result<Json<Raffle>, AppError> {
    if let Some(price) = payload.price_per_number {
        validate_positive(&price).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("pricePerNumber", e);
            AppError::ValidationError(errors)
        })?;
    }

    let raffle = app_state
        .raffle_service
        .update_raffle(
            id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.price_per_number,
            payload.discount_price,
            payload.discount_min_quantity,
            payload.commission_rate,
            payload.draw_date,
            payload.image_url.as_deref(),
        )
        .await?;

    Ok(Json(raffle))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRaffleStatusPayload {
    pub status: RaffleStatus,
}

#[utoipa::path(
    patch,
    path = "/api/admin/raffles/{id}/status",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    request_body = SetRaffleStatusPayload,
    responses((status = 200, body = Raffle), (status = 409)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn set_raffle_status(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRaffleStatusPayload>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = app_state
        .raffle_service
        .change_status(id, payload.status)
        .await?;
    Ok(Json(raffle))
}

#[utoipa::path(
    get,
    path = "/api/admin/raffles",
    responses((status = 200, body = [Raffle])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_raffles(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<Raffle>>, AppError> {
    let raffles = app_state.raffle_service.list().await?;
    Ok(Json(raffles))
}

#[utoipa::path(
    get,
    path = "/api/admin/raffles/{id}/availability",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    responses((status = 200, body = RaffleAvailability)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn raffle_availability(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<RaffleAvailability>, AppError> {
    let availability = app_state.raffle_service.availability(id).await?;
    Ok(Json(availability))
}

// ---
// Payload: números premiados
// ---
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinningNumberEntry {
    #[validate(range(min = 1, message = "O número deve ser positivo."))]
    pub number: i32,

    #[validate(length(min = 1, message = "Descreva o prêmio."))]
    pub prize: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddWinningNumbersPayload {
    #[validate(length(min = 1, message = "Informe pelo menos um número premiado."), nested)]
    pub entries: Vec<WinningNumberEntry>,
}

#[utoipa::path(
    post,
    path = "/api/admin/raffles/{id}/winning-numbers",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    request_body = AddWinningNumbersPayload,
    responses((status = 201, body = [WinningNumber])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn add_winning_numbers(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddWinningNumbersPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let entries: Vec<(i32, String)> = payload
        .entries
        .into_iter()
        .map(|e| (e.number, e.prize))
        .collect();

    let created = app_state
        .raffle_service
        .add_winning_numbers(id, &entries)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/admin/raffles/{id}/winning-numbers",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    responses((status = 200, body = [WinningNumber])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_winning_numbers(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WinningNumber>>, AppError> {
    let winners = app_state.raffle_service.list_winning_numbers(id).await?;
    Ok(Json(winners))
}

// ---
// Parceiros
// ---
#[utoipa::path(
    get,
    path = "/api/admin/partners",
    responses((status = 200, body = [Profile])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_partners(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let partners = app_state.partner_service.list_partners().await?;
    Ok(Json(partners))
}

#[utoipa::path(
    patch,
    path = "/api/admin/partners/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Id do parceiro")),
    responses((status = 200, body = Profile)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn deactivate_partner(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    let profile = app_state.partner_service.deactivate_partner(id).await?;
    Ok(Json(profile))
}

// ---
// Saques
// ---
#[derive(Debug, Deserialize, IntoParams)]
pub struct WithdrawalFilter {
    pub status: Option<WithdrawalStatus>,
}

#[utoipa::path(
    get,
    path = "/api/admin/withdrawals",
    params(WithdrawalFilter),
    responses((status = 200, body = [Withdrawal])),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Query(filter): Query<WithdrawalFilter>,
) -> Result<Json<Vec<Withdrawal>>, AppError> {
    let withdrawals = app_state
        .partner_service
        .list_withdrawals_by_status(filter.status)
        .await?;
    Ok(Json(withdrawals))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithdrawalPayload {
    pub status: WithdrawalStatus,
    pub rejection_reason: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/admin/withdrawals/{id}",
    params(("id" = Uuid, Path, description = "Id do saque")),
    request_body = ReviewWithdrawalPayload,
    responses((status = 200, body = Withdrawal), (status = 409)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn review_withdrawal(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewWithdrawalPayload>,
) -> Result<Json<Withdrawal>, AppError> {
    let withdrawal = app_state
        .partner_service
        .review_withdrawal(id, payload.status, payload.rejection_reason.as_deref())
        .await?;
    Ok(Json(withdrawal))
}

// ---
// Relatório financeiro
// ---
#[utoipa::path(
    get,
    path = "/api/admin/reports/summary",
    responses((status = 200, body = AdminReport)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn report_summary(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<AdminReport>, AppError> {
    let report = app_state.report_service.full_report().await?;
    Ok(Json(report))
}
