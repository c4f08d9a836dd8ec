// src/handlers/storefront.rs
//
// Rotas públicas da vitrine: rifa ativa, clique de afiliado, checkout e
// verificação do pagamento (polling), comprovante em PDF.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validate::validate_whatsapp},
    config::AppState,
    models::{
        partner::PartnerClick,
        payment::{CheckoutRequest, CheckoutSession},
        raffle::{Raffle, RaffleAvailability},
        sale::CompletedSale,
    },
    services::sale_service::CustomerInfo,
};

// ---
// Handler: rifa ativa da vitrine
// ---
#[utoipa::path(
    get,
    path = "/api/raffles/active",
    responses((status = 200, body = Raffle), (status = 404)),
    tag = "Storefront"
)]
pub async fn get_active_raffle(
    State(app_state): State<AppState>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = app_state
        .raffle_service
        .find_active()
        .await?
        .ok_or(AppError::RaffleNotFound)?;
    Ok(Json(raffle))
}

#[utoipa::path(
    get,
    path = "/api/raffles/{id}",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    responses((status = 200, body = Raffle)),
    tag = "Storefront"
)]
pub async fn get_raffle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = app_state.raffle_service.find_by_id(id).await?;
    Ok(Json(raffle))
}

#[utoipa::path(
    get,
    path = "/api/raffles/{id}/availability",
    params(("id" = Uuid, Path, description = "Id da rifa")),
    responses((status = 200, body = RaffleAvailability)),
    tag = "Storefront"
)]
pub async fn get_availability(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RaffleAvailability>, AppError> {
    let availability = app_state.raffle_service.availability(id).await?;
    Ok(Json(availability))
}

// ---
// Payload: clique no link de divulgação
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackClickPayload {
    #[validate(length(min = 1, message = "O slug é obrigatório."))]
    pub slug: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/clicks",
    request_body = TrackClickPayload,
    responses((status = 201, body = PartnerClick)),
    tag = "Storefront"
)]
pub async fn track_click(
    State(app_state): State<AppState>,
    Json(payload): Json<TrackClickPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let click = app_state
        .partner_service
        .track_click(
            &payload.slug,
            payload.referrer.as_deref(),
            payload.user_agent.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(click)))
}

// ---
// Payload: checkout da vitrine
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutPayload {
    pub raffle_id: Uuid,

    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub customer_name: String,

    #[validate(custom(function = "validate_whatsapp"))]
    pub customer_whatsapp: String,

    #[validate(length(min = 2, message = "A cidade é obrigatória."))]
    pub customer_city: String,

    #[validate(range(min = 1, max = 1000, message = "A quantidade deve ficar entre 1 e 1000."))]
    pub quantity: i32,

    // Atribuição de afiliado, quando o comprador veio de um link.
    pub partner_slug: Option<String>,
    pub click_id: Option<Uuid>,
}

// Handler: cria a venda PENDING e a sessão de checkout hospedado.
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CreateCheckoutPayload,
    responses((status = 201, body = CheckoutSession), (status = 422)),
    tag = "Storefront"
)]
pub async fn create_checkout(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sale = app_state
        .sale_service
        .create_online_sale(
            payload.raffle_id,
            payload.partner_slug.as_deref(),
            payload.click_id,
            CustomerInfo {
                name: &payload.customer_name,
                whatsapp: &payload.customer_whatsapp,
                city: &payload.customer_city,
            },
            payload.quantity,
        )
        .await?;

    let raffle = app_state.raffle_service.find_by_id(sale.raffle_id).await?;

    let session = app_state
        .payment_gateway
        .create_checkout_session(&CheckoutRequest {
            sale_id: sale.id,
            description: format!("{} — {} número(s)", raffle.title, sale.quantity),
            amount: sale.total_amount,
            customer_name: sale.customer_name.clone(),
            customer_whatsapp: sale.customer_whatsapp.clone(),
            success_url: app_state.checkout.success_url.clone(),
            cancel_url: app_state.checkout.cancel_url.clone(),
        })
        .await?;

    app_state
        .sale_service
        .attach_session(sale.id, &session.session_id)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

// ---
// Resposta do polling de pagamento
// ---
#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStatusResponse {
    pub paid: bool,
    // Preenchido quando o pagamento confirmou: números e prêmios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CompletedSale>,
}

// Handler: o storefront fica consultando até a sessão pagar.
#[utoipa::path(
    get,
    path = "/api/checkout/{session_id}",
    params(("session_id" = String, Path, description = "Sessão de checkout")),
    responses((status = 200, body = CheckoutStatusResponse)),
    tag = "Storefront"
)]
pub async fn verify_checkout(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CheckoutStatusResponse>, AppError> {
    let status = app_state
        .payment_gateway
        .get_session_status(&session_id)
        .await?;

    if !status.paid {
        return Ok(Json(CheckoutStatusResponse {
            paid: false,
            result: None,
        }));
    }

    let completed = app_state.sale_service.finalize_paid_sale(&session_id).await?;

    Ok(Json(CheckoutStatusResponse {
        paid: true,
        result: Some(completed),
    }))
}

// Handler: comprovante em PDF de uma venda completada.
#[utoipa::path(
    get,
    path = "/api/sales/{id}/receipt",
    params(("id" = Uuid, Path, description = "Id da venda")),
    responses((status = 200, body = Vec<u8>, content_type = "application/pdf")),
    tag = "Storefront"
)]
pub async fn get_receipt(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.receipt_service.generate_sale_receipt(id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"comprovante-{}.pdf\"", id),
            ),
        ],
        pdf,
    ))
}
