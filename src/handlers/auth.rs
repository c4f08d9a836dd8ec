use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, validate::validate_whatsapp},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::profile::{AuthResponse, Profile, UserRole},
};

// Dados para registro de um novo cliente
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(custom(function = "validate_whatsapp"))]
    pub whatsapp: Option<String>,

    pub city: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Handler de registro (clientes da vitrine)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses((status = 200, body = AuthResponse)),
    tag = "Auth"
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (_profile, token) = app_state
        .auth_service
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.whatsapp.as_deref(),
            payload.city.as_deref(),
            UserRole::Customer,
            None,
        )
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses((status = 200, body = AuthResponse)),
    tag = "Auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, body = Profile)),
    security(("api_jwt" = [])),
    tag = "Auth"
)]
pub async fn get_me(AuthenticatedUser(profile): AuthenticatedUser) -> Json<Profile> {
    Json(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_payload_validates_shape() {
        let payload = RegisterPayload {
            name: "J".to_string(),
            email: "nao-eh-email".to_string(),
            password: "123".to_string(),
            whatsapp: Some("abc".to_string()),
            city: None,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("whatsapp"));
    }

    #[test]
    fn valid_register_payload_passes() {
        let payload = RegisterPayload {
            name: "João".to_string(),
            email: "joao@example.com".to_string(),
            password: "segredo1".to_string(),
            whatsapp: Some("(11) 98888-7777".to_string()),
            city: Some("Campinas".to_string()),
        };
        assert!(payload.validate().is_ok());
    }
}
