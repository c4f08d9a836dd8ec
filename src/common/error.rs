use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Slug já existe")]
    SlugAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão necessária: {required}")]
    AccessDenied { required: &'static str },

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Rifa não encontrada")]
    RaffleNotFound,

    #[error("Rifa não está ativa")]
    RaffleNotActive,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Saque não encontrado")]
    WithdrawalNotFound,

    // Quantidade pedida maior do que o que resta na rifa.
    #[error("Restam apenas {available} números disponíveis")]
    InsufficientNumbers { available: i64 },

    #[error("Saldo insuficiente: disponível R$ {available}")]
    InsufficientBalance { available: Decimal },

    // Violação da UNIQUE (raffle_id, number) — outra venda levou o número.
    #[error("Número já vendido")]
    NumberAlreadyTaken,

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // Mensagem do provedor repassada como veio (sem retry).
    #[error("Erro do provedor de pagamento: {0}")]
    PaymentProvider(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::SlugAlreadyExists => {
                (StatusCode::CONFLICT, "Este link de divulgação já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::AccessDenied { required } => (
                StatusCode::FORBIDDEN,
                format!("Você precisa do papel '{}' para realizar esta ação.", required),
            ),
            AppError::ProfileNotFound => {
                (StatusCode::NOT_FOUND, "Perfil não encontrado.".to_string())
            }
            AppError::RaffleNotFound => {
                (StatusCode::NOT_FOUND, "Rifa não encontrada.".to_string())
            }
            AppError::SaleNotFound => {
                (StatusCode::NOT_FOUND, "Venda não encontrada.".to_string())
            }
            AppError::WithdrawalNotFound => {
                (StatusCode::NOT_FOUND, "Saque não encontrado.".to_string())
            }
            AppError::RaffleNotActive => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Esta rifa não está mais ativa.".to_string(),
            ),
            AppError::InsufficientNumbers { available } => (
                StatusCode::CONFLICT,
                format!("Restam apenas {} números disponíveis nesta rifa.", available),
            ),
            AppError::InsufficientBalance { available } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Saldo insuficiente. Disponível: R$ {:.2}.", available),
            ),
            AppError::NumberAlreadyTaken => (
                StatusCode::CONFLICT,
                "Um dos números foi vendido agora mesmo. Tente novamente.".to_string(),
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("Transição de status inválida: {} -> {}.", from, to),
            ),
            AppError::PaymentProvider(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Falha no provedor de pagamento: {}", msg),
            ),
            AppError::UniqueConstraintViolation(constraint) => (
                StatusCode::CONFLICT,
                format!("Registro duplicado ({}).", constraint),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
