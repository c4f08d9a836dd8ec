// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Partner,
    Customer,
}

// Representa um perfil vindo do banco de dados.
// Clientes, parceiros (afiliados) e admins moram na mesma tabela;
// o que muda é o `role`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub whatsapp: Option<String>,
    pub city: Option<String>,
    pub role: UserRole,

    // Slug único que forma o link de divulgação do parceiro (/r/{slug})
    pub slug: String,
    pub pix_key: Option<String>,

    // Perfil nunca é apagado, só desativado.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Um parceiro só comissiona se ainda estiver ativo e com o papel certo.
    pub fn is_commissionable(&self) -> bool {
        self.is_active && self.role == UserRole::Partner
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do perfil)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(role: UserRole, is_active: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password_hash: "x".to_string(),
            whatsapp: None,
            city: None,
            role,
            slug: "maria".to_string(),
            pix_key: None,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_active_partners_earn_commission() {
        assert!(profile_with(UserRole::Partner, true).is_commissionable());
        assert!(!profile_with(UserRole::Partner, false).is_commissionable());
        assert!(!profile_with(UserRole::Customer, true).is_commissionable());
        assert!(!profile_with(UserRole::Admin, true).is_commissionable());
    }
}
