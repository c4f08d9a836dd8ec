// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::profile::{Claims, Profile, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            profile_repo,
            jwt_secret,
            pool,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        whatsapp: Option<&str>,
        city: Option<&str>,
        role: UserRole,
        pix_key: Option<&str>,
    ) -> Result<(Profile, String), AppError> {
        // 1. Hashing fora do executor async (bcrypt é pesado de CPU)
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Slug do link de divulgação. Se o nome já estiver em uso,
        // tenta uma vez com sufixo aleatório antes de desistir.
        let base_slug = slugify(name);
        let profile = match self
            .profile_repo
            .create(
                &self.pool,
                name,
                email,
                &hashed_password,
                whatsapp,
                city,
                role,
                &base_slug,
                pix_key,
            )
            .await
        {
            Err(AppError::SlugAlreadyExists) => {
                let suffix = Uuid::new_v4().simple().to_string();
                let retry_slug = format!("{}-{}", base_slug, &suffix[..6]);
                self.profile_repo
                    .create(
                        &self.pool,
                        name,
                        email,
                        &hashed_password,
                        whatsapp,
                        city,
                        role,
                        &retry_slug,
                        pix_key,
                    )
                    .await?
            }
            other => other?,
        };

        tracing::info!("✅ Perfil criado: {} ({:?})", profile.slug, profile.role);

        let token = self.create_token(profile.id)?;
        Ok((profile, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let profile = self
            .profile_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !profile.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = profile.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(profile.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.profile_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    fn create_token(&self, profile_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: profile_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// Normaliza um nome para virar slug de link: minúsculas, sem acento
// comum de pt-BR, resto vira hífen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // evita hífen na frente

    for c in name.chars() {
        let mapped = match c.to_lowercase().next().unwrap_or(c) {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        };

        if mapped.is_ascii_alphanumeric() {
            slug.push(mapped);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("parceiro");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugifies_accented_names() {
        assert_eq!(slugify("José da Conceição"), "jose-da-conceicao");
        assert_eq!(slugify("Maria  Luíza"), "maria-luiza");
    }

    #[test]
    fn collapses_symbols_and_trims_dashes() {
        assert_eq!(slugify("--Loja!! do João--"), "loja-do-joao");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(slugify("!!!"), "parceiro");
    }
}
