// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, UserRole},
};

// O repositório de perfis, responsável por todas as interações com a
// tabela 'profiles'.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let maybe_profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_profile)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let maybe_profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_profile)
    }

    // Resolve o dono de um link de divulgação (/r/{slug}).
    pub async fn find_by_slug<'e, E>(
        &self,
        executor: E,
        slug: &str,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_profile)
    }

    // Cria um novo perfil, com tratamento específico para e-mail e slug
    // duplicados (nomes dos índices únicos da migration).
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
        whatsapp: Option<&str>,
        city: Option<&str>,
        role: UserRole,
        slug: &str,
        pix_key: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (name, email, password_hash, whatsapp, city, role, slug, pix_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(whatsapp)
        .bind(city)
        .bind(role)
        .bind(slug)
        .bind(pix_key)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    if let Some(constraint) = db_err.constraint() {
                        return match constraint {
                            "profiles_email_key" => AppError::EmailAlreadyExists,
                            "profiles_slug_key" => AppError::SlugAlreadyExists,
                            _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                        };
                    }
                }
            }
            e.into()
        })?;

        Ok(profile)
    }

    // Desativação (nunca apagamos perfil).
    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_active: bool,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

        Ok(profile)
    }

    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        whatsapp: Option<&str>,
        city: Option<&str>,
        pix_key: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET whatsapp  = COALESCE($2, whatsapp),
                city      = COALESCE($3, city),
                pix_key   = COALESCE($4, pix_key),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(whatsapp)
        .bind(city)
        .bind(pix_key)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

        Ok(profile)
    }

    pub async fn list_partners<'e, E>(&self, executor: E) -> Result<Vec<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let partners = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE role = $1 ORDER BY name ASC",
        )
        .bind(UserRole::Partner)
        .fetch_all(executor)
        .await?;
        Ok(partners)
    }
}
