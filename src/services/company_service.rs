use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{Db, DbError};
use crate::database::models::Company;
use crate::tenancy::slug::is_valid_slug;

#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    #[error("Invalid company slug: {0}")]
    InvalidSlug(String),
    #[error("Company already exists: {0}")]
    AlreadyExists(String),
    #[error("Company not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Company lifecycle management: creation with slug validation, lookup,
/// listing and deactivation. Companies are never hard-deleted so their
/// audit history stays referentially intact; deactivation removes them
/// from the resolver within one directory cache window.
pub struct CompanyService {
    pool: PgPool,
}

impl CompanyService {
    pub async fn new() -> Result<Self, CompanyError> {
        let pool = Db::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_company(&self, name: &str, slug: &str) -> Result<Company, CompanyError> {
        if !is_valid_slug(slug) {
            return Err(CompanyError::InvalidSlug(format!(
                "'{}' must be lowercase letters, digits and inner hyphens",
                slug
            )));
        }
        if self.slug_taken(slug).await? {
            return Err(CompanyError::AlreadyExists(slug.to_string()));
        }

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, name, slug, is_active)
            VALUES ($1, $2, $3, true)
            RETURNING id, name, slug, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, CompanyError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies WHERE slug = $1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Option<Company>, CompanyError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, slug, is_active, created_at, updated_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, CompanyError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, slug, is_active, created_at, updated_at
            FROM companies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    /// Deactivate, never delete: existing audit rows keep their reference
    /// and the resolver stops seeing the company once its cache entry ages
    /// out.
    pub async fn deactivate_company(&self, id: Uuid) -> Result<Company, CompanyError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET is_active = false, updated_at = now()
            WHERE id = $1
            RETURNING id, name, slug, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        company.ok_or(CompanyError::NotFound)
    }
}
