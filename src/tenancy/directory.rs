use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::config;
use crate::database::manager::Db;
use crate::database::models::Company;

/// Slug-to-company lookup over the active tenant registry, with a
/// bounded-TTL read-through cache. Activation changes become visible within
/// one TTL window; there is no invalidation protocol beyond expiry.
pub struct CompanyDirectory {
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

#[derive(Clone)]
struct CacheEntry {
    company: Option<Company>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

impl CompanyDirectory {
    pub fn instance() -> &'static CompanyDirectory {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<CompanyDirectory> = OnceLock::new();
        INSTANCE.get_or_init(|| CompanyDirectory {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(config::config().tenancy.directory_ttl_secs),
        })
    }

    /// Look up an active company by validated slug. Never propagates errors:
    /// unknown slugs, inactive companies and storage failures all collapse
    /// to None, so callers cannot distinguish them.
    pub async fn lookup(&self, slug: &str) -> Option<Company> {
        // Fast path: fresh cache entry
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(slug) {
                if entry.is_fresh(self.ttl) {
                    return entry.company.clone();
                }
            }
        }

        let company = match self.fetch(slug).await {
            Ok(found) => found,
            Err(e) => {
                // Slug is already syntax-validated, safe to include
                tracing::debug!("company directory lookup failed for '{}': {}", slug, e);
                return None;
            }
        };

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                slug.to_string(),
                CacheEntry { company: company.clone(), fetched_at: Instant::now() },
            );
        }

        company
    }

    async fn fetch(&self, slug: &str) -> Result<Option<Company>, crate::database::manager::DbError> {
        let pool = Db::pool().await?;
        self.fetch_with(&pool, slug).await
    }

    async fn fetch_with(
        &self,
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Company>, crate::database::manager::DbError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, slug, is_active, created_at, updated_at
            FROM companies
            WHERE slug = $1 AND is_active = true
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }
}
