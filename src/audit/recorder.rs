use async_trait::async_trait;
use axum::http::HeaderMap;
use sqlx::PgPool;
use std::net::IpAddr;
use uuid::Uuid;

use crate::audit::actor;
use crate::audit::entry::{AuditAction, AuditEntry, AuditValue};
use crate::config;
use crate::database::manager::{Db, DbError};
use crate::database::models::Company;

/// Field names whose changes count as personal data, with the localized
/// aliases the legacy schema used. Compared case-insensitively.
const PERSONAL_DATA_FIELDS: [&str; 10] = [
    "email",
    "cpf",
    "phone",
    "telefone",
    "name",
    "nome",
    "address",
    "endereco",
    "birth_date",
    "data_nascimento",
];

pub fn is_personal_field(field: &str) -> bool {
    let lowered = field.to_lowercase();
    PERSONAL_DATA_FIELDS.contains(&lowered.as_str())
}

/// What an entity exposes to the recorder. Every accessor is optional so the
/// recorder stays tolerant of kinds that lack the attribute.
pub trait Auditable: Send + Sync {
    fn entity_type(&self) -> &'static str;
    fn entity_id(&self) -> String;

    /// Direct company foreign key, if the kind carries one.
    fn company_key(&self) -> Option<Uuid> {
        None
    }

    /// Already-loaded company relation, if present in memory.
    fn company_ref(&self) -> Option<&Company> {
        None
    }

    /// Alias kept for records written before the tenant->company rename.
    fn legacy_tenant_key(&self) -> Option<Uuid> {
        None
    }

    /// Email-like attribute identifying the data subject.
    fn subject_email(&self) -> Option<String> {
        None
    }

    /// Email of the related user, tried when the entity has none itself.
    fn related_user_email(&self) -> Option<String> {
        None
    }

    /// Current value of a named field, for before/after capture.
    fn field_value(&self, field: &str) -> Option<AuditValue> {
        let _ = field;
        None
    }
}

/// One field-level change to attach to an entry.
#[derive(Debug, Clone)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<AuditValue>,
    pub new_value: Option<AuditValue>,
}

impl FieldChange {
    pub fn new(
        field: impl Into<String>,
        old_value: Option<AuditValue>,
        new_value: Option<AuditValue>,
    ) -> Self {
        Self { field: field.into(), old_value, new_value }
    }
}

/// Client metadata captured from the request. A garbled header yields an
/// absent value, never an error.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn from_request(headers: &HeaderMap, remote: Option<IpAddr>) -> Self {
        Self {
            ip_address: client_ip(headers, remote),
            user_agent: user_agent(headers),
        }
    }
}

/// Client IP: first comma-separated element of X-Forwarded-For when present,
/// otherwise the direct connection address.
fn client_ip(headers: &HeaderMap, remote: Option<IpAddr>) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    remote.map(|ip| ip.to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    let max_len = config::config().audit.max_user_agent_len;
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(max_len).collect())
}

/// One ordered step of company attribution. Strategies are tried in
/// sequence; the first that yields an id wins, and a strategy that cannot
/// resolve simply passes.
#[async_trait]
trait CompanyResolution: Send + Sync {
    async fn resolve(&self, entity: &dyn Auditable, pool: &PgPool) -> Option<Uuid>;
}

/// Direct foreign key, confirmed by primary-key lookup. A dangling key is
/// tolerated and falls through to the next strategy.
struct DirectKey;

#[async_trait]
impl CompanyResolution for DirectKey {
    async fn resolve(&self, entity: &dyn Auditable, pool: &PgPool) -> Option<Uuid> {
        let key = entity.company_key()?;
        match sqlx::query_scalar::<_, Uuid>("SELECT id FROM companies WHERE id = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("audit company key lookup failed: {}", e);
                None
            }
        }
    }
}

/// Company relation already loaded on the entity.
struct LoadedRef;

#[async_trait]
impl CompanyResolution for LoadedRef {
    async fn resolve(&self, entity: &dyn Auditable, _pool: &PgPool) -> Option<Uuid> {
        entity.company_ref().map(|company| company.id)
    }
}

/// Legacy alias from before the tenant->company rename.
struct LegacyKey;

#[async_trait]
impl CompanyResolution for LegacyKey {
    async fn resolve(&self, entity: &dyn Auditable, _pool: &PgPool) -> Option<Uuid> {
        entity.legacy_tenant_key()
    }
}

static STRATEGIES: [&(dyn CompanyResolution); 3] = [&DirectKey, &LoadedRef, &LegacyKey];

async fn resolve_company(entity: &dyn Auditable, pool: &PgPool) -> Option<Uuid> {
    for strategy in STRATEGIES {
        if let Some(id) = strategy.resolve(entity, pool).await {
            return Some(id);
        }
    }
    None
}

/// Personal-data flag plus the data subject it concerns. The subject is
/// only extracted for personal data: the entity's own email first, then the
/// related user's, otherwise unset. Missing attributes are never an error.
fn classify_personal(
    change: Option<&FieldChange>,
    entity: &dyn Auditable,
) -> (bool, Option<String>) {
    let is_personal = change
        .map(|c| is_personal_field(&c.field))
        .unwrap_or(false);

    if !is_personal {
        return (false, None);
    }

    let subject = entity.subject_email().or_else(|| entity.related_user_email());
    (true, subject)
}

/// Record an audit entry for a tracked mutation.
///
/// A missing actor, an unresolvable company or absent metadata degrade the
/// entry, never the call. Persistence
/// failures are logged at warning level and swallowed; a user-facing
/// mutation must not fail because its audit write did. Callers get `None`
/// instead of an error, and duplicate calls produce duplicate entries (each
/// call is one real event).
pub async fn record(
    entity: &dyn Auditable,
    action: AuditAction,
    change: Option<FieldChange>,
    meta: Option<&RequestMeta>,
) -> Option<AuditEntry> {
    let acting_user = actor::current();

    let pool = match Db::pool().await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("failed to create audit entry: {}", e);
            return None;
        }
    };

    let company_id = resolve_company(entity, &pool).await;

    let field_name = change.as_ref().map(|c| c.field.clone());
    let (is_personal, data_subject) = classify_personal(change.as_ref(), entity);

    let old_value = change.as_ref().and_then(|c| c.old_value.as_ref()).map(AuditValue::serialize);
    let new_value = change.as_ref().and_then(|c| c.new_value.as_ref()).map(AuditValue::serialize);

    let inserted = sqlx::query_as::<_, AuditEntry>(
        r#"
        INSERT INTO audit_entries (
            id, company_id, user_id, action, entity_type, entity_id,
            field_name, old_value, new_value, ip_address, user_agent,
            is_personal_data, data_subject
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING
            id, company_id, user_id, action, entity_type, entity_id,
            field_name, old_value, new_value, ip_address, user_agent,
            is_personal_data, data_subject, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(acting_user.as_ref().map(|a| a.user_id))
    .bind(action.as_str())
    .bind(entity.entity_type())
    .bind(entity.entity_id())
    .bind(field_name)
    .bind(old_value)
    .bind(new_value)
    .bind(meta.and_then(|m| m.ip_address.clone()))
    .bind(meta.and_then(|m| m.user_agent.clone()))
    .bind(is_personal)
    .bind(data_subject)
    .fetch_one(&pool)
    .await;

    match inserted {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("failed to create audit entry: {}", e);
            None
        }
    }
}

/// Company-scoped trail for the compliance view, newest first.
pub async fn recent_entries(
    pool: &PgPool,
    company_id: Uuid,
    limit: i64,
) -> Result<Vec<AuditEntry>, DbError> {
    let entries = sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, company_id, user_id, action, entity_type, entity_id,
               field_name, old_value, new_value, ip_address, user_agent,
               is_personal_data, data_subject, created_at
        FROM audit_entries
        WHERE company_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(company_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn personal_field_set_is_case_insensitive() {
        for field in ["email", "Email", "CPF", "telefone", "NOME", "birth_date", "data_nascimento"] {
            assert!(is_personal_field(field), "'{}' should be personal", field);
        }
        for field in ["status", "notes", "source", "client_company"] {
            assert!(!is_personal_field(field), "'{}' should not be personal", field);
        }
    }

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1, 10.0.0.2"),
        );
        let remote = Some("192.0.2.1".parse().unwrap());
        assert_eq!(client_ip(&headers, remote), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn client_ip_falls_back_to_connection_address() {
        let headers = HeaderMap::new();
        let remote = Some("192.0.2.1".parse().unwrap());
        assert_eq!(client_ip(&headers, remote), Some("192.0.2.1".to_string()));
        assert_eq!(client_ip(&headers, None), None);
    }

    #[test]
    fn user_agent_is_truncated() {
        let mut headers = HeaderMap::new();
        let long = "x".repeat(800);
        headers.insert("user-agent", HeaderValue::from_str(&long).unwrap());
        let ua = user_agent(&headers).unwrap();
        assert_eq!(ua.len(), 500);
    }

    #[test]
    fn request_meta_tolerates_missing_headers() {
        let meta = RequestMeta::from_request(&HeaderMap::new(), None);
        assert!(meta.ip_address.is_none());
        assert!(meta.user_agent.is_none());
    }

    struct Bare;

    impl Auditable for Bare {
        fn entity_type(&self) -> &'static str {
            "Bare"
        }
        fn entity_id(&self) -> String {
            "1".to_string()
        }
    }

    #[test]
    fn auditable_defaults_resolve_to_nothing() {
        let bare = Bare;
        assert!(bare.company_key().is_none());
        assert!(bare.company_ref().is_none());
        assert!(bare.legacy_tenant_key().is_none());
        assert!(bare.subject_email().is_none());
        assert!(bare.related_user_email().is_none());
        assert!(bare.field_value("email").is_none());
    }

    #[derive(Default)]
    struct Probe {
        direct: Option<Uuid>,
        loaded: Option<Company>,
        legacy: Option<Uuid>,
        own_email: Option<String>,
        user_email: Option<String>,
    }

    impl Auditable for Probe {
        fn entity_type(&self) -> &'static str {
            "Probe"
        }
        fn entity_id(&self) -> String {
            "1".to_string()
        }
        fn company_key(&self) -> Option<Uuid> {
            self.direct
        }
        fn company_ref(&self) -> Option<&Company> {
            self.loaded.as_ref()
        }
        fn legacy_tenant_key(&self) -> Option<Uuid> {
            self.legacy
        }
        fn subject_email(&self) -> Option<String> {
            self.own_email.clone()
        }
        fn related_user_email(&self) -> Option<String> {
            self.user_email.clone()
        }
    }

    fn change(field: &str) -> FieldChange {
        FieldChange::new(field, None, Some(AuditValue::from("x")))
    }

    #[test]
    fn personal_change_extracts_subject_from_entity_first() {
        let probe = Probe {
            own_email: Some("lead@client.test".to_string()),
            user_email: Some("owner@acme.test".to_string()),
            ..Default::default()
        };
        let (personal, subject) = classify_personal(Some(&change("email")), &probe);
        assert!(personal);
        assert_eq!(subject.as_deref(), Some("lead@client.test"));
    }

    #[test]
    fn subject_falls_back_to_related_user() {
        let probe = Probe {
            user_email: Some("owner@acme.test".to_string()),
            ..Default::default()
        };
        let (personal, subject) = classify_personal(Some(&change("telefone")), &probe);
        assert!(personal);
        assert_eq!(subject.as_deref(), Some("owner@acme.test"));
    }

    #[test]
    fn non_personal_changes_carry_no_subject() {
        let probe = Probe {
            own_email: Some("lead@client.test".to_string()),
            ..Default::default()
        };
        let (personal, subject) = classify_personal(Some(&change("status")), &probe);
        assert!(!personal);
        assert!(subject.is_none());

        let (personal, subject) = classify_personal(None, &probe);
        assert!(!personal);
        assert!(subject.is_none());
    }

    /// Pool that never reaches a server; strategies that would query must
    /// tolerate the failure and fall through.
    fn unreachable_pool() -> PgPool {
        use sqlx::postgres::PgPoolOptions;
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn entity_without_company_reference_resolves_to_none() {
        let pool = unreachable_pool();
        assert_eq!(resolve_company(&Bare, &pool).await, None);
    }

    #[tokio::test]
    async fn loaded_relation_resolves_without_storage() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let id = company.id;
        let probe = Probe { loaded: Some(company), ..Default::default() };
        let pool = unreachable_pool();
        assert_eq!(resolve_company(&probe, &pool).await, Some(id));
    }

    #[tokio::test]
    async fn legacy_alias_resolves_without_storage() {
        let legacy = Uuid::new_v4();
        let probe = Probe { legacy: Some(legacy), ..Default::default() };
        let pool = unreachable_pool();
        assert_eq!(resolve_company(&probe, &pool).await, Some(legacy));
    }

    #[tokio::test]
    async fn failed_key_lookup_falls_through_to_next_strategy() {
        let legacy = Uuid::new_v4();
        let probe = Probe {
            direct: Some(Uuid::new_v4()),
            legacy: Some(legacy),
            ..Default::default()
        };
        let pool = unreachable_pool();
        // Direct key lookup cannot reach the database; resolution degrades
        // to the legacy alias instead of erroring.
        assert_eq!(resolve_company(&probe, &pool).await, Some(legacy));
    }
}
