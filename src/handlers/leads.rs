use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::audit::{self, AuditAction, AuditValue, Auditable, FieldChange, RequestMeta};
use crate::database::manager::Db;
use crate::database::models::{Lead, LeadStatus};
use crate::database::scoped_query::ScopedQuery;
use crate::error::ApiError;
use crate::tenancy::{ownership, ResolvedCompany};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Administrative override: include soft-deleted rows.
    pub deleted: Option<bool>,
    pub status: Option<String>,
}

/// GET /api/leads - company-scoped collection
pub async fn list_leads(
    Extension(resolved): Extension<ResolvedCompany>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let pool = Db::pool().await?;

    let mut scoped = ScopedQuery::<Lead>::scoped_to(&resolved).order_by("\"created_at\" DESC");
    if query.deleted.unwrap_or(false) {
        scoped = scoped.include_deleted();
    }
    if let Some(status) = &query.status {
        let status = LeadStatus::parse(status)
            .ok_or_else(|| ApiError::bad_request("Unknown lead status"))?;
        scoped = scoped.and_where("status", status.as_str());
    }

    let leads = scoped.fetch_all(&pool).await?;
    Ok(Json(json!({ "success": true, "data": leads })))
}

#[derive(Debug, Deserialize)]
pub struct CreateLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub client_company: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// POST /api/leads - create under the resolved company
pub async fn create_lead(
    Extension(resolved): Extension<ResolvedCompany>,
    Extension(meta): Extension<RequestMeta>,
    Json(body): Json<CreateLead>,
) -> Result<Json<Value>, ApiError> {
    let company = resolved
        .company()
        .ok_or_else(|| ApiError::forbidden("Company context required"))?;

    let status = match &body.status {
        Some(raw) => LeadStatus::parse(raw)
            .ok_or_else(|| ApiError::bad_request("Unknown lead status"))?,
        None => LeadStatus::New,
    };

    let pool = Db::pool().await?;
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (id, company_id, name, email, phone, client_company, status, notes, source)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, company_id, name, email, phone, client_company, status, notes, source,
                  created_at, updated_at, deleted_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company.id)
    .bind(&body.name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.client_company)
    .bind(status.as_str())
    .bind(&body.notes)
    .bind(&body.source)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("lead insert failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    audit::record(&lead, AuditAction::Create, None, Some(&meta)).await;

    Ok(Json(json!({ "success": true, "data": lead })))
}

/// GET /api/leads/:id - single object, ownership-guarded
pub async fn get_lead(
    Extension(resolved): Extension<ResolvedCompany>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let lead = load_guarded(&resolved, id).await?;
    Ok(Json(json!({ "success": true, "data": lead })))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub client_company: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

/// PATCH /api/leads/:id - ownership-guarded update, one audit entry per
/// changed field
pub async fn update_lead(
    Extension(resolved): Extension<ResolvedCompany>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLead>,
) -> Result<Json<Value>, ApiError> {
    if let Some(raw) = &body.status {
        LeadStatus::parse(raw).ok_or_else(|| ApiError::bad_request("Unknown lead status"))?;
    }

    let before = load_guarded(&resolved, id).await?;
    let changes = collect_changes(&before, &body);

    if changes.is_empty() {
        return Ok(Json(json!({ "success": true, "data": before })));
    }

    let pool = Db::pool().await?;
    let after = sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET name = $2, email = $3, phone = $4, client_company = $5,
            status = $6, notes = $7, source = $8, updated_at = now()
        WHERE id = $1
        RETURNING id, company_id, name, email, phone, client_company, status, notes, source,
                  created_at, updated_at, deleted_at
        "#,
    )
    .bind(before.id)
    .bind(body.name.as_ref().unwrap_or(&before.name))
    .bind(body.email.as_ref().unwrap_or(&before.email))
    .bind(body.phone.as_ref().or(before.phone.as_ref()))
    .bind(body.client_company.as_ref().or(before.client_company.as_ref()))
    .bind(body.status.as_ref().unwrap_or(&before.status))
    .bind(body.notes.as_ref().or(before.notes.as_ref()))
    .bind(body.source.as_ref().or(before.source.as_ref()))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("lead update failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    for change in changes {
        audit::record(&after, AuditAction::Update, Some(change), Some(&meta)).await;
    }

    Ok(Json(json!({ "success": true, "data": after })))
}

/// DELETE /api/leads/:id - ownership-guarded soft delete
pub async fn delete_lead(
    Extension(resolved): Extension<ResolvedCompany>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let lead = load_guarded(&resolved, id).await?;

    let pool = Db::pool().await?;
    sqlx::query("UPDATE leads SET deleted_at = now(), updated_at = now() WHERE id = $1")
        .bind(lead.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("lead soft delete failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })?;

    audit::record(&lead, AuditAction::Delete, None, Some(&meta)).await;

    Ok(Json(json!({ "success": true })))
}

/// Load one lead and apply the ownership guard. The collection scope already
/// narrows the lookup; the guard still runs on the loaded row so a guessed
/// identifier can never cross companies even when no narrowing applied.
/// Denials are indistinguishable from missing rows.
async fn load_guarded(resolved: &ResolvedCompany, id: Uuid) -> Result<Lead, ApiError> {
    let pool = Db::pool().await?;
    let lead = ScopedQuery::<Lead>::scoped_to(resolved)
        .and_where("id", id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Lead not found"))?;

    if !ownership::permits(resolved, &lead) {
        tracing::warn!(
            "denied object access: {} {} outside requester company",
            lead.entity_type(),
            lead.entity_id()
        );
        return Err(ApiError::not_found("Lead not found"));
    }

    Ok(lead)
}

fn push_change(
    changes: &mut Vec<FieldChange>,
    lead: &Lead,
    field: &str,
    old: Option<&str>,
    new: Option<&String>,
) {
    if let Some(new) = new {
        if old != Some(new.as_str()) {
            changes.push(FieldChange::new(
                field,
                lead.field_value(field),
                Some(AuditValue::from(new.as_str())),
            ));
        }
    }
}

fn collect_changes(lead: &Lead, body: &UpdateLead) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    push_change(&mut changes, lead, "name", Some(lead.name.as_str()), body.name.as_ref());
    push_change(&mut changes, lead, "email", Some(lead.email.as_str()), body.email.as_ref());
    push_change(&mut changes, lead, "phone", lead.phone.as_deref(), body.phone.as_ref());
    push_change(
        &mut changes,
        lead,
        "client_company",
        lead.client_company.as_deref(),
        body.client_company.as_ref(),
    );
    push_change(&mut changes, lead, "status", Some(lead.status.as_str()), body.status.as_ref());
    push_change(&mut changes, lead, "notes", lead.notes.as_deref(), body.notes.as_ref());
    push_change(&mut changes, lead, "source", lead.source.as_deref(), body.source.as_ref());
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead() -> Lead {
        Lead {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Maria Silva".to_string(),
            email: "maria@client.test".to_string(),
            phone: None,
            client_company: Some("Client Ltda".to_string()),
            status: "new".to_string(),
            notes: None,
            source: Some("landing-page".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn collects_only_fields_that_actually_change() {
        let lead = lead();
        let body = UpdateLead {
            email: Some("maria.silva@client.test".to_string()),
            status: Some("contacted".to_string()),
            // same value as current: not a change
            name: Some("Maria Silva".to_string()),
            ..Default::default()
        };

        let changes = collect_changes(&lead, &body);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "status"]);

        let email_change = &changes[0];
        assert_eq!(
            email_change.old_value.as_ref().unwrap().serialize(),
            "maria@client.test"
        );
        assert_eq!(
            email_change.new_value.as_ref().unwrap().serialize(),
            "maria.silva@client.test"
        );
    }

    #[test]
    fn setting_a_previously_null_field_is_a_change() {
        let lead = lead();
        let body = UpdateLead {
            phone: Some("+55 11 91234-5678".to_string()),
            ..Default::default()
        };

        let changes = collect_changes(&lead, &body);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "phone");
        assert!(changes[0].old_value.is_none());
    }

    #[test]
    fn untouched_body_produces_no_changes() {
        let changes = collect_changes(&lead(), &UpdateLead::default());
        assert!(changes.is_empty());
    }
}
