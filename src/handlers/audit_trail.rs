use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::recorder;
use crate::database::manager::Db;
use crate::error::ApiError;
use crate::tenancy::ResolvedCompany;

#[derive(Debug, Deserialize)]
pub struct TrailQuery {
    pub limit: Option<i64>,
}

/// GET /api/audit - company-scoped compliance trail, newest first
pub async fn list_audit_entries(
    Extension(resolved): Extension<ResolvedCompany>,
    Query(query): Query<TrailQuery>,
) -> Result<Json<Value>, ApiError> {
    let company = resolved
        .company()
        .ok_or_else(|| ApiError::forbidden("Company context required"))?;

    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let pool = Db::pool().await?;
    let entries = recorder::recent_entries(&pool, company.id, limit).await?;

    Ok(Json(json!({ "success": true, "data": entries })))
}
