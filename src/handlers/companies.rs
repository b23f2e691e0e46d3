use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::CompanyService;

fn require_root(auth_user: &AuthUser) -> Result<(), ApiError> {
    if auth_user.is_root() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Root access required"))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub slug: String,
}

/// POST /api/root/companies
pub async fn create_company(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCompany>,
) -> Result<Json<Value>, ApiError> {
    require_root(&auth_user)?;

    let service = CompanyService::new().await?;
    let company = service.create_company(&body.name, &body.slug).await?;

    Ok(Json(json!({ "success": true, "data": company })))
}

/// GET /api/root/companies
pub async fn list_companies(
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    require_root(&auth_user)?;

    let service = CompanyService::new().await?;
    let companies = service.list_companies().await?;

    Ok(Json(json!({ "success": true, "data": companies })))
}

/// GET /api/root/companies/:id
pub async fn show_company(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_root(&auth_user)?;

    let service = CompanyService::new().await?;
    let company = service
        .get_company(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(Json(json!({ "success": true, "data": company })))
}

/// DELETE /api/root/companies/:id - deactivate, never hard-delete
pub async fn deactivate_company(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_root(&auth_user)?;

    let service = CompanyService::new().await?;
    let company = service.deactivate_company(id).await?;

    Ok(Json(json!({ "success": true, "data": company })))
}
