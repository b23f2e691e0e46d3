use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::account_service::{AccountError, AccountService};
use crate::tenancy::ResolvedCompany;

/// POST /api/account/company - bind the authenticated user to the resolved
/// company. A user already bound elsewhere is refused outright; identity
/// conflicts are never resolved by reassignment.
pub async fn associate_company(
    Extension(auth_user): Extension<AuthUser>,
    Extension(resolved): Extension<ResolvedCompany>,
) -> Result<Json<Value>, ApiError> {
    let company = resolved.company().ok_or(AccountError::NoCompanyResolved)?;

    let service = AccountService::new().await?;
    let user = service.associate_company(auth_user.user_id, company.id).await?;

    Ok(Json(json!({ "success": true, "data": user })))
}
