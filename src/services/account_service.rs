use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{Db, DbError};
use crate::database::models::User;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User already belongs to a different company")]
    CompanyMismatch,
    #[error("User not found")]
    UserNotFound,
    #[error("No company resolved for this request")]
    NoCompanyResolved,
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Decision for associating a principal with a company during a federated
/// login. Computed before any write so the conflict rule is enforced in one
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    /// User has no company yet; bind them.
    Assign,
    /// User is already bound to this company; nothing to do.
    AlreadyMember,
}

/// An identity bound to one company must never silently move to another:
/// conflicts are rejected, not resolved by overwrite.
pub fn association_outcome(
    current_company: Option<Uuid>,
    target_company: Uuid,
) -> Result<AssociationOutcome, AccountError> {
    match current_company {
        None => Ok(AssociationOutcome::Assign),
        Some(existing) if existing == target_company => Ok(AssociationOutcome::AlreadyMember),
        Some(_) => Err(AccountError::CompanyMismatch),
    }
}

/// Account/company association used by the federated-login flow. Token
/// exchange and credential handling live in the authentication subsystem;
/// only the tenancy rule is enforced here.
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub async fn new() -> Result<Self, AccountError> {
        let pool = Db::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AccountError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, company_id, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Bind `user_id` to `company_id`, enforcing the no-reassignment rule.
    pub async fn associate_company(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<User, AccountError> {
        let user = self.get_user(user_id).await?.ok_or(AccountError::UserNotFound)?;

        match association_outcome(user.company_id, company_id)? {
            AssociationOutcome::AlreadyMember => Ok(user),
            AssociationOutcome::Assign => {
                let updated = sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET company_id = $2, updated_at = now()
                    WHERE id = $1
                    RETURNING id, email, password_hash, company_id, is_active, created_at, updated_at
                    "#,
                )
                .bind(user_id)
                .bind(company_id)
                .fetch_one(&self.pool)
                .await?;

                Ok(updated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_user_is_bound() {
        let company = Uuid::new_v4();
        assert_eq!(
            association_outcome(None, company).unwrap(),
            AssociationOutcome::Assign
        );
    }

    #[test]
    fn existing_member_is_a_no_op() {
        let company = Uuid::new_v4();
        assert_eq!(
            association_outcome(Some(company), company).unwrap(),
            AssociationOutcome::AlreadyMember
        );
    }

    #[test]
    fn conflicting_association_is_hard_denied() {
        let outcome = association_outcome(Some(Uuid::new_v4()), Uuid::new_v4());
        assert!(matches!(outcome, Err(AccountError::CompanyMismatch)));
    }
}
