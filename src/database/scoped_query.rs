use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::database::manager::DbError;
use crate::tenancy::ResolvedCompany;

/// Capability implemented by every business record that is scoped to a
/// company. Owned entities always carry a `company_id` column and a nullable
/// `deleted_at` marker, so the builder composes both filters for any
/// implementor.
pub trait OwnedEntity {
    /// Table identifier. A compile-time constant, never derived from input.
    const TABLE: &'static str;
}

/// Typed bind parameter for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
    Int(i64),
}

impl From<Uuid> for SqlParam {
    fn from(v: Uuid) -> Self {
        SqlParam::Uuid(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

/// Collection query restricted to the rows the request may see.
///
/// Narrowing rules:
/// - a resolved company restricts to that company's rows; no resolved
///   company applies no tenant narrowing (authentication middleware is the
///   layer that rejects untenanted access outright);
/// - soft-deleted rows are excluded unless `include_deleted` is requested
///   for an administrative view.
pub struct ScopedQuery<T> {
    conditions: Vec<(String, SqlParam)>,
    include_deleted: bool,
    order_by: Option<&'static str>,
    limit: Option<i64>,
    _phantom: PhantomData<T>,
}

impl<T> ScopedQuery<T>
where
    T: OwnedEntity + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn scoped_to(resolved: &ResolvedCompany) -> Self {
        let mut query = Self {
            conditions: Vec::new(),
            include_deleted: false,
            order_by: None,
            limit: None,
            _phantom: PhantomData,
        };
        if let Some(company) = resolved.company() {
            query
                .conditions
                .push(("company_id".to_string(), SqlParam::Uuid(company.id)));
        }
        query
    }

    pub fn and_where(mut self, column: &str, value: impl Into<SqlParam>) -> Self {
        self.conditions.push((column.to_string(), value.into()));
        self
    }

    /// Administrative/audit views only.
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn order_by(mut self, clause: &'static str) -> Self {
        self.order_by = Some(clause);
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    fn build(&self) -> (String, Vec<SqlParam>) {
        let mut sql = format!("SELECT * FROM \"{}\"", T::TABLE);
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<SqlParam> = Vec::new();

        for (column, value) in &self.conditions {
            params.push(value.clone());
            clauses.push(format!("\"{}\" = ${}", column, params.len()));
        }
        if !self.include_deleted {
            clauses.push("\"deleted_at\" IS NULL".to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if let Some(order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }

    pub async fn fetch_all(self, pool: &PgPool) -> Result<Vec<T>, DbError> {
        let (sql, params) = self.build();
        let mut query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            query = bind_param(query, param);
        }
        Ok(query.fetch_all(pool).await?)
    }

    pub async fn fetch_optional(self, pool: &PgPool) -> Result<Option<T>, DbError> {
        let (sql, params) = self.build();
        let mut query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            query = bind_param(query, param);
        }
        Ok(query.fetch_optional(pool).await?)
    }
}

fn bind_param<O>(
    query: sqlx::query::QueryAs<'_, sqlx::Postgres, O, PgArguments>,
    param: SqlParam,
) -> sqlx::query::QueryAs<'_, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match param {
        SqlParam::Uuid(v) => query.bind(v),
        SqlParam::Text(v) => query.bind(v),
        SqlParam::Bool(v) => query.bind(v),
        SqlParam::Int(v) => query.bind(v),
    }
}
