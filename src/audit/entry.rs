use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable compliance record of one tracked mutation. Written once by the
/// recorder and never updated or deleted by the application; only the
/// scheduled retention job may remove rows after the legal window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    /// Best-effort attribution, not a strict requirement.
    pub company_id: Option<Uuid>,
    /// None for system-initiated changes.
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_personal_data: bool,
    /// Identifier of the person the data is about, usually an email.
    pub data_subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    /// Reserved for sensitive-data read logging; no default path emits it.
    View,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::View => "view",
        }
    }
}

/// Value captured for before/after audit columns. Primitives stringify
/// directly; entity references keep only `TypeName#id`; anything structured
/// falls back to its JSON rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Entity { type_name: &'static str, id: String },
    Json(serde_json::Value),
}

impl AuditValue {
    pub fn entity(type_name: &'static str, id: impl ToString) -> Self {
        AuditValue::Entity { type_name, id: id.to_string() }
    }

    pub fn serialize(&self) -> String {
        match self {
            AuditValue::Text(v) => v.clone(),
            AuditValue::Int(v) => v.to_string(),
            AuditValue::Float(v) => v.to_string(),
            AuditValue::Bool(v) => v.to_string(),
            AuditValue::Entity { type_name, id } => format!("{}#{}", type_name, id),
            AuditValue::Json(v) => v.to_string(),
        }
    }
}

impl From<&str> for AuditValue {
    fn from(v: &str) -> Self {
        AuditValue::Text(v.to_string())
    }
}

impl From<String> for AuditValue {
    fn from(v: String) -> Self {
        AuditValue::Text(v)
    }
}

impl From<i64> for AuditValue {
    fn from(v: i64) -> Self {
        AuditValue::Int(v)
    }
}

impl From<f64> for AuditValue {
    fn from(v: f64) -> Self {
        AuditValue::Float(v)
    }
}

impl From<bool> for AuditValue {
    fn from(v: bool) -> Self {
        AuditValue::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_stringify_directly() {
        assert_eq!(AuditValue::from("maria@acme.test").serialize(), "maria@acme.test");
        assert_eq!(AuditValue::from(42i64).serialize(), "42");
        assert_eq!(AuditValue::from(true).serialize(), "true");
        assert_eq!(AuditValue::from(1.5f64).serialize(), "1.5");
    }

    #[test]
    fn entities_serialize_as_type_and_id() {
        let id = Uuid::new_v4();
        let value = AuditValue::entity("Company", id);
        assert_eq!(value.serialize(), format!("Company#{}", id));
    }

    #[test]
    fn structured_values_fall_back_to_json() {
        let value = AuditValue::Json(json!({"status": "new"}));
        assert_eq!(value.serialize(), r#"{"status":"new"}"#);
    }

    #[test]
    fn action_names_are_stable() {
        assert_eq!(AuditAction::Create.as_str(), "create");
        assert_eq!(AuditAction::Update.as_str(), "update");
        assert_eq!(AuditAction::Delete.as_str(), "delete");
        assert_eq!(AuditAction::View.as_str(), "view");
    }
}
