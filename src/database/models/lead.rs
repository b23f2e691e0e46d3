use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::audit::{AuditValue, Auditable};
use crate::database::scoped_query::OwnedEntity;
use crate::tenancy::ownership::CompanyOwned;

/// Sales lead. The representative owned entity: scoped to exactly one
/// company, soft-deletable, and audited on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    /// Set at creation, never changed afterwards.
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub client_company: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "qualified" => Some(LeadStatus::Qualified),
            "converted" => Some(LeadStatus::Converted),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }
}

impl OwnedEntity for Lead {
    const TABLE: &'static str = "leads";
}

impl CompanyOwned for Lead {
    fn owner_company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }
}

impl Auditable for Lead {
    fn entity_type(&self) -> &'static str {
        "Lead"
    }

    fn entity_id(&self) -> String {
        self.id.to_string()
    }

    fn company_key(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn subject_email(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn field_value(&self, field: &str) -> Option<AuditValue> {
        match field {
            "name" => Some(AuditValue::from(self.name.as_str())),
            "email" => Some(AuditValue::from(self.email.as_str())),
            "phone" => self.phone.as_deref().map(AuditValue::from),
            "client_company" => self.client_company.as_deref().map(AuditValue::from),
            "status" => Some(AuditValue::from(self.status.as_str())),
            "notes" => self.notes.as_deref().map(AuditValue::from),
            "source" => self.source.as_deref().map(AuditValue::from),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_known_values() {
        for s in ["new", "contacted", "qualified", "converted", "lost"] {
            assert_eq!(LeadStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(LeadStatus::parse("archived").is_none());
    }
}
