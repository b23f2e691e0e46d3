pub mod actor;
pub mod entry;
pub mod recorder;

pub use actor::Actor;
pub use entry::{AuditAction, AuditEntry, AuditValue};
pub use recorder::{record, Auditable, FieldChange, RequestMeta};
