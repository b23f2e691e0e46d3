pub mod directory;
pub mod ownership;
pub mod slug;

use crate::database::models::Company;

/// Outcome of tenant resolution, attached to every request before handler
/// logic runs. Absent, unknown and inactive companies are deliberately
/// indistinguishable here.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCompany(Option<Company>);

impl ResolvedCompany {
    pub fn resolved(company: Company) -> Self {
        Self(Some(company))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn company(&self) -> Option<&Company> {
        self.0.as_ref()
    }
}
