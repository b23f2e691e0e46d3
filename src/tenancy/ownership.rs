use uuid::Uuid;

use crate::tenancy::ResolvedCompany;

/// Capability exposing which company owns a record. Kinds without tenant
/// ownership return None and are always denied by the guard; they should not
/// be routed through single-object authorization at all.
pub trait CompanyOwned {
    fn owner_company_id(&self) -> Option<Uuid>;
}

/// Single-object ownership check, evaluated at the object-access boundary in
/// addition to collection-level scoping. Collection filters alone do not
/// stop access through a guessed identifier, so this runs on every
/// read/update/delete of one resource.
///
/// Stateless: compares identity keys of already-loaded data, never names or
/// slugs, and performs no I/O.
pub fn permits(resolved: &ResolvedCompany, target: &impl CompanyOwned) -> bool {
    let Some(owner) = target.owner_company_id() else {
        return false;
    };
    let Some(company) = resolved.company() else {
        return false;
    };
    owner == company.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Company;
    use chrono::Utc;

    struct Owned(Option<Uuid>);

    impl CompanyOwned for Owned {
        fn owner_company_id(&self) -> Option<Uuid> {
            self.0
        }
    }

    fn company(id: Uuid) -> Company {
        Company {
            id,
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn permits_matching_company() {
        let id = Uuid::new_v4();
        let resolved = ResolvedCompany::resolved(company(id));
        assert!(permits(&resolved, &Owned(Some(id))));
    }

    #[test]
    fn denies_cross_company_access() {
        let resolved = ResolvedCompany::resolved(company(Uuid::new_v4()));
        assert!(!permits(&resolved, &Owned(Some(Uuid::new_v4()))));
    }

    #[test]
    fn denies_when_no_company_resolved() {
        let resolved = ResolvedCompany::none();
        assert!(!permits(&resolved, &Owned(Some(Uuid::new_v4()))));
    }

    #[test]
    fn denies_ownerless_objects_regardless_of_context() {
        let resolved = ResolvedCompany::resolved(company(Uuid::new_v4()));
        assert!(!permits(&resolved, &Owned(None)));
        assert!(!permits(&ResolvedCompany::none(), &Owned(None)));
    }
}
