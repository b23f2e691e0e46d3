pub mod account;
pub mod audit_trail;
pub mod companies;
pub mod leads;
