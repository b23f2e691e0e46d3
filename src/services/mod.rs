pub mod account_service;
pub mod company_service;

pub use account_service::AccountService;
pub use company_service::CompanyService;
