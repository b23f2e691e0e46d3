pub mod company;
pub mod lead;
pub mod user;

pub use company::Company;
pub use lead::{Lead, LeadStatus};
pub use user::User;
