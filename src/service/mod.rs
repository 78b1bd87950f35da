//! Operations over the HR store. Every multi-statement write runs in one
//! transaction and reports failures as [`ServiceError`](crate::error::ServiceError).

pub mod accounts;
pub mod cases;
pub mod deletion;
pub mod directory;
pub mod employment;
pub mod onboarding;
pub mod validation;

pub use deletion::delete_employee;
pub use directory::{get_employee, list_employees};
pub use employment::update_employee;
pub use onboarding::onboard;
