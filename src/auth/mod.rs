pub mod claims;
pub mod jwt;

pub use claims::{AccessClaims, EmployeeRole};
pub use jwt::{sign_access_token, validate_access_token};
