pub mod core_auth;
pub mod helper;

pub use core_auth::{CredentialTable, PasswdEntry};
