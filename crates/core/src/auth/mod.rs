//! Password hashing for user directory entries.
//!
//! Token issuance and login live outside this service; the hashing
//! helpers here are used when provisioning directory entries and by
//! the wider platform's login flow.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
