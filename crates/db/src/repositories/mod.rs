//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod document;
pub mod user;

pub use document::DocumentRepository;
pub use user::UserRepository;
