//! Core business logic for Veritax.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, the object storage gateway, and the
//! document lifecycle orchestration live here.
//!
//! # Modules
//!
//! - `document` - Document lifecycle (upload, list, update, delete)
//! - `storage` - Object storage gateway over Apache OpenDAL
//! - `auth` - Password hashing for the user directory seed path

pub mod auth;
pub mod document;
pub mod storage;
