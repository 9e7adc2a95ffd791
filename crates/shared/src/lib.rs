//! Shared configuration, identity, and credential types for Veritax.
//!
//! This crate provides the types used across all other crates:
//! - Application configuration loading
//! - The `Identity` type representing a verified document owner
//! - JWT claims and the verification service

pub mod auth;
pub mod config;
pub mod jwt;

pub use auth::{Claims, Identity};
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
