//! Object store gateway for document files using Apache OpenDAL.
//!
//! This module provides vendor-agnostic private object storage with
//! support for:
//! - S3-compatible: AWS S3, DigitalOcean Spaces, MinIO
//! - Local filesystem (development and tests)
//!
//! Uploaded objects are private; read access is granted through
//! time-limited signed URLs. The gateway also derives the public-facing
//! locator for each object and can parse a locator back into its key.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{SignedUrl, StorageService};
