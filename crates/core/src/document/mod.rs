//! Document lifecycle service.
//!
//! This module provides business logic for tax documents including:
//! - Uploading document files to private storage
//! - Listing and filtering a user's documents
//! - Partial metadata and file updates
//! - Deletion of the stored object and its record
//! - Signed download URL generation

mod error;
mod service;
mod types;

pub use error::DocumentError;
pub use service::{DocumentRepository, DocumentService};
pub use types::{
    Document, DocumentCategory, DocumentFilter, DocumentPatch, FileUpload, NewDocument,
    UpdateDocumentInput, UploadDocumentInput,
};
