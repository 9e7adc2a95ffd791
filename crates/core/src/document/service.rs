//! Document service implementation.

use std::sync::Arc;

use tracing::warn;
use veritax_shared::Identity;

use super::error::DocumentError;
use super::types::{
    Document, DocumentFilter, DocumentPatch, NewDocument, UpdateDocumentInput, UploadDocumentInput,
};
use crate::storage::{SignedUrl, StorageError, StorageService};

/// Repository trait for document persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait DocumentRepository: Send + Sync {
    /// Create a new document record.
    fn insert(
        &self,
        document: NewDocument,
    ) -> impl std::future::Future<Output = Result<Document, DocumentError>> + Send;

    /// Find document by ID.
    fn find_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Document>, DocumentError>> + Send;

    /// List documents for an owner, applying the filter.
    fn find_all(
        &self,
        owner: &Identity,
        filter: DocumentFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send;

    /// Apply a partial update to a document.
    ///
    /// Returns `None` when the record does not exist.
    fn update(
        &self,
        id: i64,
        patch: DocumentPatch,
    ) -> impl std::future::Future<Output = Result<Option<Document>, DocumentError>> + Send;

    /// Delete document by ID. Returns whether a record was removed.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, DocumentError>> + Send;
}

/// Document service managing the full document lifecycle.
///
/// The storage gateway is optional: metadata operations keep working
/// without one, while operations that touch object storage fail with a
/// configuration error.
pub struct DocumentService<R: DocumentRepository> {
    storage: Option<Arc<StorageService>>,
    repo: Arc<R>,
}

impl<R: DocumentRepository> DocumentService<R> {
    /// Create a new document service.
    #[must_use]
    pub fn new(storage: Option<Arc<StorageService>>, repo: Arc<R>) -> Self {
        Self { storage, repo }
    }

    /// Upload a document file and create its record.
    ///
    /// The file is stored as a private object under a fresh key derived
    /// from the owner and the document name, and the record is created
    /// with the object's locator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Object storage is not configured
    /// - Storage upload fails
    /// - Database operation fails
    pub async fn upload(
        &self,
        owner: &Identity,
        input: UploadDocumentInput,
    ) -> Result<Document, DocumentError> {
        let storage = self.storage()?;
        let key = StorageService::derive_key(owner.email(), &input.document_name);

        let file_url = storage
            .upload(&key, &input.file.content_type, input.file.content)
            .await?;

        self.repo
            .insert(NewDocument {
                owner: owner.clone(),
                category: input.category,
                document_name: input.document_name,
                amount: input.amount,
                relevant_tax_year: input.relevant_tax_year,
                file_url,
            })
            .await
    }

    /// List the owner's documents, oldest record first.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails.
    pub async fn list(
        &self,
        owner: &Identity,
        filter: DocumentFilter,
    ) -> Result<Vec<Document>, DocumentError> {
        self.repo.find_all(owner, filter).await
    }

    /// Apply a partial update to one of the owner's documents.
    ///
    /// When a replacement file is provided it is uploaded under a fresh
    /// key and the record's locator is switched over. The previous
    /// object is kept; objects are only deleted together with their
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Document not found, or owned by someone else
    /// - A file was provided but object storage is not configured
    /// - Storage upload fails
    /// - Database operation fails
    pub async fn update(
        &self,
        owner: &Identity,
        id: i64,
        input: UpdateDocumentInput,
    ) -> Result<Document, DocumentError> {
        let existing = self.find_owned(owner, id).await?;

        let mut patch = DocumentPatch {
            category: input.category,
            document_name: input.document_name,
            amount: input.amount,
            relevant_tax_year: input.relevant_tax_year,
            file_url: None,
        };

        if let Some(file) = input.file {
            let storage = self.storage()?;
            let name = patch
                .document_name
                .as_deref()
                .unwrap_or(&existing.document_name);
            let key = StorageService::derive_key(owner.email(), name);

            let file_url = storage.upload(&key, &file.content_type, file.content).await?;
            patch.file_url = Some(file_url);
        }

        self.repo
            .update(id, patch)
            .await?
            .ok_or_else(|| DocumentError::not_found(id))
    }

    /// Delete one of the owner's documents.
    ///
    /// The stored object is removed first; a storage failure is logged
    /// and does not stop the record deletion, which is authoritative.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Document not found, or owned by someone else
    /// - Database deletion fails
    pub async fn delete(&self, owner: &Identity, id: i64) -> Result<(), DocumentError> {
        let document = self.find_owned(owner, id).await?;

        match &self.storage {
            Some(storage) => match storage.parse_key(&document.file_url) {
                Some(key) => {
                    if let Err(error) = storage.delete(&key).await {
                        warn!(
                            document_id = id,
                            %error,
                            "failed to delete stored object, removing record anyway"
                        );
                    }
                }
                None => {
                    warn!(
                        document_id = id,
                        file_url = %document.file_url,
                        "locator does not resolve to a stored object, removing record only"
                    );
                }
            },
            None => {
                warn!(
                    document_id = id,
                    "object storage not configured, removing record only"
                );
            }
        }

        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(DocumentError::not_found(id));
        }

        Ok(())
    }

    /// Generate a signed download URL for one of the owner's documents.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Document not found, or owned by someone else
    /// - Object storage is not configured
    /// - The record's locator does not resolve to a storage key
    /// - The storage provider cannot sign URLs
    pub async fn download_url(
        &self,
        owner: &Identity,
        id: i64,
        ttl_secs: Option<u64>,
    ) -> Result<SignedUrl, DocumentError> {
        let document = self.find_owned(owner, id).await?;
        let storage = self.storage()?;

        let key = storage
            .parse_key(&document.file_url)
            .ok_or_else(|| StorageError::invalid_locator(document.file_url.clone()))?;

        Ok(storage.presign_download(&key, ttl_secs).await?)
    }

    /// Get the storage gateway, or a configuration error when absent.
    fn storage(&self) -> Result<&StorageService, DocumentError> {
        self.storage
            .as_deref()
            .ok_or_else(|| StorageError::configuration("object storage is not configured").into())
    }

    /// Fetch a document and check it belongs to the caller.
    ///
    /// A document owned by someone else is reported as missing.
    async fn find_owned(&self, owner: &Identity, id: i64) -> Result<Document, DocumentError> {
        let document = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DocumentError::not_found(id))?;

        if document.owner != *owner {
            return Err(DocumentError::not_found(id));
        }

        Ok(document)
    }
}
