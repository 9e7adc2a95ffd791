//! Object store gateway implementation using Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use opendal::{Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Namespace prefix for every document object key.
const KEY_NAMESPACE: &str = "documents";

/// Time-limited URL granting read access to one private object.
#[derive(Debug, Clone)]
pub struct SignedUrl {
    /// The signed URL.
    pub url: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Gateway over a private blob store.
///
/// Uploads objects, deletes them, signs download URLs, and translates
/// between object keys and the public-facing locator stored on each
/// document record.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                bucket,
                region,
                access_key_id,
                secret_access_key,
                endpoint,
            } => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .region(region)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key);

                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Derive a fresh object key for a document.
    ///
    /// Format: `documents/{owner}/{token}_{sanitized_name}` where the
    /// token is a random 32-character hex string. Keys are never reused:
    /// even the same owner uploading the same name twice gets distinct
    /// keys, so a replaced object can never clobber one still referenced
    /// by another record.
    #[must_use]
    pub fn derive_key(owner_email: &str, document_name: &str) -> String {
        let token = Uuid::new_v4().simple();
        let name = sanitize_document_name(document_name);
        format!("{KEY_NAMESPACE}/{owner_email}/{token}_{name}")
    }

    /// Upload an object as private and return its locator.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` on any transport or
    /// authentication error from the remote store.
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<String, StorageError> {
        self.operator
            .write_with(key, content)
            .content_type(content_type)
            .await
            .map_err(StorageError::from)?;

        Ok(self.object_url(key))
    }

    /// Delete an object from storage.
    ///
    /// The gateway reports failures; callers decide whether deletion is
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Generate a signed download URL for a private object.
    ///
    /// `ttl_secs` defaults to the configured TTL and is capped at
    /// [`StorageConfig::MAX_PRESIGN_TTL`], the longest lifetime the
    /// remote store accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_download(
        &self,
        key: &str,
        ttl_secs: Option<u64>,
    ) -> Result<SignedUrl, StorageError> {
        let ttl = self.effective_ttl(ttl_secs);

        let presigned = self
            .operator
            .presign_read(key, Duration::from_secs(ttl))
            .await
            .map_err(StorageError::from)?;

        Ok(SignedUrl {
            url: presigned.uri().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(i64::try_from(ttl).unwrap_or(i64::MAX)),
        })
    }

    /// Resolve the TTL for a signed URL request.
    fn effective_ttl(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.config.presign_ttl_secs)
            .min(StorageConfig::MAX_PRESIGN_TTL)
    }

    /// Build the locator for an object key.
    ///
    /// With a custom endpoint the locator is derived from bucket and
    /// endpoint host; otherwise the canonical region URL form is used.
    /// Both forms parse back into the key via [`Self::parse_key`].
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        match &self.config.provider {
            StorageProvider::S3 {
                bucket,
                region,
                endpoint,
                ..
            } => match endpoint {
                Some(endpoint) => {
                    let host = endpoint_host(endpoint);
                    format!("https://{bucket}.{host}/{key}")
                }
                None => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
            },
            StorageProvider::LocalFs { root } => {
                let root = root.to_string_lossy();
                let root = root.trim_end_matches('/');
                format!("file://{root}/{key}")
            }
        }
    }

    /// Recover the object key from a locator produced by
    /// [`Self::object_url`].
    ///
    /// Returns `None` when the locator does not match this gateway's
    /// bucket, for example a record written under an older storage
    /// configuration.
    #[must_use]
    pub fn parse_key(&self, locator: &str) -> Option<String> {
        match &self.config.provider {
            StorageProvider::S3 { bucket, .. } => {
                let rest = locator.strip_prefix(&format!("https://{bucket}."))?;
                let (_host, key) = rest.split_once('/')?;
                (!key.is_empty()).then(|| key.to_string())
            }
            StorageProvider::LocalFs { root } => {
                let root = root.to_string_lossy();
                let root = root.trim_end_matches('/');
                let key = locator.strip_prefix(&format!("file://{root}/"))?;
                (!key.is_empty()).then(|| key.to_string())
            }
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }
}

/// Strip the scheme and trailing slashes from an endpoint URL.
fn endpoint_host(endpoint: &str) -> &str {
    endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint)
        .trim_end_matches('/')
}

/// Sanitize a document name for use inside a storage key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores
/// survive; everything else becomes an underscore.
fn sanitize_document_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_service(endpoint: Option<&str>) -> StorageService {
        let config = StorageConfig::new(StorageProvider::s3(
            "taxdocs",
            "fra1",
            "key",
            "secret",
            endpoint.map(String::from),
        ));
        StorageService::from_config(config).expect("should create service")
    }

    #[test]
    fn test_sanitize_document_name() {
        assert_eq!(sanitize_document_name("receipt.pdf"), "receipt.pdf");
        assert_eq!(sanitize_document_name("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_document_name("test@#$%.doc"), "test____.doc");
        assert_eq!(sanitize_document_name("領収書.pdf"), "___.pdf");
    }

    #[test]
    fn test_endpoint_host() {
        assert_eq!(
            endpoint_host("https://fra1.digitaloceanspaces.com"),
            "fra1.digitaloceanspaces.com"
        );
        assert_eq!(endpoint_host("http://localhost:9000/"), "localhost:9000");
        assert_eq!(endpoint_host("minio.internal"), "minio.internal");
    }

    #[test]
    fn test_derive_key_is_owner_namespaced() {
        let key = StorageService::derive_key("ada@example.com", "receipt.pdf");

        assert!(key.starts_with("documents/ada@example.com/"));
        assert!(key.ends_with("_receipt.pdf"));
    }

    #[test]
    fn test_derive_key_never_repeats() {
        let a = StorageService::derive_key("ada@example.com", "receipt.pdf");
        let b = StorageService::derive_key("ada@example.com", "receipt.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_object_url_custom_endpoint() {
        let service = s3_service(Some("https://fra1.digitaloceanspaces.com"));
        let url = service.object_url("documents/ada@example.com/abc_receipt.pdf");

        assert_eq!(
            url,
            "https://taxdocs.fra1.digitaloceanspaces.com/documents/ada@example.com/abc_receipt.pdf"
        );
    }

    #[test]
    fn test_object_url_canonical_region() {
        let service = s3_service(None);
        let url = service.object_url("documents/ada@example.com/abc_receipt.pdf");

        assert_eq!(
            url,
            "https://taxdocs.s3.fra1.amazonaws.com/documents/ada@example.com/abc_receipt.pdf"
        );
    }

    #[test]
    fn test_parse_key_both_url_forms() {
        let with_endpoint = s3_service(Some("https://fra1.digitaloceanspaces.com"));
        let canonical = s3_service(None);
        let key = "documents/ada@example.com/abc_receipt.pdf";

        assert_eq!(
            with_endpoint.parse_key(&with_endpoint.object_url(key)),
            Some(key.to_string())
        );
        assert_eq!(
            canonical.parse_key(&canonical.object_url(key)),
            Some(key.to_string())
        );
    }

    #[test]
    fn test_parse_key_rejects_foreign_locator() {
        let service = s3_service(Some("https://fra1.digitaloceanspaces.com"));

        assert_eq!(service.parse_key("https://other-bucket.fra1.digitaloceanspaces.com/documents/x/y.pdf"), None);
        assert_eq!(service.parse_key("not a url"), None);
        assert_eq!(service.parse_key("https://taxdocs."), None);
    }

    #[test]
    fn test_local_fs_locator_roundtrip() {
        let config = StorageConfig::new(StorageProvider::local_fs("/tmp/veritax-test"));
        let service = StorageService::from_config(config).expect("should create service");
        let key = "documents/ada@example.com/abc_receipt.pdf";

        let url = service.object_url(key);
        assert_eq!(url, "file:///tmp/veritax-test/documents/ada@example.com/abc_receipt.pdf");
        assert_eq!(service.parse_key(&url), Some(key.to_string()));
    }

    #[test]
    fn test_effective_ttl_default_and_cap() {
        let service = s3_service(None);

        assert_eq!(service.effective_ttl(None), StorageConfig::DEFAULT_PRESIGN_TTL);
        assert_eq!(service.effective_ttl(Some(600)), 600);
        assert_eq!(
            service.effective_ttl(Some(StorageConfig::MAX_PRESIGN_TTL + 1)),
            StorageConfig::MAX_PRESIGN_TTL
        );
    }

    #[tokio::test]
    async fn test_upload_and_delete_local_fs() {
        let root = std::env::temp_dir().join(format!("veritax-storage-{}", Uuid::new_v4()));
        let config = StorageConfig::new(StorageProvider::local_fs(&root));
        let service = StorageService::from_config(config).expect("should create service");

        let key = StorageService::derive_key("ada@example.com", "receipt.pdf");
        let locator = service
            .upload(&key, "application/pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .expect("upload should succeed");

        assert_eq!(service.parse_key(&locator), Some(key.clone()));
        assert!(root.join(&key).exists());

        service.delete(&key).await.expect("delete should succeed");
        assert!(!root.join(&key).exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_presign_unsupported_on_local_fs() {
        let root = std::env::temp_dir().join(format!("veritax-storage-{}", Uuid::new_v4()));
        let config = StorageConfig::new(StorageProvider::local_fs(&root));
        let service = StorageService::from_config(config).expect("should create service");

        let result = service.presign_download("documents/a/b.pdf", None).await;
        assert!(matches!(result, Err(StorageError::PresignNotSupported)));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // For any derived key, the key SHALL live under the owner's
    // namespace and end with the sanitized document name.
    proptest! {
        #[test]
        fn prop_derived_key_owner_namespaced(
            owner in "[a-z]{1,10}@[a-z]{1,10}\\.[a-z]{2,3}",
            name in "[a-zA-Z0-9 ]{1,30}\\.[a-z]{2,4}",
        ) {
            let key = StorageService::derive_key(&owner, &name);

            prop_assert!(key.starts_with(&format!("documents/{owner}/")));
            prop_assert!(key.ends_with(&format!("_{}", sanitize_document_name(&name))));
        }
    }

    // For any two uploads of the same owner/name pair, the derived keys
    // SHALL differ: a key is never reused across documents.
    proptest! {
        #[test]
        fn prop_derived_key_unique(
            owner in "[a-z]{1,10}@[a-z]{1,10}\\.[a-z]{2,3}",
            name in "[a-zA-Z0-9]{1,30}\\.[a-z]{2,4}",
        ) {
            let first = StorageService::derive_key(&owner, &name);
            let second = StorageService::derive_key(&owner, &name);
            prop_assert_ne!(first, second);
        }
    }

    // For any key, building a locator and parsing it back SHALL recover
    // the key under every locator form.
    proptest! {
        #[test]
        fn prop_locator_roundtrip(
            key in "documents/[a-z0-9@.]{1,20}/[a-z0-9_.-]{1,40}",
        ) {
            let with_endpoint = StorageService::from_config(StorageConfig::new(
                StorageProvider::s3("taxdocs", "fra1", "k", "s",
                    Some("https://fra1.digitaloceanspaces.com".to_string())),
            )).expect("service");
            let canonical = StorageService::from_config(StorageConfig::new(
                StorageProvider::s3("taxdocs", "fra1", "k", "s", None),
            )).expect("service");
            let local = StorageService::from_config(StorageConfig::new(
                StorageProvider::local_fs("/tmp/veritax"),
            )).expect("service");

            for service in [&with_endpoint, &canonical, &local] {
                let locator = service.object_url(&key);
                prop_assert_eq!(service.parse_key(&locator), Some(key.clone()));
            }
        }
    }

    // Sanitized names only contain characters safe inside a key.
    proptest! {
        #[test]
        fn prop_sanitized_name_safe_chars(name in ".*") {
            let sanitized = sanitize_document_name(&name);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized name: {}", c);
            }
        }
    }
}
