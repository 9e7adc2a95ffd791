//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, DigitalOcean Spaces, MinIO
    S3 {
        /// S3 bucket name.
        bucket: String,
        /// Region identifier.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Custom endpoint URL. `None` means the canonical region
        /// endpoint.
        endpoint: Option<String>,
    },
    /// Local filesystem (development and tests only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self::S3 {
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            endpoint,
        }
    }

    /// Create a local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name, or the root path for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }
}

/// Storage gateway configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Default TTL for signed download URLs in seconds.
    pub presign_ttl_secs: u64,
}

impl StorageConfig {
    /// Default signed URL TTL: 1 hour.
    pub const DEFAULT_PRESIGN_TTL: u64 = 3600;
    /// Longest TTL the remote store accepts for signed URLs: 7 days.
    pub const MAX_PRESIGN_TTL: u64 = 604_800;

    /// Create a new storage config with default settings.
    #[must_use]
    pub const fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            presign_ttl_secs: Self::DEFAULT_PRESIGN_TTL,
        }
    }

    /// Set the default signed URL TTL.
    #[must_use]
    pub const fn with_presign_ttl(mut self, secs: u64) -> Self {
        self.presign_ttl_secs = secs;
        self
    }
}
