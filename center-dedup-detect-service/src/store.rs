use crate::util::{parse_center_file, select_active_centers};
use async_trait::async_trait;
use center_dedup_service::dto::{CenterFilters, CenterRecord, DataFile};
use center_dedup_service::error::ServiceError;
use center_dedup_service::util::download_object_from_s3;
use rusoto_s3::S3Client;
use tracing::debug;

///
/// Read-only access to center records.
///
#[async_trait]
pub trait CenterStore: Send + Sync {
    /// Active centers matching `filters`, ordered by creation time (oldest first).
    async fn fetch_active_centers(
        &self,
        filters: &CenterFilters,
    ) -> Result<Vec<CenterRecord>, ServiceError>;
}

/// Center export kept as a CSV object in S3.
pub struct S3CenterStore {
    client: S3Client,
    data: DataFile,
}

impl S3CenterStore {
    pub fn new(client: S3Client, data: DataFile) -> Self {
        Self { client, data }
    }
}

#[async_trait]
impl CenterStore for S3CenterStore {
    async fn fetch_active_centers(
        &self,
        filters: &CenterFilters,
    ) -> Result<Vec<CenterRecord>, ServiceError> {
        let bytes =
            download_object_from_s3(&self.client, self.data.bucket.clone(), self.data.key.clone())
                .await?;
        debug!(bytes = bytes.len(), key = %self.data.key, "Downloaded center export");
        let centers = parse_center_file(&bytes)?;
        Ok(select_active_centers(centers, filters))
    }
}
