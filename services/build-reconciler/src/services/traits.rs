use async_trait::async_trait;
use build_core::crds::{BuildResource, PipelineRun};

use crate::error::AppError;

/// Persistent store of build resources.
#[async_trait]
pub trait ObjectStore<K: BuildResource>: Send + Sync {
    /// `Ok(None)` when the object does not exist.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, AppError>;

    async fn create(&self, object: &K) -> Result<K, AppError>;

    /// Writes the status subresource, guarded by the object's resourceVersion.
    /// A stale version fails with [`AppError::Conflict`].
    async fn update_status(&self, object: &K) -> Result<K, AppError>;
}

/// Submits and looks up external pipeline runs.
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    /// `Ok(None)` when no run with that name exists.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<PipelineRun>, AppError>;

    async fn create(&self, run: &PipelineRun) -> Result<PipelineRun, AppError>;
}
