use async_trait::async_trait;
use build_core::crds::{BuildResource, PipelineRun};
use kube::{
    Api, Client, ResourceExt,
    api::{Patch, PatchParams, PostParams},
};
use serde_json::json;
use tracing::debug;

use crate::{
    error::AppError,
    services::traits::{ObjectStore, PipelineExecutor},
};

#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl KubeObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<K: BuildResource> ObjectStore<K> for KubeObjectStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, AppError> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);

        match api.get(name).await {
            Ok(object) => Ok(Some(object)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, object: &K) -> Result<K, AppError> {
        let namespace = object
            .namespace()
            .ok_or_else(|| AppError::MissingNamespace(object.name_any()))?;
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);

        api.create(&PostParams::default(), object)
            .await
            .map_err(AppError::from_write)
    }

    async fn update_status(&self, object: &K) -> Result<K, AppError> {
        let namespace = object
            .namespace()
            .ok_or_else(|| AppError::MissingNamespace(object.name_any()))?;
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);

        // resourceVersion in the body turns the merge patch into a guarded write
        let patch = json!({
            "metadata": { "resourceVersion": object.resource_version() },
            "status": object.build_status(),
        });

        api.patch_status(&object.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(AppError::from_write)
    }
}

#[derive(Clone)]
pub struct KubePipelineExecutor {
    client: Client,
}

impl KubePipelineExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineExecutor for KubePipelineExecutor {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<PipelineRun>, AppError> {
        let api: Api<PipelineRun> = Api::namespaced(self.client.clone(), namespace);

        match api.get(name).await {
            Ok(run) => Ok(Some(run)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, run: &PipelineRun) -> Result<PipelineRun, AppError> {
        let namespace = run
            .namespace()
            .ok_or_else(|| AppError::MissingNamespace(run.name_any()))?;
        let api: Api<PipelineRun> = Api::namespaced(self.client.clone(), &namespace);

        match api.create(&PostParams::default(), run).await {
            Ok(created) => Ok(created),
            // Lost a race with a concurrent submission of the same run
            Err(kube::Error::Api(e)) if e.code == 409 => {
                debug!(run = %run.name_any(), "PipelineRun already exists");
                Ok(api.get(&run.name_any()).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
