//! In-memory collaborators for reconciler tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use async_trait::async_trait;
use build_core::crds::{
    BuildResource, ParamValue, PipelineRun, PipelineRunStatus, RunCondition, RunResult,
};
use chrono::Utc;
use kube::ResourceExt;

use crate::{
    error::AppError,
    services::traits::{ObjectStore, PipelineExecutor},
};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// Object store enforcing resourceVersion checks like the API server.
#[derive(Clone)]
pub struct FakeStore<K> {
    objects: Arc<Mutex<HashMap<Key, K>>>,
    pending_conflicts: Arc<AtomicU32>,
    status_writes: Arc<AtomicU32>,
}

impl<K: BuildResource> FakeStore<K> {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            pending_conflicts: Arc::new(AtomicU32::new(0)),
            status_writes: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn insert(&self, mut object: K) {
        object.meta_mut().resource_version.get_or_insert_with(|| "1".to_string());
        let k = key(&object.namespace().unwrap_or_default(), &object.name_any());
        self.objects.lock().unwrap().insert(k, object);
    }

    pub fn get_stored(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    pub fn delete(&self, namespace: &str, name: &str) {
        self.objects.lock().unwrap().remove(&key(namespace, name));
    }

    /// The next `count` status writes lose a race against another writer.
    pub fn conflict_next(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn status_writes(&self) -> u32 {
        self.status_writes.load(Ordering::SeqCst)
    }
}

fn bump(version: Option<&String>) -> String {
    let current: u64 = version.and_then(|v| v.parse().ok()).unwrap_or(0);
    (current + 1).to_string()
}

#[async_trait]
impl<K: BuildResource> ObjectStore<K> for FakeStore<K> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, AppError> {
        Ok(self.get_stored(namespace, name))
    }

    async fn create(&self, object: &K) -> Result<K, AppError> {
        let k = key(&object.namespace().unwrap_or_default(), &object.name_any());
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&k) {
            return Err(AppError::Conflict(format!("{} already exists", k.1)));
        }
        let mut created = object.clone();
        created.meta_mut().resource_version = Some("1".to_string());
        objects.insert(k, created.clone());
        Ok(created)
    }

    async fn update_status(&self, object: &K) -> Result<K, AppError> {
        let k = key(&object.namespace().unwrap_or_default(), &object.name_any());
        let mut objects = self.objects.lock().unwrap();
        let stored = objects
            .get_mut(&k)
            .ok_or_else(|| AppError::InternalServerError(format!("{} not found", k.1)))?;

        if self
            .pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            // someone else wrote in between
            let next = bump(stored.meta().resource_version.as_ref());
            stored.meta_mut().resource_version = Some(next);
            return Err(AppError::Conflict("the object has been modified".into()));
        }

        if stored.meta().resource_version != object.meta().resource_version {
            return Err(AppError::Conflict("stale resourceVersion".into()));
        }

        let mut updated = stored.clone();
        if let Some(status) = object.build_status() {
            updated.set_build_status(status.clone());
        }
        updated.meta_mut().resource_version = Some(bump(object.meta().resource_version.as_ref()));
        *stored = updated.clone();
        self.status_writes.fetch_add(1, Ordering::SeqCst);

        Ok(updated)
    }
}

/// Pipeline engine that stores runs and lets tests drive their lifecycle.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    runs: Arc<Mutex<HashMap<Key, PipelineRun>>>,
    creates: Arc<AtomicU32>,
    create_error: Arc<Mutex<Option<String>>>,
    /// Failure message, optionally limited to one run name.
    get_error: Arc<Mutex<Option<(Option<String>, String)>>>,
}

impl FakeExecutor {
    pub fn creates(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn run(&self, namespace: &str, name: &str) -> Option<PipelineRun> {
        self.runs.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    pub fn fail_create(&self, message: Option<&str>) {
        *self.create_error.lock().unwrap() = message.map(str::to_string);
    }

    pub fn fail_get(&self, message: Option<&str>) {
        *self.get_error.lock().unwrap() = message.map(|m| (None, m.to_string()));
    }

    pub fn fail_get_for(&self, name: &str, message: &str) {
        *self.get_error.lock().unwrap() = Some((Some(name.to_string()), message.to_string()));
    }

    /// Stores a run as if someone else had submitted it.
    pub fn insert(&self, run: PipelineRun) {
        let k = key(&run.namespace().unwrap_or_default(), &run.name_any());
        self.runs.lock().unwrap().insert(k, run);
    }

    pub fn set_status(&self, namespace: &str, name: &str, status: PipelineRunStatus) {
        if let Some(run) = self.runs.lock().unwrap().get_mut(&key(namespace, name)) {
            run.status = Some(status);
        }
    }

    /// Marks a run finished the way the pipeline engine reports it.
    pub fn finish(&self, namespace: &str, name: &str, succeeded: bool, url: Option<&str>) {
        let reason = if succeeded { "Succeeded" } else { "Failed" };
        self.set_status(
            namespace,
            name,
            PipelineRunStatus {
                conditions: vec![RunCondition {
                    r#type: "Succeeded".into(),
                    status: if succeeded { "True" } else { "False" }.into(),
                    reason: Some(reason.into()),
                    message: Some(format!("Tasks Completed: 2, {reason}")),
                }],
                start_time: Some(Utc::now()),
                completion_time: Some(Utc::now()),
                pipeline_results: url
                    .map(|url| {
                        vec![RunResult {
                            name: "url".into(),
                            value: ParamValue::String(url.into()),
                        }]
                    })
                    .unwrap_or_default(),
            },
        );
    }
}

#[async_trait]
impl PipelineExecutor for FakeExecutor {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<PipelineRun>, AppError> {
        if let Some((only, message)) = self.get_error.lock().unwrap().clone()
            && only.is_none_or(|only| only == name)
        {
            return Err(AppError::InternalServerError(message));
        }
        Ok(self.run(namespace, name))
    }

    async fn create(&self, run: &PipelineRun) -> Result<PipelineRun, AppError> {
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(AppError::InternalServerError(message));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.insert(run.clone());
        Ok(run.clone())
    }
}
