use build_core::{
    configs::PipelineConfig,
    crds::{BuildResource, BuildStatus},
    determiners::aggregate_phase,
    models::Phase,
};
use kube::ResourceExt;
use tracing::{debug, info};

use crate::{
    error::AppError,
    services::{
        pipelinerun_reconciler::{PipelineRunReconciler, StageOutcome},
        traits::{ObjectStore, PipelineExecutor},
    },
    utilities::retry::{RetryPolicy, retry_on_conflict},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The object no longer exists.
    Deleted,
    /// The object carries a deletion marker and was left alone.
    Terminating,
    Updated { phase: Phase, requeue: bool },
}

impl ReconcileOutcome {
    pub fn requeue(&self) -> bool {
        matches!(self, Self::Updated { requeue: true, .. })
    }
}

/// Top-level reconciler for build resources of any kind.
pub struct BuildReconciler<S, E> {
    store: S,
    runs: PipelineRunReconciler<E>,
    retry: RetryPolicy,
}

impl<S, E: PipelineExecutor> BuildReconciler<S, E> {
    pub fn new(store: S, executor: E, pipeline: PipelineConfig, retry: RetryPolicy) -> Self {
        Self {
            store,
            runs: PipelineRunReconciler::new(executor, pipeline),
            retry,
        }
    }

    /// One level-triggered pass: reads the object, drives its stages, and
    /// writes back the status recomputed from scratch.
    #[tracing::instrument("reconcile_build", skip(self), fields(kind = K::PREFIX), err)]
    pub async fn reconcile<K>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReconcileOutcome, AppError>
    where
        K: BuildResource,
        S: ObjectStore<K>,
    {
        let Some(resource) = self.store.get(namespace, name).await? else {
            debug!("Resource no longer exists");
            return Ok(ReconcileOutcome::Deleted);
        };

        if resource.meta().deletion_timestamp.is_some() {
            info!("🗑️ Resource is being deleted, skipping");
            return Ok(ReconcileOutcome::Terminating);
        }

        let spec = resource.build_spec();
        let mut status = resource.build_status().cloned().unwrap_or_default();
        let entry_phase = aggregate_phase(&status.conditions, spec);
        status.phase = entry_phase;

        let mut aborted = false;
        for stage in resource.stages() {
            match self.runs.reconcile(&resource, namespace, &mut status, stage).await {
                StageOutcome::Succeeded => continue,
                StageOutcome::Aborted => {
                    aborted = true;
                    break;
                }
                StageOutcome::Running | StageOutcome::Failed => break,
            }
        }

        status.observed_generation = resource.meta().generation;
        status.phase = aggregate_phase(&status.conditions, spec);

        if status.phase != entry_phase {
            info!(from = %entry_phase, to = %status.phase, "🔄 Phase changed");
        }

        if !self.write_status(&resource, namespace, &status).await? {
            debug!("Resource deleted before its status could be written");
            return Ok(ReconcileOutcome::Deleted);
        }

        Ok(ReconcileOutcome::Updated {
            phase: status.phase,
            requeue: aborted || !status.phase.is_terminal(),
        })
    }

    /// Writes `status` onto the freshest copy of the object, re-reading it
    /// after every conflict. Returns `false` when the object disappeared.
    async fn write_status<K>(
        &self,
        resource: &K,
        namespace: &str,
        status: &BuildStatus,
    ) -> Result<bool, AppError>
    where
        K: BuildResource,
        S: ObjectStore<K>,
    {
        let name = resource.name_any();
        let name = name.as_str();

        retry_on_conflict(&self.retry, |attempt| async move {
            let mut latest = if attempt == 1 {
                resource.clone()
            } else {
                match self.store.get(namespace, name).await? {
                    Some(latest) => latest,
                    None => return Ok(false),
                }
            };

            latest.set_build_status(status.clone());
            self.store.update_status(&latest).await?;

            Ok(true)
        })
        .await
    }
}
